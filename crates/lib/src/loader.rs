//! Project descriptor loading.
//!
//! A project is declared in YAML:
//!
//! ```yaml
//! genroot: gen
//! environments:
//!   host:
//!     objcopy: /usr/bin/objcopy
//! packages:
//!   fw/app:
//!     - verb: objcopy
//!       name: strip
//!       environment: host
//!       src: fw/app/app.elf
//!       options: -S
//! ```
//!
//! Loading parses the text, freezes the environment registry into a
//! [`Project`] and constructs one [`Target`] per declaration through the
//! [`VerbRegistry`]. No environment is resolved here. Reading the file is the
//! caller's job.

use std::collections::{BTreeMap, BTreeSet};

use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::env::{Environment, EnvironmentRegistry};
use crate::ident::{IdentError, Identifier, PackagePath};
use crate::project::{Package, Project};
use crate::target::Target;
use crate::verbs::VerbRegistry;

#[derive(Debug, Error)]
pub enum LoadError {
  #[error("failed to parse project: {0}")]
  Parse(#[from] serde_yaml::Error),

  #[error(transparent)]
  Ident(#[from] IdentError),

  #[error("package {package}: unknown verb '{verb}'")]
  UnknownVerb { package: String, verb: String },

  #[error("{target}: invalid parameters: {source}")]
  InvalidParams {
    target: String,
    #[source]
    source: serde_yaml::Error,
  },

  #[error("duplicate target {0}")]
  DuplicateTarget(Identifier),

  #[error("{} target declarations failed:\n{}", .0.len(), join_errors(.0))]
  Declarations(Vec<LoadError>),
}

fn join_errors(errors: &[LoadError]) -> String {
  errors.iter().map(|e| format!("  {}", e)).collect::<Vec<_>>().join("\n")
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ProjectDecl {
  genroot: Option<String>,
  #[serde(default)]
  environments: BTreeMap<String, Environment>,
  #[serde(default)]
  packages: BTreeMap<String, Vec<TargetDecl>>,
}

#[derive(Debug, Deserialize)]
struct TargetDecl {
  verb: String,
  name: String,
  #[serde(flatten)]
  params: BTreeMap<String, serde_yaml::Value>,
}

/// A loaded project and its targets.
///
/// Targets are ordered by package path, then by declaration order within
/// each package.
#[derive(Debug)]
pub struct Loaded {
  pub project: Project,
  pub targets: Vec<Box<dyn Target>>,
}

/// Parse a project descriptor and construct its targets.
///
/// # Errors
///
/// Malformed YAML, an invalid genroot or an invalid package path fail
/// immediately. Errors in individual target declarations are collected so
/// that one load reports all of them; a single failure is returned as is,
/// several as [`LoadError::Declarations`].
pub fn load(source: &str, verbs: &VerbRegistry) -> Result<Loaded, LoadError> {
  let decl: ProjectDecl = serde_yaml::from_str(source)?;

  let registry = decl
    .environments
    .into_iter()
    .fold(EnvironmentRegistry::new(), |reg, (name, env)| reg.with(name, env));
  let project = match decl.genroot {
    Some(genroot) => Project::with_genroot(registry, genroot)?,
    None => Project::new(registry),
  };

  let mut seen = BTreeSet::new();
  let mut targets = Vec::new();
  let mut errors = Vec::new();

  for (path, decls) in decl.packages {
    let package = project.package(PackagePath::new(path)?);
    for decl in decls {
      match declare(&package, decl, verbs) {
        Ok(target) if !seen.insert(target.identifier().clone()) => {
          errors.push(LoadError::DuplicateTarget(target.identifier().clone()));
        }
        Ok(target) => targets.push(target),
        Err(err) => errors.push(err),
      }
    }
  }

  if errors.len() == 1 {
    return Err(errors.remove(0));
  }
  if !errors.is_empty() {
    return Err(LoadError::Declarations(errors));
  }

  debug!(
    environments = project.named_environments().len(),
    targets = targets.len(),
    "loaded project"
  );
  Ok(Loaded { project, targets })
}

fn declare(package: &Package, decl: TargetDecl, verbs: &VerbRegistry) -> Result<Box<dyn Target>, LoadError> {
  let TargetDecl { verb, name, params } = decl;
  let ctor = verbs.get(&verb).ok_or_else(|| LoadError::UnknownVerb {
    package: package.path().to_string(),
    verb,
  })?;
  let params = serde_yaml::Value::Mapping(
    params
      .into_iter()
      .map(|(k, v)| (serde_yaml::Value::String(k), v))
      .collect(),
  );
  ctor(package, &name, params)
}
