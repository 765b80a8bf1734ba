//! The `objcopy` verb: run a binary-patching tool over one input.
//!
//! Declared as:
//!
//! ```yaml
//! - verb: objcopy
//!   name: firmware.bin
//!   environment: arm
//!   src: ":firmware.elf"
//!   options: -O binary
//! ```
//!
//! and lowered into a single edge of the `objcopy` rule, whose command is
//! `$objcopy $options $in $out`.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use serde::Deserialize;
use tracing::debug;

use super::{Products, Target, TargetError};
use crate::consts::IMPLICIT_KEY;
use crate::delta::make_appending_delta;
use crate::edge::{ArtifactRef, BuildEdge};
use crate::env::{Environment, EnvironmentResolver, ResolveError};
use crate::ident::{IdentError, Identifier};
use crate::loader::LoadError;
use crate::project::{Package, Project};
use crate::rule::Rule;

pub const VERB: &str = "objcopy";

/// Name of the rule every objcopy edge uses.
pub const RULE: &str = "objcopy";

/// Environment key holding the tool path.
pub const TOOL_KEY: &str = "objcopy";

/// Edge variable carrying the pass-through options.
pub const OPTIONS_KEY: &str = "options";

/// Rules this verb contributes to the rule table.
pub fn rules() -> Vec<Rule> {
  vec![Rule::new(RULE, "$objcopy $options $in $out", "OBJCOPY $out")]
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct Params {
  environment: String,
  src: String,
  #[serde(default)]
  options: String,
}

/// Verb constructor used by the [`VerbRegistry`](crate::verbs::VerbRegistry).
pub fn declare(package: &Package, name: &str, params: serde_yaml::Value) -> Result<Box<dyn Target>, LoadError> {
  let id = package.identifier(name)?;
  let params: Params = serde_yaml::from_value(params).map_err(|source| LoadError::InvalidParams {
    target: id.to_string(),
    source,
  })?;
  let src = ArtifactRef::parse(&params.src, package.path())?;
  Ok(Box::new(Objcopy::new(package, name, params.environment, src, params.options)?))
}

#[derive(Debug)]
pub struct Objcopy {
  id: Identifier,
  package: Package,
  environment: String,
  src: ArtifactRef,
  options: String,
  resolved: OnceLock<Environment>,
}

impl Objcopy {
  /// Construct an unresolved target. No lookups happen here.
  pub fn new(
    package: &Package,
    name: &str,
    environment: impl Into<String>,
    src: ArtifactRef,
    options: impl Into<String>,
  ) -> Result<Self, IdentError> {
    Ok(Self {
      id: package.identifier(name)?,
      package: package.clone(),
      environment: environment.into(),
      src,
      options: options.into(),
      resolved: OnceLock::new(),
    })
  }

  pub fn environment(&self) -> &str {
    &self.environment
  }

  pub fn src(&self) -> &ArtifactRef {
    &self.src
  }

  pub fn options(&self) -> &str {
    &self.options
  }

  /// Where this target's single output is written.
  pub fn output_path(&self) -> String {
    self.package.genpath(self.id.name())
  }

  fn input_path(&self) -> String {
    match &self.src {
      ArtifactRef::Source(path) => path.clone(),
      ArtifactRef::Output(id) => self.package.project().genpath(id),
    }
  }
}

impl Target for Objcopy {
  fn identifier(&self) -> &Identifier {
    &self.id
  }

  fn verb(&self) -> &'static str {
    VERB
  }

  fn is_leaf(&self) -> bool {
    true
  }

  fn dependencies(&self) -> Vec<Identifier> {
    self.src.producer().cloned().into_iter().collect()
  }

  fn resolve_environment(&self, project: &Project) -> Result<&Environment, TargetError> {
    if let Some(env) = self.resolved.get() {
      return Ok(env);
    }
    let env = project
      .resolve(&self.environment)
      .map_err(|ResolveError::NotFound(environment)| TargetError::UnknownEnvironment {
        target: self.id.clone(),
        environment,
      })?;
    debug!(target_id = %self.id, environment = %self.environment, "resolved environment");
    Ok(self.resolved.get_or_init(|| env.clone()))
  }

  fn lower(&self, env: &Environment) -> Result<Products, TargetError> {
    let tool = env.get(TOOL_KEY).ok_or_else(|| TargetError::MissingToolBinding {
      target: self.id.clone(),
      key: TOOL_KEY.to_string(),
    })?;

    let edge = BuildEdge {
      rule: RULE.to_string(),
      inputs: vec![self.input_path()],
      implicit: Vec::new(),
      outputs: vec![self.output_path()],
      variables: BTreeMap::from([
        (TOOL_KEY.to_string(), tool.to_string()),
        (OPTIONS_KEY.to_string(), self.options.clone()),
      ]),
    };

    let using = make_appending_delta([(IMPLICIT_KEY, vec![self.id.to_string()])]);

    debug!(target_id = %self.id, output = %edge.outputs[0], "lowered");
    Ok(Products {
      using,
      edges: vec![edge],
    })
  }

  fn products(&self) -> Result<Products, TargetError> {
    let env = self.resolved.get().ok_or_else(|| TargetError::NotResolved {
      target: self.id.clone(),
    })?;
    self.lower(env)
  }
}
