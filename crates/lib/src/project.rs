//! Projects and packages.
//!
//! A [`Project`] freezes the named-environment registry and the location of
//! the generated-output namespace. A [`Package`] is a view of the project
//! scoped to one package path; targets use it to compute where their outputs
//! live.

use std::sync::Arc;

use crate::consts::DEFAULT_GENROOT;
use crate::env::{Environment, EnvironmentRegistry, EnvironmentResolver, ResolveError};
use crate::ident::{IdentError, Identifier, PackagePath};

#[derive(Debug)]
struct ProjectInner {
  genroot: String,
  environments: EnvironmentRegistry,
}

/// The frozen, project-wide configuration shared by every package.
///
/// Cloning is cheap; all clones share the same registry.
#[derive(Debug, Clone)]
pub struct Project {
  inner: Arc<ProjectInner>,
}

impl Project {
  pub fn new(environments: EnvironmentRegistry) -> Self {
    Self::from_parts(environments, DEFAULT_GENROOT.to_string())
  }

  /// A project whose outputs live under `genroot` instead of the default.
  ///
  /// `genroot` follows the package path rules, so generated paths always
  /// stay relative and inside the project. A trailing `/` is ignored.
  pub fn with_genroot(environments: EnvironmentRegistry, genroot: impl Into<String>) -> Result<Self, IdentError> {
    let raw = genroot.into();
    let genroot = PackagePath::new(raw.trim_end_matches('/')).map_err(|_| IdentError::InvalidGenroot(raw.clone()))?;
    Ok(Self::from_parts(environments, genroot.into()))
  }

  fn from_parts(environments: EnvironmentRegistry, genroot: String) -> Self {
    Self {
      inner: Arc::new(ProjectInner { genroot, environments }),
    }
  }

  pub fn genroot(&self) -> &str {
    &self.inner.genroot
  }

  pub fn named_environments(&self) -> &EnvironmentRegistry {
    &self.inner.environments
  }

  pub fn package(&self, path: PackagePath) -> Package {
    Package {
      project: self.clone(),
      path,
    }
  }

  /// Output path of the target identified by `id`.
  pub fn genpath(&self, id: &Identifier) -> String {
    format!("{}/{}/{}", self.inner.genroot, id.package(), id.name())
  }
}

impl EnvironmentResolver for Project {
  fn resolve(&self, name: &str) -> Result<&Environment, ResolveError> {
    self.inner.environments.resolve(name)
  }
}

/// One package within a project.
#[derive(Debug, Clone)]
pub struct Package {
  project: Project,
  path: PackagePath,
}

impl Package {
  pub fn project(&self) -> &Project {
    &self.project
  }

  pub fn path(&self) -> &PackagePath {
    &self.path
  }

  pub fn identifier(&self, name: &str) -> Result<Identifier, IdentError> {
    Identifier::new(self.path.clone(), name)
  }

  /// Generated path for `name` under this package's output namespace.
  ///
  /// `name` is expected to be a valid target name; see [`crate::ident`].
  pub fn genpath(&self, name: &str) -> String {
    format!("{}/{}/{}", self.project.genroot(), self.path, name)
  }
}
