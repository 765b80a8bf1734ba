//! Named toolchain environments.
//!
//! An [`Environment`] is an immutable mapping from variable key (tool paths,
//! flags) to string value. Projects own a frozen [`EnvironmentRegistry`] of
//! named environments; targets refer to them by name and resolve them
//! lazily through the [`EnvironmentResolver`] trait.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised by environment lookups.
///
/// Carries only the missing name so callers can attach target identity.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
  #[error("environment not found: {0}")]
  NotFound(String),
}

/// An immutable set of variable bindings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Environment {
  vars: BTreeMap<String, String>,
}

impl Environment {
  pub fn new(vars: BTreeMap<String, String>) -> Self {
    Self { vars }
  }

  pub fn get(&self, key: &str) -> Option<&str> {
    self.vars.get(key).map(String::as_str)
  }

  pub fn contains(&self, key: &str) -> bool {
    self.vars.contains_key(key)
  }

  pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
    self.vars.iter().map(|(k, v)| (k.as_str(), v.as_str()))
  }

  pub fn len(&self) -> usize {
    self.vars.len()
  }

  pub fn is_empty(&self) -> bool {
    self.vars.is_empty()
  }
}

impl<K, V> FromIterator<(K, V)> for Environment
where
  K: Into<String>,
  V: Into<String>,
{
  fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
    Self {
      vars: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
    }
  }
}

/// Lookup from a symbolic environment name to its bindings.
///
/// Implementations must be pure: the same name always resolves to the same
/// environment for the lifetime of the resolver.
pub trait EnvironmentResolver {
  fn resolve(&self, name: &str) -> Result<&Environment, ResolveError>;
}

/// The project-wide set of named environments.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EnvironmentRegistry {
  named: BTreeMap<String, Environment>,
}

impl EnvironmentRegistry {
  pub fn new() -> Self {
    Self::default()
  }

  /// Add or replace a named environment. Registries are built up front and
  /// then frozen inside a project.
  pub fn with(mut self, name: impl Into<String>, env: Environment) -> Self {
    self.named.insert(name.into(), env);
    self
  }

  pub fn names(&self) -> impl Iterator<Item = &str> {
    self.named.keys().map(String::as_str)
  }

  pub fn len(&self) -> usize {
    self.named.len()
  }

  pub fn is_empty(&self) -> bool {
    self.named.is_empty()
  }
}

impl EnvironmentResolver for EnvironmentRegistry {
  fn resolve(&self, name: &str) -> Result<&Environment, ResolveError> {
    self.named.get(name).ok_or_else(|| ResolveError::NotFound(name.to_string()))
  }
}
