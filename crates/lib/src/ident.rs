//! Package paths and target identifiers.
//!
//! Every target is identified by the package it lives in and its name within
//! that package. The pair is rendered as an [`Identifier`] of the form
//! `//<package>:<name>`, which doubles as a graph-node key and as a value
//! injected into consumers' dependency lists.
//!
//! # Validity
//!
//! Package segments and target names share one character set
//! (`[A-Za-z0-9_.+-]`). Packages are `/`-separated and may not contain empty,
//! `.` or `..` segments; names may contain neither `/` nor `:`. Keeping `/`
//! out of names is what makes generated output paths collision free.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors produced when validating a package path or target identifier.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdentError {
  #[error("package path is empty")]
  EmptyPackage,

  #[error("invalid package path '{0}'")]
  InvalidPackage(String),

  #[error("invalid target name '{0}'")]
  InvalidName(String),

  #[error("malformed identifier '{0}': expected //package:name")]
  Malformed(String),

  #[error("invalid genroot '{0}': expected a relative path without '.' or '..' segments")]
  InvalidGenroot(String),

  #[error("invalid source path '{0}': expected a non-empty relative path inside the project")]
  InvalidSource(String),
}

fn is_ident_char(c: char) -> bool {
  c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '+' | '-')
}

fn is_valid_component(s: &str) -> bool {
  !s.is_empty() && s != "." && s != ".." && s.chars().all(is_ident_char)
}

/// A validated, `/`-separated package path such as `fw/app`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PackagePath(String);

impl PackagePath {
  pub fn new(path: impl Into<String>) -> Result<Self, IdentError> {
    let path = path.into();
    if path.is_empty() {
      return Err(IdentError::EmptyPackage);
    }
    if !path.split('/').all(is_valid_component) {
      return Err(IdentError::InvalidPackage(path));
    }
    Ok(Self(path))
  }

  pub fn as_str(&self) -> &str {
    &self.0
  }
}

impl fmt::Display for PackagePath {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}

impl TryFrom<String> for PackagePath {
  type Error = IdentError;

  fn try_from(value: String) -> Result<Self, Self::Error> {
    Self::new(value)
  }
}

impl From<PackagePath> for String {
  fn from(value: PackagePath) -> Self {
    value.0
  }
}

/// Globally unique key of a target: `//<package>:<name>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Identifier {
  package: PackagePath,
  name: String,
}

impl Identifier {
  pub fn new(package: PackagePath, name: impl Into<String>) -> Result<Self, IdentError> {
    let name = name.into();
    if !is_valid_component(&name) {
      return Err(IdentError::InvalidName(name));
    }
    Ok(Self { package, name })
  }

  /// Parse a target reference as written inside `package`.
  ///
  /// `//pkg:name` is absolute; `:name` refers to a sibling in `package`.
  pub fn parse_relative(reference: &str, package: &PackagePath) -> Result<Self, IdentError> {
    match reference.strip_prefix(':') {
      Some(name) => Self::new(package.clone(), name),
      None => reference.parse(),
    }
  }

  pub fn package(&self) -> &PackagePath {
    &self.package
  }

  pub fn name(&self) -> &str {
    &self.name
  }
}

impl fmt::Display for Identifier {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "//{}:{}", self.package, self.name)
  }
}

impl FromStr for Identifier {
  type Err = IdentError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let rest = s.strip_prefix("//").ok_or_else(|| IdentError::Malformed(s.to_string()))?;
    let (package, name) = rest.split_once(':').ok_or_else(|| IdentError::Malformed(s.to_string()))?;
    Self::new(PackagePath::new(package)?, name)
  }
}

impl TryFrom<String> for Identifier {
  type Error = IdentError;

  fn try_from(value: String) -> Result<Self, Self::Error> {
    value.parse()
  }
}

impl From<Identifier> for String {
  fn from(value: Identifier) -> Self {
    value.to_string()
  }
}
