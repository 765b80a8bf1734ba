//! Build edges: the concrete output of lowering a target.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::ident::{IdentError, Identifier, PackagePath};

/// A reference to one input artifact.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactRef {
  /// A file checked into the source tree, relative to the project root.
  Source(String),
  /// The output of another target.
  Output(Identifier),
}

impl ArtifactRef {
  /// Interpret a declared source as written inside `package`.
  ///
  /// `//pkg:name` and `:name` refer to target outputs; anything else is a
  /// source path relative to the project root. Source paths must be
  /// non-empty, relative, free of `..` segments and of line breaks.
  pub fn parse(reference: &str, package: &PackagePath) -> Result<Self, IdentError> {
    if reference.starts_with("//") || reference.starts_with(':') {
      return Ok(ArtifactRef::Output(Identifier::parse_relative(reference, package)?));
    }
    let escapes = reference.starts_with('/') || reference.split('/').any(|seg| seg == "..");
    if reference.is_empty() || escapes || reference.contains(['\n', '\r']) {
      return Err(IdentError::InvalidSource(reference.to_string()));
    }
    Ok(ArtifactRef::Source(reference.to_string()))
  }

  /// The producing target, if this artifact is generated.
  pub fn producer(&self) -> Option<&Identifier> {
    match self {
      ArtifactRef::Output(id) => Some(id),
      ArtifactRef::Source(_) => None,
    }
  }
}

impl fmt::Display for ArtifactRef {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ArtifactRef::Source(path) => f.write_str(path),
      ArtifactRef::Output(id) => write!(f, "{}", id),
    }
  }
}

/// One rule invocation in the build graph.
///
/// `inputs` and `outputs` are concrete paths; generated inputs have already
/// been mapped to their producer's output path.
///
/// `implicit` lists paths the edge depends on without passing them to the
/// command. Targets leave it empty; the assembler fills it from the
/// consumer's inherited [`IMPLICIT_KEY`](crate::consts::IMPLICIT_KEY) list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildEdge {
  pub rule: String,
  pub inputs: Vec<String>,
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub implicit: Vec<String>,
  pub outputs: Vec<String>,
  pub variables: BTreeMap<String, String>,
}
