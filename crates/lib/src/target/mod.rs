//! Targets and the lowering contract.
//!
//! A target is a named, declarative build step. Lowering happens in two
//! phases:
//!
//! 1. [`Target::resolve_environment`] looks up the target's named
//!    environment in the project and memoizes the result.
//! 2. [`Target::lower`] turns a resolved environment into [`Products`]: the
//!    build edges realizing the target's outputs plus the [`Delta`] its
//!    consumers inherit.
//!
//! Both phases are pure. Edge registration and delta application belong to
//! the caller (see [`crate::graph`]).
//!
//! # Submodules
//!
//! - [`objcopy`] - runs a binary-patching tool over one input

pub mod objcopy;

use thiserror::Error;

use crate::delta::{Delta, DeltaError};
use crate::edge::BuildEdge;
use crate::env::Environment;
use crate::ident::Identifier;
use crate::project::Project;
use crate::rule::RuleError;

/// Per-target failures.
///
/// Every variant names the target so collected failures stay attributable.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TargetError {
  #[error("{target}: unknown environment '{environment}'")]
  UnknownEnvironment { target: Identifier, environment: String },

  #[error("{target}: environment does not bind required key '{key}'")]
  MissingToolBinding { target: Identifier, key: String },

  #[error("{target}: lowered before its environment was resolved")]
  NotResolved { target: Identifier },

  #[error("{target}: depends on unknown target {dependency}")]
  UnknownDependency { target: Identifier, dependency: Identifier },

  #[error("{target}: {source}")]
  Rule {
    target: Identifier,
    #[source]
    source: RuleError,
  },

  #[error("{target}: {source}")]
  Delta {
    target: Identifier,
    #[source]
    source: DeltaError,
  },
}

impl TargetError {
  pub fn target(&self) -> &Identifier {
    match self {
      TargetError::UnknownEnvironment { target, .. }
      | TargetError::MissingToolBinding { target, .. }
      | TargetError::NotResolved { target }
      | TargetError::UnknownDependency { target, .. }
      | TargetError::Rule { target, .. }
      | TargetError::Delta { target, .. } => target,
    }
  }
}

/// What lowering a target yields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Products {
  /// Delta applied to every consumer of this target's output.
  pub using: Delta,
  /// Edges realizing this target's outputs.
  pub edges: Vec<BuildEdge>,
}

/// The contract every target verb implements.
pub trait Target: Send + Sync + std::fmt::Debug {
  fn identifier(&self) -> &Identifier;

  /// The verb this target was declared with, e.g. `objcopy`.
  fn verb(&self) -> &'static str;

  /// Whether this target produces no further intermediate targets.
  fn is_leaf(&self) -> bool;

  /// Targets whose outputs this target consumes, in declaration order.
  fn dependencies(&self) -> Vec<Identifier>;

  /// Resolve (once) the environment this target lowers against.
  fn resolve_environment(&self, project: &Project) -> Result<&Environment, TargetError>;

  /// Lower against an explicit environment.
  fn lower(&self, env: &Environment) -> Result<Products, TargetError>;

  /// Lower against the memoized environment.
  ///
  /// Fails with [`TargetError::NotResolved`] if
  /// [`resolve_environment`](Target::resolve_environment) has not succeeded yet.
  fn products(&self) -> Result<Products, TargetError>;
}
