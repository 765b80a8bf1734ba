//! Registry of target verbs.
//!
//! A verb is the keyword a project descriptor uses to declare a target
//! (`verb: objcopy`). The registry maps each verb to the constructor that
//! turns its parameters into a [`Target`].

use std::collections::BTreeMap;

use crate::loader::LoadError;
use crate::project::Package;
use crate::target::{self, Target};

/// Builds a target of one verb from its declared parameters.
pub type VerbFn = fn(&Package, &str, serde_yaml::Value) -> Result<Box<dyn Target>, LoadError>;

#[derive(Debug, Clone, Default)]
pub struct VerbRegistry {
  verbs: BTreeMap<&'static str, VerbFn>,
}

impl VerbRegistry {
  pub fn new() -> Self {
    Self::default()
  }

  /// Every built-in verb.
  pub fn standard() -> Self {
    Self::new().with(target::objcopy::VERB, target::objcopy::declare)
  }

  pub fn with(mut self, verb: &'static str, ctor: VerbFn) -> Self {
    self.verbs.insert(verb, ctor);
    self
  }

  pub fn get(&self, verb: &str) -> Option<VerbFn> {
    self.verbs.get(verb).copied()
  }

  pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
    self.verbs.keys().copied()
  }
}
