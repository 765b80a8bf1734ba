//! Propagation deltas ("using" records).
//!
//! When a target is lowered it hands back a [`Delta`] describing what every
//! consumer of its output must additionally account for. The usual case is
//! an append of the producer's identifier to the consumer's
//! [`IMPLICIT_KEY`](crate::consts::IMPLICIT_KEY) list, built with
//! [`make_appending_delta`].
//!
//! # Composition
//!
//! Deltas form a small closed algebra. `a.compose(&b)` means "apply `a`,
//! then `b`":
//!
//! - two appends concatenate and keep only the first occurrence of each entry
//! - two overrides keep the later value
//! - an append and an override on the same key is a [`DeltaError::KindMismatch`]
//!
//! Composition is associative, the empty delta is its identity, and composing
//! a delta with itself changes nothing. Diamond-shaped dependency graphs can
//! therefore merge the same producer's delta along several paths without
//! duplicating or reordering entries.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeltaError {
  #[error("field '{key}' is used both as a list and as a scalar")]
  KindMismatch { key: String },
}

/// A single operation on one field of a consumer's bindings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeltaOp {
  /// Append entries to a list, skipping entries already present.
  Append(Vec<String>),
  /// Replace a scalar value.
  Override(String),
}

impl DeltaOp {
  fn then(&self, key: &str, next: &DeltaOp) -> Result<DeltaOp, DeltaError> {
    match (self, next) {
      (DeltaOp::Append(a), DeltaOp::Append(b)) => {
        let mut merged = a.clone();
        extend_unique(&mut merged, b);
        Ok(DeltaOp::Append(merged))
      }
      (DeltaOp::Override(_), DeltaOp::Override(v)) => Ok(DeltaOp::Override(v.clone())),
      _ => Err(DeltaError::KindMismatch { key: key.to_string() }),
    }
  }
}

fn extend_unique(list: &mut Vec<String>, entries: &[String]) {
  for entry in entries {
    if !list.contains(entry) {
      list.push(entry.clone());
    }
  }
}

/// A set of named field operations, applied in key order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Delta {
  ops: BTreeMap<String, DeltaOp>,
}

impl Delta {
  /// The identity delta.
  pub fn empty() -> Self {
    Self::default()
  }

  pub fn is_empty(&self) -> bool {
    self.ops.is_empty()
  }

  pub fn get(&self, key: &str) -> Option<&DeltaOp> {
    self.ops.get(key)
  }

  pub fn iter(&self) -> impl Iterator<Item = (&str, &DeltaOp)> {
    self.ops.iter().map(|(k, op)| (k.as_str(), op))
  }

  /// Add a scalar override to this delta.
  pub fn with_override(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
    self.ops.insert(key.into(), DeltaOp::Override(value.into()));
    self
  }

  /// Combine `self` followed by `next` into a single delta.
  pub fn compose(&self, next: &Delta) -> Result<Delta, DeltaError> {
    let mut ops = self.ops.clone();
    for (key, op) in &next.ops {
      let combined = match ops.get(key) {
        Some(existing) => existing.then(key, op)?,
        None => normalize(op),
      };
      ops.insert(key.clone(), combined);
    }
    Ok(Delta { ops })
  }

  /// Apply this delta to a consumer's bindings.
  pub fn apply(&self, bindings: &mut Bindings) -> Result<(), DeltaError> {
    for (key, op) in &self.ops {
      match (bindings.values.get_mut(key), op) {
        (None, DeltaOp::Append(entries)) => {
          let mut list = Vec::new();
          extend_unique(&mut list, entries);
          bindings.values.insert(key.clone(), Binding::List(list));
        }
        (Some(Binding::List(list)), DeltaOp::Append(entries)) => extend_unique(list, entries),
        (None | Some(Binding::Scalar(_)), DeltaOp::Override(value)) => {
          bindings.values.insert(key.clone(), Binding::Scalar(value.clone()));
        }
        _ => return Err(DeltaError::KindMismatch { key: key.clone() }),
      }
    }
    Ok(())
  }
}

fn normalize(op: &DeltaOp) -> DeltaOp {
  match op {
    DeltaOp::Append(entries) => {
      let mut list = Vec::new();
      extend_unique(&mut list, entries);
      DeltaOp::Append(list)
    }
    DeltaOp::Override(v) => DeltaOp::Override(v.clone()),
  }
}

/// Build a delta whose every field appends its entries.
///
/// ```
/// use lathe_lib::delta::{make_appending_delta, DeltaOp};
///
/// let d = make_appending_delta([("__implicit__", vec!["//fw:strip".to_string()])]);
/// assert_eq!(d.get("__implicit__"), Some(&DeltaOp::Append(vec!["//fw:strip".to_string()])));
/// ```
pub fn make_appending_delta<K, I>(fields: I) -> Delta
where
  K: Into<String>,
  I: IntoIterator<Item = (K, Vec<String>)>,
{
  let mut delta = Delta::empty();
  for (key, entries) in fields {
    let op = normalize(&DeltaOp::Append(entries));
    delta.ops.insert(key.into(), op);
  }
  delta
}

/// A consumer-side field value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Binding {
  List(Vec<String>),
  Scalar(String),
}

/// The fields a consumer sees after its producers' deltas are applied.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Bindings {
  values: BTreeMap<String, Binding>,
}

impl Bindings {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn get(&self, key: &str) -> Option<&Binding> {
    self.values.get(key)
  }

  /// Entries of a list field, or an empty slice when the field is absent or
  /// scalar.
  pub fn list(&self, key: &str) -> &[String] {
    match self.values.get(key) {
      Some(Binding::List(list)) => list,
      _ => &[],
    }
  }

  pub fn iter(&self) -> impl Iterator<Item = (&str, &Binding)> {
    self.values.iter().map(|(k, v)| (k.as_str(), v))
  }

  pub fn is_empty(&self) -> bool {
    self.values.is_empty()
  }
}
