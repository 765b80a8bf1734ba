//! Rule templates and the immutable rule table.
//!
//! Each target verb registers the rules its edges use once, when the process
//! starts. The resulting [`RuleTable`] is frozen and passed by reference to
//! whatever needs it; there is no global registry.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::RESERVED_VARIABLES;
use crate::edge::BuildEdge;
use crate::target;
use crate::template::{self, TemplateError};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuleError {
  #[error("rule '{0}' is already registered")]
  DuplicateRule(String),

  #[error("unknown rule '{0}'")]
  UnknownRule(String),

  #[error("rule '{rule}' references '${variable}' but the edge does not bind it")]
  UnboundVariable { rule: String, variable: String },

  #[error("rule '{rule}': edge {field} contains a line break")]
  LineBreak { rule: String, field: String },

  #[error("rule '{rule}' has an invalid template: {source}")]
  Template {
    rule: String,
    #[source]
    source: TemplateError,
  },
}

/// A named command template plus the description printed while it runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
  pub name: String,
  pub command: String,
  pub description: String,
}

impl Rule {
  pub fn new(name: impl Into<String>, command: impl Into<String>, description: impl Into<String>) -> Self {
    Self {
      name: name.into(),
      command: command.into(),
      description: description.into(),
    }
  }

  /// Variables an edge must bind: everything the command and description
  /// reference, minus `in` and `out`.
  pub fn required_variables(&self) -> Result<BTreeSet<String>, RuleError> {
    let wrap = |source| RuleError::Template {
      rule: self.name.clone(),
      source,
    };
    let mut vars = template::variables(&self.command).map_err(wrap)?;
    vars.extend(template::variables(&self.description).map_err(wrap)?);
    for reserved in RESERVED_VARIABLES {
      vars.remove(reserved);
    }
    Ok(vars)
  }
}

/// The process-wide set of rules, keyed by name.
#[derive(Debug, Clone, Default)]
pub struct RuleTable {
  rules: BTreeMap<String, (Rule, BTreeSet<String>)>,
}

impl RuleTable {
  pub fn builder() -> RuleTableBuilder {
    RuleTableBuilder::default()
  }

  /// Every rule used by the built-in target verbs.
  pub fn standard() -> Result<Self, RuleError> {
    let mut builder = Self::builder();
    for rule in target::objcopy::rules() {
      builder = builder.register(rule)?;
    }
    Ok(builder.build())
  }

  pub fn get(&self, name: &str) -> Option<&Rule> {
    self.rules.get(name).map(|(rule, _)| rule)
  }

  /// All rules in name order.
  pub fn iter(&self) -> impl Iterator<Item = &Rule> {
    self.rules.values().map(|(rule, _)| rule)
  }

  pub fn len(&self) -> usize {
    self.rules.len()
  }

  pub fn is_empty(&self) -> bool {
    self.rules.is_empty()
  }

  /// Check that `edge` names a registered rule, binds every variable the
  /// rule's templates reference and holds no line breaks, which a build
  /// file cannot represent.
  pub fn check_edge(&self, edge: &BuildEdge) -> Result<(), RuleError> {
    let (_, required) = self
      .rules
      .get(&edge.rule)
      .ok_or_else(|| RuleError::UnknownRule(edge.rule.clone()))?;

    let line_break = |field: String| RuleError::LineBreak {
      rule: edge.rule.clone(),
      field,
    };
    for (field, paths) in [("inputs", &edge.inputs), ("implicit", &edge.implicit), ("outputs", &edge.outputs)] {
      if paths.iter().any(|p| has_line_break(p)) {
        return Err(line_break(field.to_string()));
      }
    }
    if let Some((key, _)) = edge.variables.iter().find(|(k, v)| has_line_break(k) || has_line_break(v)) {
      return Err(line_break(format!("variable '{}'", key)));
    }

    match required.iter().find(|var| !edge.variables.contains_key(*var)) {
      Some(missing) => Err(RuleError::UnboundVariable {
        rule: edge.rule.clone(),
        variable: missing.clone(),
      }),
      None => Ok(()),
    }
  }
}

fn has_line_break(s: &str) -> bool {
  s.contains(['\n', '\r'])
}

/// Collects rules before the table is frozen.
#[derive(Debug, Default)]
pub struct RuleTableBuilder {
  rules: BTreeMap<String, (Rule, BTreeSet<String>)>,
}

impl RuleTableBuilder {
  /// Register a rule, validating its templates.
  pub fn register(mut self, rule: Rule) -> Result<Self, RuleError> {
    if self.rules.contains_key(&rule.name) {
      return Err(RuleError::DuplicateRule(rule.name));
    }
    let required = rule.required_variables()?;
    self.rules.insert(rule.name.clone(), (rule, required));
    Ok(self)
  }

  pub fn build(self) -> RuleTable {
    RuleTable { rules: self.rules }
  }
}
