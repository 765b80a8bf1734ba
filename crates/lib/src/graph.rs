//! Graph assembly: lowering every target of a project.
//!
//! The assembler plays the loader's part of the lowering protocol. It orders
//! targets so producers come before consumers, resolves and lowers each one,
//! checks the resulting edges against the [`RuleTable`] and threads
//! propagation deltas from producers to consumers.
//!
//! Failures stay local to the offending target. Its dependents are recorded
//! as skipped and every independent target still lowers, so one run reports
//! all configuration errors at once.

use std::collections::{BTreeMap, HashMap};

use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};
use thiserror::Error;
use tracing::{info, warn};

use crate::consts::IMPLICIT_KEY;
use crate::delta::{Bindings, Delta, DeltaError};
use crate::edge::BuildEdge;
use crate::ident::Identifier;
use crate::project::Project;
use crate::rule::RuleTable;
use crate::target::{Products, Target, TargetError};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
  #[error("dependency cycle detected at {0}")]
  CycleDetected(Identifier),
}

/// Result of assembling a project's targets.
#[derive(Debug, Default)]
pub struct Assembly {
  edges: Vec<BuildEdge>,
  using: BTreeMap<Identifier, Delta>,
  inherited: BTreeMap<Identifier, Delta>,
  failures: BTreeMap<Identifier, TargetError>,
  skipped: BTreeMap<Identifier, Identifier>,
}

impl Assembly {
  /// Every lowered edge, producers before consumers.
  pub fn edges(&self) -> &[BuildEdge] {
    &self.edges
  }

  /// Targets that failed, with their error.
  pub fn failures(&self) -> &BTreeMap<Identifier, TargetError> {
    &self.failures
  }

  /// Targets not lowered because a dependency failed, mapped to that
  /// dependency.
  pub fn skipped(&self) -> &BTreeMap<Identifier, Identifier> {
    &self.skipped
  }

  pub fn is_success(&self) -> bool {
    self.failures.is_empty() && self.skipped.is_empty()
  }

  /// The delta a target hands to its consumers, as returned by lowering.
  pub fn using(&self, id: &Identifier) -> Option<&Delta> {
    self.using.get(id)
  }

  /// What a target sees after every producer's delta has been applied.
  pub fn bindings(&self, id: &Identifier) -> Option<Bindings> {
    let delta = self.inherited.get(id)?;
    let mut bindings = Bindings::new();
    // Composed deltas always apply cleanly to empty bindings.
    delta.apply(&mut bindings).ok()?;
    Some(bindings)
  }

  /// Identifiers of every successfully lowered target, sorted.
  pub fn lowered(&self) -> impl Iterator<Item = &Identifier> {
    self.inherited.keys()
  }
}

/// Resolve, lower and validate every target.
///
/// # Errors
///
/// Only a dependency cycle fails the whole assembly; everything else is
/// recorded per target in the returned [`Assembly`].
pub fn assemble(project: &Project, rules: &RuleTable, targets: &[Box<dyn Target>]) -> Result<Assembly, GraphError> {
  let mut graph: DiGraph<usize, ()> = DiGraph::new();
  let mut nodes: HashMap<&Identifier, NodeIndex> = HashMap::new();

  for (i, target) in targets.iter().enumerate() {
    nodes.insert(target.identifier(), graph.add_node(i));
  }

  let mut assembly = Assembly::default();

  for target in targets {
    let dependent = nodes[target.identifier()];
    for dep in target.dependencies() {
      match nodes.get(&dep) {
        Some(&producer) => {
          graph.add_edge(producer, dependent, ());
        }
        None => {
          let err = TargetError::UnknownDependency {
            target: target.identifier().clone(),
            dependency: dep,
          };
          warn!("{}", err);
          assembly.failures.insert(target.identifier().clone(), err);
        }
      }
    }
  }

  let order = toposort(&graph, None)
    .map_err(|cycle| GraphError::CycleDetected(targets[graph[cycle.node_id()]].identifier().clone()))?;

  // Deltas each lowered target passes on: its inherited delta followed by
  // its own.
  let mut effective: HashMap<Identifier, Delta> = HashMap::new();
  // Output paths of each lowered target.
  let mut produced: HashMap<Identifier, Vec<String>> = HashMap::new();

  for idx in order {
    let target = &targets[graph[idx]];
    let id = target.identifier();

    if assembly.failures.contains_key(id) {
      continue;
    }

    let blocked = target
      .dependencies()
      .into_iter()
      .find(|dep| assembly.failures.contains_key(dep) || assembly.skipped.contains_key(dep));
    if let Some(dep) = blocked {
      let root = assembly.skipped.get(&dep).cloned().unwrap_or(dep);
      warn!(target_id = %id, failed = %root, "skipped");
      assembly.skipped.insert(id.clone(), root);
      continue;
    }

    match lower_one(project, rules, target.as_ref(), &effective, &produced) {
      Ok((inherited, using, edges)) => {
        let passed_on = inherited.compose(&using).map_err(|source| TargetError::Delta {
          target: id.clone(),
          source,
        });
        match passed_on {
          Ok(passed_on) => {
            effective.insert(id.clone(), passed_on);
            produced.insert(id.clone(), edges.iter().flat_map(|e| e.outputs.clone()).collect());
            assembly.edges.extend(edges);
            assembly.using.insert(id.clone(), using);
            assembly.inherited.insert(id.clone(), inherited);
          }
          Err(err) => {
            warn!("{}", err);
            assembly.failures.insert(id.clone(), err);
          }
        }
      }
      Err(err) => {
        warn!("{}", err);
        assembly.failures.insert(id.clone(), err);
      }
    }
  }

  info!(
    edges = assembly.edges.len(),
    failed = assembly.failures.len(),
    skipped = assembly.skipped.len(),
    "assembled build graph"
  );
  Ok(assembly)
}

fn lower_one(
  project: &Project,
  rules: &RuleTable,
  target: &dyn Target,
  effective: &HashMap<Identifier, Delta>,
  produced: &HashMap<Identifier, Vec<String>>,
) -> Result<(Delta, Delta, Vec<BuildEdge>), TargetError> {
  let id = target.identifier();
  let delta_err = |source: DeltaError| TargetError::Delta {
    target: id.clone(),
    source,
  };

  let mut inherited = Delta::empty();
  for dep in target.dependencies() {
    if let Some(delta) = effective.get(&dep) {
      inherited = inherited.compose(delta).map_err(delta_err)?;
    }
  }

  let mut bindings = Bindings::new();
  inherited.apply(&mut bindings).map_err(delta_err)?;
  let implicit = implicit_paths(&bindings, produced);

  target.resolve_environment(project)?;
  let Products { using, mut edges } = target.products()?;

  for edge in &mut edges {
    for path in &implicit {
      if !edge.inputs.contains(path) && !edge.implicit.contains(path) {
        edge.implicit.push(path.clone());
      }
    }
    rules.check_edge(edge).map_err(|source| TargetError::Rule {
      target: id.clone(),
      source,
    })?;
  }

  Ok((inherited, using, edges))
}

/// Map a consumer's inherited `__implicit__` entries to paths.
///
/// Entries naming a lowered target expand to that target's outputs; any
/// other entry is taken as a path.
fn implicit_paths(bindings: &Bindings, produced: &HashMap<Identifier, Vec<String>>) -> Vec<String> {
  let mut paths: Vec<String> = Vec::new();
  for entry in bindings.list(IMPLICIT_KEY) {
    let outputs = entry
      .parse::<Identifier>()
      .ok()
      .and_then(|id| produced.get(&id).cloned())
      .unwrap_or_else(|| vec![entry.clone()]);
    for path in outputs {
      if !paths.contains(&path) {
        paths.push(path);
      }
    }
  }
  paths
}
