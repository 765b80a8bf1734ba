//! Implementation of the `lathe plan` command.
//!
//! This command lowers every target of a project and prints the edges, the
//! bindings each target inherits from its producers and any failures,
//! without writing a build file.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Result, bail};
use serde::Serialize;

use lathe_lib::delta::{Binding, Bindings};
use lathe_lib::edge::BuildEdge;

use super::assemble_project;
use crate::output::{OutputFormat, failure_summary, print_failures, print_json, symbols};

#[derive(Serialize)]
struct PlanReport<'a> {
  edges: &'a [BuildEdge],
  bindings: BTreeMap<String, Bindings>,
  failures: BTreeMap<String, String>,
  skipped: BTreeMap<String, String>,
}

pub fn cmd_plan(project: &Path, format: OutputFormat) -> Result<()> {
  let (_, assembly) = assemble_project(project)?;

  let bindings: BTreeMap<String, Bindings> = assembly
    .lowered()
    .filter_map(|id| assembly.bindings(id).map(|b| (id.to_string(), b)))
    .collect();

  if format.is_json() {
    print_json(&PlanReport {
      edges: assembly.edges(),
      bindings,
      failures: assembly
        .failures()
        .iter()
        .map(|(id, err)| (id.to_string(), err.to_string()))
        .collect(),
      skipped: assembly
        .skipped()
        .iter()
        .map(|(id, cause)| (id.to_string(), cause.to_string()))
        .collect(),
    })?;
  } else {
    println!("Edges: {}", assembly.edges().len());
    for edge in assembly.edges() {
      println!(
        "  {} {} {} {}",
        edge.rule,
        edge.inputs.join(" "),
        symbols::ARROW,
        edge.outputs.join(" ")
      );
    }
    for (id, inherited) in bindings.iter().filter(|(_, b)| !b.is_empty()) {
      println!("{}", id);
      for (key, value) in inherited_fields(inherited) {
        println!("  {} = {}", key, value);
      }
    }
    print_failures(&assembly);
  }

  if !assembly.is_success() {
    bail!("{}", failure_summary(&assembly));
  }
  Ok(())
}

fn inherited_fields(bindings: &Bindings) -> Vec<(&str, String)> {
  bindings
    .iter()
    .map(|(key, value)| match value {
      Binding::List(list) => (key, list.join(" ")),
      Binding::Scalar(s) => (key, s.clone()),
    })
    .collect()
}
