//! Rendering rules and edges as a ninja build file.
//!
//! The output is a plain string; writing it out is the caller's concern.
//! Rendering is deterministic: rules appear in name order, edges in the
//! order the assembler lowered them and edge variables in key order.

use std::fmt::Write;

use crate::edge::BuildEdge;
use crate::graph::Assembly;
use crate::rule::{Rule, RuleTable};

const HEADER: &str = "# Generated by lathe. Do not edit.\n";

/// Escape a path for use in a `build` line.
///
/// Line breaks cannot be escaped; edges carrying them are rejected by
/// [`RuleTable::check_edge`] before they reach the renderer.
pub fn escape_path(path: &str) -> String {
  let mut out = String::with_capacity(path.len());
  for c in path.chars() {
    match c {
      '$' | ' ' | ':' => {
        out.push('$');
        out.push(c);
      }
      _ => out.push(c),
    }
  }
  out
}

/// Escape a variable value. Only `$` is special on the right of `=`, apart
/// from line breaks, which [`RuleTable::check_edge`] rejects.
pub fn escape_value(value: &str) -> String {
  value.replace('$', "$$")
}

fn write_rule(out: &mut String, rule: &Rule) {
  let _ = writeln!(out, "rule {}", rule.name);
  let _ = writeln!(out, "  command = {}", rule.command);
  let _ = writeln!(out, "  description = {}", rule.description);
  out.push('\n');
}

fn write_edge(out: &mut String, edge: &BuildEdge) {
  let outputs: Vec<String> = edge.outputs.iter().map(|p| escape_path(p)).collect();
  let _ = write!(out, "build {}: {}", outputs.join(" "), edge.rule);
  for input in &edge.inputs {
    let _ = write!(out, " {}", escape_path(input));
  }
  if !edge.implicit.is_empty() {
    out.push_str(" |");
    for input in &edge.implicit {
      let _ = write!(out, " {}", escape_path(input));
    }
  }
  out.push('\n');
  for (key, value) in &edge.variables {
    let _ = writeln!(out, "  {} = {}", key, escape_value(value));
  }
  out.push('\n');
}

/// Render every rule in `rules` followed by every edge in `assembly`.
pub fn render(rules: &RuleTable, assembly: &Assembly) -> String {
  let mut out = String::from(HEADER);
  out.push('\n');
  for rule in rules.iter() {
    write_rule(&mut out, rule);
  }
  for edge in assembly.edges() {
    write_edge(&mut out, edge);
  }
  out
}
