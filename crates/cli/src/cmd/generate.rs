//! Implementation of the `lathe gen` command.
//!
//! This command lowers every target of a project and writes the resulting
//! rules and edges as a ninja build file. Nothing is written unless every
//! target lowered successfully.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use tracing::info;

use lathe_lib::ninja;

use super::assemble_project;
use crate::output::{failure_summary, print_failures, print_success};

pub fn cmd_gen(project: &Path, out: &Path) -> Result<()> {
  let (rules, assembly) = assemble_project(project)?;

  if !assembly.is_success() {
    print_failures(&assembly);
    bail!("{}", failure_summary(&assembly));
  }

  let text = ninja::render(&rules, &assembly);
  info!(path = %out.display(), bytes = text.len(), "writing build file");
  fs::write(out, text).with_context(|| format!("Failed to write build file: {}", out.display()))?;

  print_success(&format!(
    "Wrote {} edge(s) to {}",
    assembly.edges().len(),
    out.display()
  ));
  Ok(())
}
