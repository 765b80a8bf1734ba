mod generate;
mod plan;

pub use generate::cmd_gen;
pub use plan::cmd_plan;

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::debug;

use lathe_lib::graph::{Assembly, assemble};
use lathe_lib::loader::load;
use lathe_lib::rule::RuleTable;
use lathe_lib::verbs::VerbRegistry;

/// Read a project file, lower all of its targets and return the rule table
/// alongside the assembly.
fn assemble_project(path: &Path) -> Result<(RuleTable, Assembly)> {
  debug!(path = %path.display(), "reading project");
  let source = fs::read_to_string(path).with_context(|| format!("Failed to read project: {}", path.display()))?;

  let loaded =
    load(&source, &VerbRegistry::standard()).with_context(|| format!("Failed to load project: {}", path.display()))?;

  let rules = RuleTable::standard().context("Failed to build rule table")?;

  let assembly = assemble(&loaded.project, &rules, &loaded.targets).context("Failed to assemble build graph")?;

  Ok((rules, assembly))
}
