//! CLI output formatting utilities.
//!
//! Provides consistent formatting for terminal output: colored status
//! symbols, per-target failure reports and JSON printing.

use anyhow::Context;
use clap::ValueEnum;
use owo_colors::{OwoColorize, Stream};

use lathe_lib::graph::Assembly;

#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
  #[default]
  Text,
  Json,
}

impl OutputFormat {
  pub fn is_json(self) -> bool {
    matches!(self, OutputFormat::Json)
  }
}

pub mod symbols {
  pub const SUCCESS: &str = "✓";
  pub const ERROR: &str = "✗";
  pub const WARNING: &str = "⚠";
  pub const ARROW: &str = "→";
}

pub fn print_success(message: &str) {
  println!(
    "{} {}",
    symbols::SUCCESS.if_supports_color(Stream::Stdout, |s| s.green()),
    message
  );
}

pub fn print_error(message: &str) {
  eprintln!(
    "{} {}",
    symbols::ERROR.if_supports_color(Stream::Stderr, |s| s.red()),
    message.if_supports_color(Stream::Stderr, |s| s.red())
  );
}

pub fn print_warning(message: &str) {
  eprintln!(
    "{} {}",
    symbols::WARNING.if_supports_color(Stream::Stderr, |s| s.yellow()),
    message.if_supports_color(Stream::Stderr, |s| s.yellow())
  );
}

/// Report every failed and skipped target on stderr.
pub fn print_failures(assembly: &Assembly) {
  for err in assembly.failures().values() {
    print_error(&err.to_string());
  }
  for (id, cause) in assembly.skipped() {
    print_warning(&format!("{}: skipped, depends on failed target {}", id, cause));
  }
}

/// One-line summary such as `2 failed, 1 skipped`.
pub fn failure_summary(assembly: &Assembly) -> String {
  format!(
    "{} target(s) failed, {} skipped",
    assembly.failures().len(),
    assembly.skipped().len()
  )
}

pub fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
  let json = serde_json::to_string_pretty(value).context("Failed to serialize to JSON")?;
  println!("{}", json);
  Ok(())
}
