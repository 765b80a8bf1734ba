use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod cmd;
mod output;

use cmd::{cmd_gen, cmd_plan};
use output::OutputFormat;

/// lathe - lower declarative build steps into a ninja build graph
#[derive(Parser)]
#[command(name = "lathe")]
#[command(author, version, about, long_about = None)]
struct Cli {
  /// Enable debug logging (overridden by RUST_LOG)
  #[arg(short, long, global = true)]
  verbose: bool,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Lower every target and write a ninja build file
  Gen {
    /// Path to the project file
    #[arg(short, long, default_value = "lathe.yaml")]
    project: PathBuf,

    /// Where to write the build file
    #[arg(short, long, default_value = "build.ninja")]
    out: PathBuf,
  },

  /// Show the lowered edges and inherited bindings without writing anything
  Plan {
    /// Path to the project file
    #[arg(short, long, default_value = "lathe.yaml")]
    project: PathBuf,

    /// Output format
    #[arg(long, value_enum, default_value_t)]
    format: OutputFormat,
  },
}

fn main() -> Result<()> {
  let cli = Cli::parse();

  let default_level = if cli.verbose { "debug" } else { "error" };
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
    .with_writer(std::io::stderr)
    .without_time()
    .init();

  match cli.command {
    Commands::Gen { project, out } => cmd_gen(&project, &out),
    Commands::Plan { project, format } => cmd_plan(&project, format),
  }
}
