//! Shared test helpers for CLI integration tests.

use std::path::PathBuf;

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use tempfile::TempDir;

/// Get path to a fixture file.
pub fn fixture_path(name: &str) -> PathBuf {
  PathBuf::from(env!("CARGO_MANIFEST_DIR"))
    .join("tests")
    .join("fixtures")
    .join(name)
}

/// Isolated test environment with its own project file and output directory.
pub struct TestEnv {
  pub temp: TempDir,
  pub project_path: PathBuf,
}

impl TestEnv {
  /// Copy a fixture into a fresh temporary `lathe.yaml`.
  pub fn from_fixture(name: &str) -> Self {
    let temp = TempDir::new().unwrap();
    let project_path = temp.path().join("lathe.yaml");
    let content =
      std::fs::read_to_string(fixture_path(name)).unwrap_or_else(|e| panic!("Failed to load fixture {}: {}", name, e));
    std::fs::write(&project_path, content).unwrap();
    Self { temp, project_path }
  }

  /// Where `gen` should write its build file.
  pub fn ninja_path(&self) -> PathBuf {
    self.temp.path().join("build.ninja")
  }

  /// A lathe command running inside the temp directory, with logging off.
  pub fn lathe_cmd(&self) -> Command {
    let mut cmd: Command = cargo_bin_cmd!("lathe");
    cmd.current_dir(self.temp.path());
    cmd.env_remove("RUST_LOG");
    cmd
  }
}
