//! `lathe plan` integration tests.

use predicates::prelude::*;

use super::common::TestEnv;

#[test]
fn plan_text_lists_edges_and_bindings() {
  let env = TestEnv::from_fixture("firmware.yaml");

  env
    .lathe_cmd()
    .arg("plan")
    .assert()
    .success()
    .stdout(predicate::str::contains("Edges: 2"))
    .stdout(predicate::str::contains("//fw:hex\n  __implicit__ = //fw:strip"));

  assert!(!env.ninja_path().exists());
}

#[test]
fn plan_json_is_parseable() {
  let env = TestEnv::from_fixture("firmware.yaml");

  let output = env.lathe_cmd().args(["plan", "--format", "json"]).output().unwrap();
  assert!(output.status.success());

  let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
  assert_eq!(report["edges"].as_array().unwrap().len(), 2);
  assert_eq!(report["edges"][0]["rule"], "objcopy");
  assert_eq!(report["bindings"]["//fw:hex"]["__implicit__"][0], "//fw:strip");
  assert!(report["failures"].as_object().unwrap().is_empty());
}

#[test]
fn plan_json_includes_failures() {
  let env = TestEnv::from_fixture("broken.yaml");

  let output = env.lathe_cmd().args(["plan", "--format", "json"]).output().unwrap();
  assert!(!output.status.success());

  let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
  assert!(report["failures"]["//fw:strip"].is_string());
  assert!(report["failures"]["//fw:bin"].is_string());
  assert_eq!(report["skipped"]["//fw:hex"], "//fw:strip");
  assert_eq!(report["edges"].as_array().unwrap().len(), 1);
}
