//! `lathe gen` integration tests.

use predicates::prelude::*;

use super::common::TestEnv;

#[test]
fn gen_writes_rules_and_edges() {
  let env = TestEnv::from_fixture("firmware.yaml");

  env
    .lathe_cmd()
    .arg("gen")
    .arg("-p")
    .arg(&env.project_path)
    .arg("-o")
    .arg(env.ninja_path())
    .assert()
    .success()
    .stdout(predicate::str::contains("Wrote 2 edge(s)"));

  let text = std::fs::read_to_string(env.ninja_path()).unwrap();
  assert!(text.starts_with("# Generated by lathe"));
  assert!(text.contains("rule objcopy\n"));
  assert!(text.contains("build gen/fw/strip: objcopy firmware.elf\n"));
  assert!(text.contains("build gen/fw/hex: objcopy gen/fw/strip\n"));
}

#[test]
fn gen_is_deterministic() {
  let env = TestEnv::from_fixture("firmware.yaml");
  let run = || {
    env
      .lathe_cmd()
      .args(["gen", "-o"])
      .arg(env.ninja_path())
      .assert()
      .success();
    std::fs::read_to_string(env.ninja_path()).unwrap()
  };

  assert_eq!(run(), run());
}

#[test]
fn gen_reports_every_failure_and_writes_nothing() {
  let env = TestEnv::from_fixture("broken.yaml");

  env
    .lathe_cmd()
    .arg("gen")
    .arg("-o")
    .arg(env.ninja_path())
    .assert()
    .failure()
    .stderr(predicate::str::contains("//fw:strip"))
    .stderr(predicate::str::contains("'missing'"))
    .stderr(predicate::str::contains("//fw:bin"))
    .stderr(predicate::str::contains("//fw:hex: skipped"))
    .stderr(predicate::str::contains("2 target(s) failed, 1 skipped"));

  assert!(!env.ninja_path().exists());
}

#[test]
fn gen_missing_project_fails() {
  let env = TestEnv::from_fixture("firmware.yaml");

  env
    .lathe_cmd()
    .args(["gen", "-p", "nope.yaml"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("Failed to read project"));
}
