//! End-to-end lowering of objcopy targets through the public API.

use std::collections::BTreeMap;

use lathe_lib::consts::IMPLICIT_KEY;
use lathe_lib::delta::{Bindings, DeltaOp};
use lathe_lib::edge::{ArtifactRef, BuildEdge};
use lathe_lib::rule::RuleTable;
use lathe_lib::target::objcopy::Objcopy;
use lathe_lib::target::{Target, TargetError};

use super::common::{host_project, package};

fn strip_target(environment: &str) -> (lathe_lib::project::Project, Objcopy) {
  let project = host_project();
  let pkg = package(&project, "pkgA");
  let target = Objcopy::new(&pkg, "strip", environment, ArtifactRef::Source("sourceX".to_string()), "-S").unwrap();
  (project, target)
}

mod scenarios {
  use super::*;

  #[test]
  fn host_environment_lowers_to_one_edge() {
    let (project, target) = strip_target("host");
    let env = target.resolve_environment(&project).unwrap();
    let products = target.lower(env).unwrap();

    let expected = BuildEdge {
      rule: "objcopy".to_string(),
      inputs: vec!["sourceX".to_string()],
      implicit: Vec::new(),
      outputs: vec![package(&project, "pkgA").genpath("strip")],
      variables: BTreeMap::from([
        ("objcopy".to_string(), "/usr/bin/objtool".to_string()),
        ("options".to_string(), "-S".to_string()),
      ]),
    };
    assert_eq!(products.edges, vec![expected]);
    assert!(RuleTable::standard().unwrap().check_edge(&products.edges[0]).is_ok());
  }

  #[test]
  fn missing_environment_references_target_identity() {
    let (project, target) = strip_target("missing");
    let err = target.resolve_environment(&project).unwrap_err();
    assert!(matches!(&err, TargetError::UnknownEnvironment { environment, .. } if environment == "missing"));
    assert_eq!(err.target().to_string(), "//pkgA:strip");
  }

  #[test]
  fn environment_without_tool_names_missing_key() {
    let (project, target) = strip_target("host2");
    let env = target.resolve_environment(&project).unwrap();
    let err = target.lower(env).unwrap_err();
    assert!(err.to_string().contains("'objcopy'"));
    assert!(matches!(err, TargetError::MissingToolBinding { key, .. } if key == "objcopy"));
  }
}

mod properties {
  use super::*;

  #[test]
  fn lowering_twice_is_identical() {
    let (project, target) = strip_target("host");
    target.resolve_environment(&project).unwrap();
    assert_eq!(target.products().unwrap(), target.products().unwrap());
  }

  #[test]
  fn same_identity_same_output_path() {
    let (_, a) = strip_target("host");
    let (_, b) = strip_target("host2");
    assert_eq!(a.output_path(), b.output_path());
  }

  #[test]
  fn self_composed_delta_applies_once() {
    let (project, target) = strip_target("host");
    let env = target.resolve_environment(&project).unwrap();
    let using = target.lower(env).unwrap().using;

    let mut once = Bindings::new();
    using.apply(&mut once).unwrap();

    let mut diamond = Bindings::new();
    using.compose(&using).unwrap().apply(&mut diamond).unwrap();

    assert_eq!(once, diamond);
    assert_eq!(once.list(IMPLICIT_KEY), ["//pkgA:strip".to_string()].as_slice());
  }

  #[test]
  fn using_is_append_only() {
    let (project, target) = strip_target("host");
    let env = target.resolve_environment(&project).unwrap();
    let using = target.lower(env).unwrap().using;
    assert!(using.iter().all(|(_, op)| matches!(op, DeltaOp::Append(_))));
  }
}
