//! A third-party verb plugged in through the public `Target` contract.
//!
//! `bundle` archives several inputs, which lets these tests build
//! diamond-shaped graphs that objcopy alone cannot express.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use serde::Deserialize;

use lathe_lib::consts::IMPLICIT_KEY;
use lathe_lib::delta::make_appending_delta;
use lathe_lib::edge::{ArtifactRef, BuildEdge};
use lathe_lib::env::{Environment, EnvironmentResolver};
use lathe_lib::graph::assemble;
use lathe_lib::ident::Identifier;
use lathe_lib::loader::{LoadError, load};
use lathe_lib::ninja;
use lathe_lib::project::{Package, Project};
use lathe_lib::rule::{Rule, RuleTable};
use lathe_lib::target::{Products, Target, TargetError, objcopy};
use lathe_lib::verbs::VerbRegistry;

#[derive(Debug)]
struct Bundle {
  id: Identifier,
  package: Package,
  environment: String,
  srcs: Vec<ArtifactRef>,
  resolved: OnceLock<Environment>,
}

#[derive(Deserialize)]
struct BundleParams {
  environment: String,
  srcs: Vec<String>,
}

fn declare_bundle(package: &Package, name: &str, params: serde_yaml::Value) -> Result<Box<dyn Target>, LoadError> {
  let id = package.identifier(name)?;
  let params: BundleParams = serde_yaml::from_value(params).map_err(|source| LoadError::InvalidParams {
    target: id.to_string(),
    source,
  })?;
  let srcs = params
    .srcs
    .iter()
    .map(|s| ArtifactRef::parse(s, package.path()))
    .collect::<Result<Vec<_>, _>>()?;
  Ok(Box::new(Bundle {
    id,
    package: package.clone(),
    environment: params.environment,
    srcs,
    resolved: OnceLock::new(),
  }))
}

impl Target for Bundle {
  fn identifier(&self) -> &Identifier {
    &self.id
  }

  fn verb(&self) -> &'static str {
    "bundle"
  }

  fn is_leaf(&self) -> bool {
    true
  }

  fn dependencies(&self) -> Vec<Identifier> {
    self.srcs.iter().filter_map(|s| s.producer().cloned()).collect()
  }

  fn resolve_environment(&self, project: &Project) -> Result<&Environment, TargetError> {
    let env = project.resolve(&self.environment).map_err(|_| TargetError::UnknownEnvironment {
      target: self.id.clone(),
      environment: self.environment.clone(),
    })?;
    Ok(self.resolved.get_or_init(|| env.clone()))
  }

  fn lower(&self, env: &Environment) -> Result<Products, TargetError> {
    let tar = env.get("tar").ok_or_else(|| TargetError::MissingToolBinding {
      target: self.id.clone(),
      key: "tar".to_string(),
    })?;
    let inputs = self
      .srcs
      .iter()
      .map(|s| match s {
        ArtifactRef::Source(path) => path.clone(),
        ArtifactRef::Output(id) => self.package.project().genpath(id),
      })
      .collect();
    Ok(Products {
      using: make_appending_delta([(IMPLICIT_KEY, vec![self.id.to_string()])]),
      edges: vec![BuildEdge {
        rule: "bundle".to_string(),
        inputs,
        implicit: Vec::new(),
        outputs: vec![self.package.genpath(self.id.name())],
        variables: BTreeMap::from([("tar".to_string(), tar.to_string())]),
      }],
    })
  }

  fn products(&self) -> Result<Products, TargetError> {
    let env = self.resolved.get().ok_or_else(|| TargetError::NotResolved {
      target: self.id.clone(),
    })?;
    self.lower(env)
  }
}

fn verbs() -> VerbRegistry {
  VerbRegistry::standard().with("bundle", declare_bundle)
}

fn rules() -> RuleTable {
  let mut builder = RuleTable::builder();
  for rule in objcopy::rules() {
    builder = builder.register(rule).unwrap();
  }
  builder
    .register(Rule::new("bundle", "$tar cf $out $in", "TAR $out"))
    .unwrap()
    .build()
}

const DIAMOND: &str = r#"
environments:
  host: { objcopy: oc, tar: /bin/tar }
packages:
  fw:
    - { verb: objcopy, name: base, environment: host, src: base.elf }
    - { verb: objcopy, name: left, environment: host, src: ":base" }
    - { verb: objcopy, name: right, environment: host, src: ":base" }
    - { verb: bundle, name: top, environment: host, srcs: [":left", ":right"] }
"#;

fn id(s: &str) -> Identifier {
  s.parse().unwrap()
}

#[test]
fn diamond_inherits_each_producer_once() {
  let loaded = load(DIAMOND, &verbs()).unwrap();
  let rules = rules();
  let assembly = assemble(&loaded.project, &rules, &loaded.targets).unwrap();

  assert!(assembly.is_success());
  let top = assembly.bindings(&id("//fw:top")).unwrap();
  assert_eq!(
    top.list(IMPLICIT_KEY),
    ["//fw:base", "//fw:left", "//fw:right"].map(String::from).as_slice()
  );

  let top_edge = assembly.edges().iter().find(|e| e.outputs[0] == "gen/fw/top").unwrap();
  assert_eq!(top_edge.implicit, vec!["gen/fw/base".to_string()]);
}

#[test]
fn diamond_edges_are_topological() {
  let loaded = load(DIAMOND, &verbs()).unwrap();
  let rules = rules();
  let assembly = assemble(&loaded.project, &rules, &loaded.targets).unwrap();

  let position = |out: &str| assembly.edges().iter().position(|e| e.outputs[0] == out).unwrap();
  assert!(position("gen/fw/base") < position("gen/fw/left"));
  assert!(position("gen/fw/base") < position("gen/fw/right"));
  assert!(position("gen/fw/left") < position("gen/fw/top"));
  assert!(position("gen/fw/right") < position("gen/fw/top"));
}

#[test]
fn plugin_rules_render() {
  let loaded = load(DIAMOND, &verbs()).unwrap();
  let rules = rules();
  let assembly = assemble(&loaded.project, &rules, &loaded.targets).unwrap();
  let text = ninja::render(&rules, &assembly);

  assert!(text.contains("rule bundle\n  command = $tar cf $out $in\n"));
  assert!(text.contains("build gen/fw/top: bundle gen/fw/left gen/fw/right | gen/fw/base\n  tar = /bin/tar\n"));
  assert!(text.contains("build gen/fw/left: objcopy gen/fw/base\n"));
}

#[test]
fn unregistered_rule_fails_target() {
  let loaded = load(DIAMOND, &verbs()).unwrap();
  let rules = RuleTable::standard().unwrap();
  let assembly = assemble(&loaded.project, &rules, &loaded.targets).unwrap();

  assert!(matches!(
    assembly.failures().get(&id("//fw:top")),
    Some(TargetError::Rule { .. })
  ));
  assert_eq!(assembly.edges().len(), 3);
}
