//! lathe-lib: build-step lowering for lathe
//!
//! This crate turns declarative build steps into concrete build-graph edges:
//! - `Target`: a named build step that lowers into edges plus a propagation delta
//! - `Environment`: named, immutable tool bindings resolved per target
//! - `Delta`: the composable record consumers of a target's output inherit
//! - `RuleTable`: the frozen set of command templates edges are bound to
//!
//! The `loader`, `graph` and `ninja` modules drive the protocol end to end
//! without touching the filesystem.

pub mod consts;
pub mod delta;
pub mod edge;
pub mod env;
pub mod graph;
pub mod ident;
pub mod loader;
pub mod ninja;
pub mod project;
pub mod rule;
pub mod target;
pub mod template;
pub mod verbs;
