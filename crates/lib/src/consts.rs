//! Reserved names shared across the crate.

/// Delta field that accumulates the identifiers a consumer must treat as
/// implicit dependencies.
pub const IMPLICIT_KEY: &str = "__implicit__";

/// Default root of the package-scoped output namespace.
pub const DEFAULT_GENROOT: &str = "gen";

/// Template variables filled by the graph assembler from an edge's
/// inputs and outputs. Edges never bind these themselves.
pub const RESERVED_VARIABLES: [&str; 2] = ["in", "out"];
