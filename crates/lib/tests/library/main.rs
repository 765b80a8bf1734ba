//! Integration tests for lathe-lib.

mod lowering_tests;
mod plugin_tests;
