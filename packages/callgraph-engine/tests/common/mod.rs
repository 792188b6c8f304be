//! Common test utilities for callgraph-engine
//!
//! Shared runtime-library fixture, program builders and call graph
//! assertions for integration and unit tests.

#![allow(dead_code)]

pub mod assertions;
pub mod builders;
pub mod fixtures;

pub use assertions::*;
pub use builders::*;
pub use fixtures::*;
