//! Call graph builder
//!
//! Worklist fixpoint over the call graph and the points-to relation. Entry
//! points seed a synthetic root node; every discovered node is lowered into
//! constraints, dispatch follows points-to facts, and reflective API nodes
//! run synthetic bodies chosen by their context.

pub mod application;
pub mod domain;
pub mod infrastructure;

pub use application::CallGraphBuilder;
pub use domain::{
    BuildResult, BuildStats, BuildStatus, CancellationToken, Diagnostics, Entrypoint, Warning, WarningKind,
};
