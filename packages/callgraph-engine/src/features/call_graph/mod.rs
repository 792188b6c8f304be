//! Call graph
//!
//! Arena of (method, context) nodes with provenance-carrying edges, plus
//! petgraph export and canonical snapshots for comparing runs.

pub mod domain;
pub mod infrastructure;

pub use domain::{CallGraph, CgNode, EdgeCause, EdgeProvenance, NodeId};
pub use infrastructure::{recursive_components, to_petgraph, GraphSnapshot};
