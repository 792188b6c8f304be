//! Call graph domain

pub mod call_graph;
pub mod edge;
pub mod node;

pub use call_graph::CallGraph;
pub use edge::{EdgeCause, EdgeProvenance};
pub use node::{CgNode, NodeId};
