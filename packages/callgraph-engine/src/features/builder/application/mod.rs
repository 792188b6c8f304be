//! Builder application layer

mod build_state;
pub mod call_graph_builder;

pub use call_graph_builder::CallGraphBuilder;
