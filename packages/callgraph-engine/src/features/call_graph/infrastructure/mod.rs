//! Call graph exports

pub mod export;
pub mod snapshot;

pub use export::{recursive_components, to_petgraph};
pub use snapshot::GraphSnapshot;
