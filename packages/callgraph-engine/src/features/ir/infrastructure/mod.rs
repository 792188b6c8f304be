//! IR adapters and helpers

pub mod body_builder;
pub mod in_memory;

pub use body_builder::BodyBuilder;
pub use in_memory::{InMemoryIr, IrModel, MethodBodyEntry};
