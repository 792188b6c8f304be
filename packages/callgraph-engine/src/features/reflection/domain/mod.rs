//! Reflection policy and recognized APIs

pub mod api;
pub mod options;

pub use api::ReflectiveOp;
pub use options::ReflectionOptions;
