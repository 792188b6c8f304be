//! Shared names and constants used across features

pub mod constants;
pub mod models;

pub use models::{FieldRef, MethodRef, Selector, TypeName};
