//! Identity types for program elements

pub mod names;

pub use names::{FieldRef, MethodRef, Selector, TypeName};
