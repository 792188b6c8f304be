//! Intermediate representation consumed by the engine

pub mod statement;

pub use statement::{InvokeInstruction, InvokeKind, MethodBody, Statement, ValueId};
