//! Intermediate representation
//!
//! Statement model, the `IrOracle` port and an in-memory oracle.

pub mod domain;
pub mod infrastructure;
pub mod ports;

pub use domain::{InvokeInstruction, InvokeKind, MethodBody, Statement, ValueId};
pub use infrastructure::{BodyBuilder, InMemoryIr, IrModel, MethodBodyEntry};
pub use ports::IrOracle;
