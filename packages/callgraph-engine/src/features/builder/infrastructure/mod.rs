//! Builder infrastructure: dispatch and lowering

pub mod dispatch;
pub mod lowering;

pub use dispatch::{dispatch_target, edge_cause, is_synthetic, static_target, Binding};
pub use lowering::{LoweredBody, LoweredInvoke, LoweredOp, LoweringContext};
