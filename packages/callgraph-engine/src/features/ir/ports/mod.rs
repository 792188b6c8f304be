//! IR oracle port

use crate::features::ir::domain::MethodBody;
use crate::shared::models::MethodRef;
use std::sync::Arc;

/// Source of method bodies. Methods without a body (native, abstract or
/// outside the analysis scope) yield `None` and are treated as no-ops.
pub trait IrOracle: Send + Sync {
    fn body(&self, method: &MethodRef) -> Option<Arc<MethodBody>>;
}
