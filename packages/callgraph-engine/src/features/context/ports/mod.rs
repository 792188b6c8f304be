//! Context selector port
//!
//! A selector maps a (caller, call site, callee, dispatch key) tuple to the
//! callee's context. Selectors are consulted in a fixed priority order and the
//! first one returning `Some` wins (see `SelectorChain`).

use crate::features::context::domain::{CallSiteRef, Context};
use crate::features::points_to::domain::InstanceKeyId;
use crate::features::points_to::infrastructure::HeapModel;
use crate::shared::models::MethodRef;

/// Abstract object that drove a dispatch decision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DispatchKey {
    /// Instance key flowing into the receiver of a virtual call
    Receiver(InstanceKeyId),

    /// Instance key flowing into argument `index` of a call
    Parameter { index: usize, key: InstanceKeyId },
}

/// Everything a selector may inspect
#[derive(Clone, Copy)]
pub struct SelectionRequest<'a> {
    pub caller_context: &'a Context,
    pub site: &'a CallSiteRef,
    pub callee: &'a MethodRef,
    pub dispatch_key: Option<DispatchKey>,
    pub heap: &'a HeapModel,
}

/// Context selection policy
pub trait ContextSelector: Send + Sync {
    /// Selector name for logs
    fn name(&self) -> &'static str;

    /// Context for the callee, or `None` to defer to the next selector
    fn select(&self, request: &SelectionRequest<'_>) -> Option<Context>;

    /// Argument position whose instance keys this selector keys static calls on
    fn relevant_parameter(&self, _callee: &MethodRef) -> Option<usize> {
        None
    }
}
