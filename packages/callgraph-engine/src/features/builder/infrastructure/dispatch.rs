//! Call target resolution and edge causes

use crate::features::call_graph::domain::EdgeCause;
use crate::features::context::domain::Context;
use crate::features::hierarchy::ports::ClassHierarchy;
use crate::features::ir::domain::InvokeKind;
use crate::features::points_to::domain::InstanceKeyId;
use crate::features::reflection::domain::ReflectiveOp;
use crate::shared::models::{MethodRef, TypeName};

/// How a callee's formals are bound when an edge is connected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Binding {
    /// Every argument flows into its formal
    All,
    /// The argument at `position` contributes only `key`; the rest flow normally
    Argument { position: usize, key: InstanceKeyId },
}

impl Binding {
    pub fn receiver(key: InstanceKeyId) -> Self {
        Binding::Argument { position: 0, key }
    }

    /// Position whose argument is not copied wholesale
    pub fn skipped(self) -> Option<usize> {
        match self {
            Binding::All => None,
            Binding::Argument { position, .. } => Some(position),
        }
    }
}

/// Target of a static or special invoke. Class initializers are taken as
/// given; everything else goes through method resolution from the declared class.
pub fn static_target(hierarchy: &dyn ClassHierarchy, kind: InvokeKind, target: &MethodRef) -> Option<MethodRef> {
    debug_assert!(!kind.is_dispatched());
    if target.is_class_initializer() {
        return hierarchy.method_info(target).map(|m| m.reference.clone());
    }
    hierarchy.resolve_method(target.declaring_class(), target.selector())
}

/// Target of a virtual or interface invoke for one receiver type. Receivers
/// that are not subtypes of the declared class cannot reach the call.
pub fn dispatch_target(hierarchy: &dyn ClassHierarchy, receiver: &TypeName, declared: &MethodRef) -> Option<MethodRef> {
    if !hierarchy.is_subtype(receiver, declared.declaring_class()) {
        return None;
    }
    hierarchy.resolve_method(receiver, declared.selector())
}

/// The node runs a synthetic reflective body
pub fn is_synthetic(method: &MethodRef, context: &Context) -> Option<ReflectiveOp> {
    ReflectiveOp::classify(method).filter(|op| op.is_specialized(context))
}

/// Cause recorded for an edge out of a node of `caller_method` in `caller_context`
pub fn edge_cause(caller_method: &MethodRef, caller_context: &Context, kind: InvokeKind, is_root: bool) -> EdgeCause {
    if is_root {
        return EdgeCause::EntryPoint;
    }
    if let Some(op) = is_synthetic(caller_method, caller_context) {
        return EdgeCause::Reflective { op };
    }
    if kind.is_dispatched() {
        EdgeCause::VirtualDispatch
    } else {
        EdgeCause::StaticDispatch
    }
}
