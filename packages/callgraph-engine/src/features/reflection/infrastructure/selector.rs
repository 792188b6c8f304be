//! Context selection for reflective API methods
//!
//! A reflective API node is specialized on the reflective fact that reaches
//! it: the constant class name for `forName`, the constant `Class` or member
//! object for receiver-based operations and the receiver type for `getClass`.
//! Each distinct fact therefore gets its own node, and the node's synthetic
//! body can read the fact back from its context.

use crate::features::context::domain::Context;
use crate::features::context::ports::{ContextSelector, DispatchKey, SelectionRequest};
use crate::features::reflection::domain::{ReflectionOptions, ReflectiveOp};
use crate::shared::models::MethodRef;

#[derive(Debug, Clone, Copy)]
pub struct ReflectionContextSelector {
    options: ReflectionOptions,
}

impl ReflectionContextSelector {
    pub fn new(options: ReflectionOptions) -> Self {
        Self { options }
    }
}

impl ContextSelector for ReflectionContextSelector {
    fn name(&self) -> &'static str {
        "reflection"
    }

    fn select(&self, request: &SelectionRequest<'_>) -> Option<Context> {
        if !self.options.is_enabled() {
            return None;
        }
        let op = ReflectiveOp::classify(request.callee)?;
        let heap = request.heap;

        match (op, request.dispatch_key?) {
            (ReflectiveOp::GetClass, DispatchKey::Receiver(ik)) => {
                Some(Context::ReceiverType(heap.instance_type(ik)))
            }
            (ReflectiveOp::ForName, DispatchKey::Parameter { index: 0, key }) => heap
                .instance_key(key)
                .as_string_constant()
                .map(|_| Context::ConstantParameter { index: 0, key }),
            (op, DispatchKey::Receiver(ik)) if op.has_class_receiver() => heap
                .instance_key(ik)
                .as_class_constant()
                .map(|_| Context::ReceiverInstance(ik)),
            (ReflectiveOp::ConstructorNewInstance, DispatchKey::Receiver(ik)) => heap
                .instance_key(ik)
                .as_method_constant()
                .filter(|m| m.is_constructor())
                .map(|_| Context::ReceiverInstance(ik)),
            (ReflectiveOp::MethodInvoke, DispatchKey::Receiver(ik)) => heap
                .instance_key(ik)
                .as_method_constant()
                .filter(|m| !m.is_constructor() && !m.is_class_initializer())
                .map(|_| Context::ReceiverInstance(ik)),
            _ => None,
        }
    }

    fn relevant_parameter(&self, callee: &MethodRef) -> Option<usize> {
        match ReflectiveOp::classify(callee) {
            Some(ReflectiveOp::ForName) if self.options.is_enabled() => Some(0),
            _ => None,
        }
    }
}
