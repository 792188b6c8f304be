//! Statement lowering
//!
//! Turns the body of a newly discovered node into constraints over pointer
//! keys. Lowering only reads shared state (hierarchy, IR, interned heap), so a
//! batch of nodes can be lowered on rayon workers; the resulting ops are
//! applied to the engine sequentially in node order.

use super::super::domain::{Diagnostics, Warning, WarningKind};
use crate::features::call_graph::domain::{CgNode, NodeId};
use crate::features::hierarchy::ports::ClassHierarchy;
use crate::features::ir::domain::{InvokeInstruction, InvokeKind, MethodBody, Statement, ValueId};
use crate::features::ir::ports::IrOracle;
use crate::features::points_to::domain::{HeapAbstraction, InstanceKey, PointerKey, Slot};
use crate::features::points_to::infrastructure::HeapModel;
use crate::features::reflection::domain::{ReflectionOptions, ReflectiveOp};
use crate::features::reflection::infrastructure::{synthesize, LookupRequest, ReflectiveSite};
use crate::shared::models::{MethodRef, TypeName};
use std::sync::Arc;
use tracing::debug;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Invoke statement of a lowered body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoweredInvoke {
    pub site: u32,
    pub kind: InvokeKind,
    pub target: MethodRef,
    pub args: Vec<ValueId>,
    pub def: Option<ValueId>,
    pub exception: Option<ValueId>,
}

impl LoweredInvoke {
    fn new(site: u32, invoke: &InvokeInstruction) -> Self {
        Self {
            site,
            kind: invoke.kind,
            target: invoke.target.clone(),
            args: invoke.args.clone(),
            def: invoke.def,
            exception: invoke.exception,
        }
    }

    pub fn receiver(&self) -> Option<ValueId> {
        if self.kind.is_static() {
            None
        } else {
            self.args.first().copied()
        }
    }

    /// Position in `args` of declared parameter `index`
    pub fn position_of(&self, index: usize) -> usize {
        index + usize::from(!self.kind.is_static())
    }
}

/// Constraint produced by lowering, not yet interned
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoweredOp {
    Alloc { dst: PointerKey, key: InstanceKey },
    Copy { src: PointerKey, dst: PointerKey, filter: Option<TypeName> },
    Load { base: PointerKey, slot: Slot, dst: PointerKey },
    Store { base: PointerKey, slot: Slot, src: PointerKey },
    Invoke(LoweredInvoke),
    Initialize(TypeName),
    Lookup(LookupRequest),
}

#[derive(Debug, Clone)]
pub struct LoweredBody {
    pub node: NodeId,
    pub ops: Vec<LoweredOp>,
    pub reflective_sites: Vec<ReflectiveSite>,
    /// Set when the body was synthesized for a reflective API node
    pub synthetic: Option<ReflectiveOp>,
    /// False for methods without a body
    pub has_body: bool,
}

impl LoweredBody {
    pub fn new(node: NodeId) -> Self {
        Self {
            node,
            ops: Vec::new(),
            reflective_sites: Vec::new(),
            synthetic: None,
            has_body: false,
        }
    }
}

/// Read-only inputs shared by lowering workers
pub struct LoweringContext<'a> {
    pub hierarchy: &'a dyn ClassHierarchy,
    pub ir: &'a dyn IrOracle,
    pub heap: &'a HeapModel,
    pub options: ReflectionOptions,
    pub heap_abstraction: HeapAbstraction,
    pub diagnostics: &'a Diagnostics,
    /// Root node and its synthetic body
    pub root: Option<(NodeId, Arc<MethodBody>)>,
}

impl<'a> LoweringContext<'a> {
    /// Lower a batch of nodes, in parallel when `parallel` is set
    pub fn lower_batch(&self, nodes: &[CgNode], parallel: bool) -> Vec<LoweredBody> {
        #[cfg(feature = "parallel")]
        if parallel {
            return nodes.par_iter().map(|n| self.lower(n)).collect();
        }
        #[cfg(not(feature = "parallel"))]
        let _ = parallel;
        nodes.iter().map(|n| self.lower(n)).collect()
    }

    pub fn lower(&self, node: &CgNode) -> LoweredBody {
        let mut out = LoweredBody::new(node.id);

        let body = match &self.root {
            Some((root, body)) if *root == node.id => Some(Arc::clone(body)),
            _ => self.synthetic_body(node, &mut out).or_else(|| self.ir.body(&node.method)),
        };
        let Some(body) = body else {
            return out;
        };
        out.has_body = true;

        for (index, statement) in body.statements.iter().enumerate() {
            self.lower_statement(node, &body, index as u32, statement, &mut out);
        }
        out
    }

    fn synthetic_body(&self, node: &CgNode, out: &mut LoweredBody) -> Option<Arc<MethodBody>> {
        if !self.options.is_enabled() {
            return None;
        }
        let synthesized = synthesize(&node.method, &node.context, self.heap, self.hierarchy)?;
        debug!(
            method = %node.method,
            context = %node.context,
            op = synthesized.op.as_str(),
            "Synthesized reflective body"
        );
        out.synthetic = Some(synthesized.op);
        if let Some(missing) = synthesized.missing {
            self.diagnostics.report(
                Warning::new(
                    WarningKind::MissingReflectiveClass,
                    format!("{}: {missing} is not in the class hierarchy", synthesized.op),
                )
                .at(format!("{} [{}]", node.method, node.context)),
            );
        }
        if let Some(ty) = synthesized.initialize {
            out.ops.push(LoweredOp::Initialize(ty));
        }
        if let Some(request) = synthesized.lookup {
            out.ops.push(LoweredOp::Lookup(request));
        }
        Some(Arc::new(synthesized.body))
    }

    fn allocation_key(&self, node: NodeId, site: u32, ty: &TypeName) -> InstanceKey {
        match self.heap_abstraction {
            HeapAbstraction::TypeBased => InstanceKey::TypeBased(ty.clone()),
            HeapAbstraction::AllocationSite => InstanceKey::AllocationSite {
                node,
                site,
                ty: ty.clone(),
                length: None,
            },
        }
    }

    fn lower_statement(&self, node: &CgNode, body: &MethodBody, index: u32, statement: &Statement, out: &mut LoweredBody) {
        let n = node.id;
        let local = |value: ValueId| PointerKey::local(n, value);
        let ops = &mut out.ops;

        match statement {
            Statement::New { def, ty } => {
                if self.hierarchy.contains(ty) {
                    ops.push(LoweredOp::Initialize(ty.clone()));
                } else {
                    self.diagnostics.report(
                        Warning::new(WarningKind::UnresolvedClass, format!("allocation of unknown class {ty}"))
                            .at(format!("{}#{index}", node.method)),
                    );
                }
                ops.push(LoweredOp::Alloc {
                    dst: local(*def),
                    key: self.allocation_key(n, index, ty),
                });
            }
            // Arrays keep their allocation site so a constant length survives
            Statement::NewArray { def, ty, length } => ops.push(LoweredOp::Alloc {
                dst: local(*def),
                key: InstanceKey::AllocationSite {
                    node: n,
                    site: index,
                    ty: ty.clone(),
                    length: *length,
                },
            }),
            Statement::Constant { def, value } => ops.push(LoweredOp::Alloc {
                dst: local(*def),
                key: InstanceKey::Constant(value.clone()),
            }),
            Statement::Assign { def, src } => ops.push(LoweredOp::Copy {
                src: local(*src),
                dst: local(*def),
                filter: None,
            }),
            Statement::Phi { def, srcs } => {
                for src in srcs {
                    ops.push(LoweredOp::Copy {
                        src: local(*src),
                        dst: local(*def),
                        filter: None,
                    });
                }
            }
            Statement::CheckCast { def, src, ty } => ops.push(LoweredOp::Copy {
                src: local(*src),
                dst: local(*def),
                filter: Some(ty.clone()),
            }),
            Statement::GetField { def, object, field } => ops.push(LoweredOp::Load {
                base: local(*object),
                slot: Slot::Field(self.hierarchy.resolve_field(field)),
                dst: local(*def),
            }),
            Statement::PutField { object, field, value } => ops.push(LoweredOp::Store {
                base: local(*object),
                slot: Slot::Field(self.hierarchy.resolve_field(field)),
                src: local(*value),
            }),
            Statement::GetStatic { def, field } => {
                let field = self.hierarchy.resolve_field(field);
                ops.push(LoweredOp::Initialize(field.class.clone()));
                ops.push(LoweredOp::Copy {
                    src: PointerKey::StaticField(field),
                    dst: local(*def),
                    filter: None,
                });
            }
            Statement::PutStatic { field, value } => {
                let field = self.hierarchy.resolve_field(field);
                ops.push(LoweredOp::Initialize(field.class.clone()));
                ops.push(LoweredOp::Copy {
                    src: local(*value),
                    dst: PointerKey::StaticField(field),
                    filter: None,
                });
            }
            Statement::ArrayLoad { def, array } => ops.push(LoweredOp::Load {
                base: local(*array),
                slot: Slot::ArrayContents,
                dst: local(*def),
            }),
            Statement::ArrayStore { array, value } => ops.push(LoweredOp::Store {
                base: local(*array),
                slot: Slot::ArrayContents,
                src: local(*value),
            }),
            Statement::Invoke(invoke) => {
                if let Some(site) = self.reflective_site(n, body, index, invoke) {
                    out.reflective_sites.push(site);
                }
                out.ops.push(LoweredOp::Invoke(LoweredInvoke::new(index, invoke)));
            }
            Statement::Return { value } => {
                if let Some(value) = value {
                    ops.push(LoweredOp::Copy {
                        src: local(*value),
                        dst: PointerKey::ReturnValue(n),
                        filter: None,
                    });
                }
            }
            Statement::Throw { value } => ops.push(LoweredOp::Copy {
                src: local(*value),
                dst: PointerKey::ExceptionalReturn(n),
                filter: None,
            }),
        }
    }

    fn reflective_site(&self, n: NodeId, body: &MethodBody, index: u32, invoke: &InvokeInstruction) -> Option<ReflectiveSite> {
        if !self.options.is_enabled() {
            return None;
        }
        let op = ReflectiveOp::classify(&invoke.target)?;
        if op == ReflectiveOp::GetClass {
            return None;
        }
        let key = match op {
            ReflectiveOp::ForName => invoke.parameter(0)?,
            _ => invoke.receiver()?,
        };
        Some(ReflectiveSite {
            caller: n,
            site: index,
            op,
            target: invoke.target.clone(),
            key: PointerKey::local(n, key),
            args: invoke.args.clone(),
            def: invoke.def,
            exception: invoke.exception,
            bound: invoke.def.and_then(|d| body.cast_type_of(d)).cloned(),
        })
    }
}
