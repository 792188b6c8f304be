//! Synthetic bodies for specialized reflective API nodes
//!
//! A reflective API node whose context carries a resolved fact behaves like a
//! small ordinary method: `forName("T")` initializes `T` and returns `T.class`,
//! `Constructor.newInstance` on constructor `M` allocates and calls `M`, and so
//! on. The bodies go through normal lowering, so their effects reach the
//! call graph and the heap through the same rules as user code.

use super::lookup::LookupRequest;
use crate::features::context::domain::Context;
use crate::features::hierarchy::ports::ClassHierarchy;
use crate::features::ir::domain::{MethodBody, ValueId};
use crate::features::ir::infrastructure::BodyBuilder;
use crate::features::points_to::infrastructure::HeapModel;
use crate::features::reflection::domain::ReflectiveOp;
use crate::shared::constants::{methods, types};
use crate::shared::models::{MethodRef, TypeName};

/// Synthetic body plus the side requests that do not fit a body
#[derive(Debug, Clone)]
pub struct Synthesized {
    pub op: ReflectiveOp,
    pub body: MethodBody,
    /// Member lookup answered incrementally into the node's return value
    pub lookup: Option<LookupRequest>,
    /// Class to initialize without a reflective `<clinit>` edge
    pub initialize: Option<TypeName>,
    /// Reflectively named class or member that is outside the hierarchy
    pub missing: Option<String>,
}

impl Synthesized {
    fn new(op: ReflectiveOp, body: MethodBody) -> Self {
        Self {
            op,
            body,
            lookup: None,
            initialize: None,
            missing: None,
        }
    }

    fn missing(op: ReflectiveOp, method: &MethodRef, what: impl Into<String>) -> Self {
        let mut s = Self::new(op, BodyBuilder::for_method(method, false).build());
        s.missing = Some(what.into());
        s
    }
}

/// Synthetic body for (method, context), or `None` when the node is not a
/// specialized reflective node and should use the oracle body
pub fn synthesize(
    method: &MethodRef,
    context: &Context,
    heap: &HeapModel,
    hierarchy: &dyn ClassHierarchy,
) -> Option<Synthesized> {
    let op = ReflectiveOp::classify(method)?;
    if !op.is_specialized(context) {
        return None;
    }

    if let Context::ReceiverType(ty) = context {
        return Some(get_class(op, method, ty));
    }

    let key = heap.instance_key(context.keyed_instance()?);
    let synthesized = match op {
        ReflectiveOp::ForName => for_name(op, method, key.as_string_constant()?, hierarchy),
        ReflectiveOp::ClassNewInstance => class_new_instance(op, method, key.as_class_constant()?, hierarchy),
        ReflectiveOp::ConstructorNewInstance => {
            constructor_new_instance(op, method, key.as_method_constant()?, hierarchy)
        }
        ReflectiveOp::MethodInvoke => method_invoke(op, method, key.as_method_constant()?, hierarchy),
        ReflectiveOp::GetConstructors { .. } | ReflectiveOp::GetMethods { .. } => {
            member_array(op, method, key.as_class_constant()?, hierarchy)
        }
        ReflectiveOp::GetConstructor { .. } | ReflectiveOp::GetMethod { .. } => {
            member_lookup(op, method, key.as_class_constant()?, hierarchy)
        }
        ReflectiveOp::GetClass => return None,
    };
    Some(synthesized)
}

/// A loadable type: a class in the hierarchy or an array of one (or of a primitive)
fn is_loadable(ty: &TypeName, hierarchy: &dyn ClassHierarchy) -> bool {
    let mut base = ty.clone();
    while let Some(element) = base.element_type() {
        base = element;
    }
    base.is_primitive() || hierarchy.contains(&base)
}

fn for_name(op: ReflectiveOp, method: &MethodRef, name: &str, hierarchy: &dyn ClassHierarchy) -> Synthesized {
    let Some(ty) = TypeName::from_binary_name(name).filter(|t| is_loadable(t, hierarchy)) else {
        return Synthesized::missing(op, method, format!("class \"{name}\""));
    };

    let mut b = BodyBuilder::for_method(method, true);
    let mut initialize = None;
    if !ty.is_array() {
        match hierarchy.class_initializer(&ty) {
            Some(clinit) => {
                b.invoke_static(&clinit, &[]);
            }
            None => initialize = Some(ty.clone()),
        }
    }
    let class = b.class_literal(ty);
    b.ret(class);

    let mut s = Synthesized::new(op, b.build());
    s.initialize = initialize;
    s
}

fn class_new_instance(
    op: ReflectiveOp,
    method: &MethodRef,
    ty: &TypeName,
    hierarchy: &dyn ClassHierarchy,
) -> Synthesized {
    if !is_loadable(ty, hierarchy) {
        return Synthesized::missing(op, method, format!("class {ty}"));
    }
    let mut b = BodyBuilder::for_method(method, false);
    if !ty.is_array()
        && hierarchy.is_concrete(ty)
        && hierarchy.declares_constructor(ty, methods::NO_ARG_DESCRIPTOR)
    {
        if let Ok(init) = MethodRef::new(ty.clone(), methods::INIT, methods::NO_ARG_DESCRIPTOR) {
            let object = b.new_object(ty.clone());
            b.invoke_special(&init, &[object]);
            b.ret(object);
        }
    }
    Synthesized::new(op, b.build())
}

/// Arguments for `target` drawn from the contents of `array`
fn spread_arguments(b: &mut BodyBuilder, target: &MethodRef, array: ValueId) -> Vec<ValueId> {
    if target.arity() == 0 {
        return Vec::new();
    }
    let element = b.array_load(array);
    vec![element; target.arity()]
}

fn constructor_new_instance(
    op: ReflectiveOp,
    method: &MethodRef,
    ctor: &MethodRef,
    hierarchy: &dyn ClassHierarchy,
) -> Synthesized {
    let class = ctor.declaring_class();
    if hierarchy.method_info(ctor).is_none() {
        return Synthesized::missing(op, method, format!("constructor {ctor}"));
    }
    let mut b = BodyBuilder::for_method(method, false);
    if hierarchy.is_concrete(class) {
        let array = b.param(1);
        let object = b.new_object(class.clone());
        let mut args = vec![object];
        args.extend(spread_arguments(&mut b, ctor, array));
        b.invoke_special(ctor, &args);
        b.ret(object);
    }
    Synthesized::new(op, b.build())
}

fn method_invoke(
    op: ReflectiveOp,
    method: &MethodRef,
    target: &MethodRef,
    hierarchy: &dyn ClassHierarchy,
) -> Synthesized {
    let Some(info) = hierarchy.method_info(target) else {
        return Synthesized::missing(op, method, format!("method {target}"));
    };
    let mut b = BodyBuilder::for_method(method, false);
    let receiver = b.param(1);
    let array = b.param(2);
    let spread = spread_arguments(&mut b, target, array);
    let result = if info.is_static() {
        b.invoke_static(target, &spread)
    } else {
        let mut args = vec![receiver];
        args.extend(spread);
        b.invoke_virtual(target, &args)
    };
    b.ret(result);
    Synthesized::new(op, b.build())
}

fn get_class(op: ReflectiveOp, method: &MethodRef, ty: &TypeName) -> Synthesized {
    let mut b = BodyBuilder::for_method(method, false);
    let class = b.class_literal(ty.clone());
    b.ret(class);
    Synthesized::new(op, b.build())
}

/// Members a `getXxx` operation on `class` may return, in declaration order
pub fn candidate_members(op: ReflectiveOp, class: &TypeName, hierarchy: &dyn ClassHierarchy) -> Vec<MethodRef> {
    match op {
        ReflectiveOp::GetConstructor { declared } | ReflectiveOp::GetConstructors { declared } => hierarchy
            .declared_constructors(class)
            .into_iter()
            .filter(|m| declared || m.is_public())
            .map(|m| m.reference.clone())
            .collect(),
        ReflectiveOp::GetMethod { declared: true } | ReflectiveOp::GetMethods { declared: true } => hierarchy
            .declared_methods(class)
            .into_iter()
            .map(|m| m.reference.clone())
            .collect(),
        ReflectiveOp::GetMethod { declared: false } | ReflectiveOp::GetMethods { declared: false } => hierarchy
            .public_methods(class)
            .into_iter()
            .map(|m| m.reference.clone())
            .collect(),
        _ => Vec::new(),
    }
}

fn member_array(
    op: ReflectiveOp,
    method: &MethodRef,
    class: &TypeName,
    hierarchy: &dyn ClassHierarchy,
) -> Synthesized {
    if !hierarchy.contains(class) {
        return Synthesized::missing(op, method, format!("class {class}"));
    }
    let element = match op {
        ReflectiveOp::GetConstructors { .. } => types::CONSTRUCTOR,
        _ => types::METHOD,
    };
    let members = candidate_members(op, class, hierarchy);
    let mut b = BodyBuilder::for_method(method, false);
    let array = b.new_array(element, Some(members.len() as u32));
    for member in &members {
        let constant = b.method_constant(member);
        b.array_store(array, constant);
    }
    b.ret(array);
    Synthesized::new(op, b.build())
}

fn member_lookup(
    op: ReflectiveOp,
    method: &MethodRef,
    class: &TypeName,
    hierarchy: &dyn ClassHierarchy,
) -> Synthesized {
    if !hierarchy.contains(class) {
        return Synthesized::missing(op, method, format!("class {class}"));
    }
    let b = BodyBuilder::for_method(method, false);
    // getMethod(String, Class[]) vs getConstructor(Class[])
    let (name_param, types_param) = match op {
        ReflectiveOp::GetMethod { .. } => (Some(b.param(1)), b.param(2)),
        _ => (None, b.param(1)),
    };
    let mut s = Synthesized::new(op, b.build());
    s.lookup = Some(LookupRequest {
        op,
        class: class.clone(),
        name_param,
        types_param,
        candidates: candidate_members(op, class, hierarchy),
    });
    s
}
