//! Class hierarchy port
//!
//! The engine consumes an already-built hierarchy through this trait. Only
//! `lookup_class`, `classes` and `is_subtype` are required; the lookups derived
//! from declared members have default implementations in terms of those.

use crate::features::hierarchy::domain::{ClassInfo, MethodInfo};
use crate::shared::constants::types;
use crate::shared::models::{FieldRef, MethodRef, Selector, TypeName};
use rustc_hash::FxHashSet;
use std::collections::VecDeque;

pub trait ClassHierarchy: Send + Sync {
    fn lookup_class(&self, ty: &TypeName) -> Option<&ClassInfo>;

    /// Every class in the hierarchy, in a deterministic order
    fn classes(&self) -> Vec<&ClassInfo>;

    /// Reflexive subtype test. Arrays are subtypes of `java.lang.Object` and
    /// covariant in reference element types.
    fn is_subtype(&self, sub: &TypeName, sup: &TypeName) -> bool;

    fn contains(&self, ty: &TypeName) -> bool {
        self.lookup_class(ty).is_some()
    }

    /// Classes that can be instantiated with `new`
    fn is_concrete(&self, ty: &TypeName) -> bool {
        if ty.is_array() {
            return true;
        }
        self.lookup_class(ty).is_some_and(ClassInfo::is_concrete)
    }

    fn method_info(&self, method: &MethodRef) -> Option<&MethodInfo> {
        self.lookup_class(method.declaring_class())?
            .declared_method(method.selector())
    }

    /// Method-resolution order: superclass chain first, then default methods
    /// of superinterfaces. Abstract declarations never resolve.
    fn resolve_method(&self, receiver: &TypeName, selector: &Selector) -> Option<MethodRef> {
        let start = if receiver.is_array() {
            TypeName::object()
        } else {
            receiver.clone()
        };

        let mut interfaces = VecDeque::new();
        let mut current = Some(start);
        while let Some(ty) = current {
            let class = self.lookup_class(&ty)?;
            if let Some(m) = class.declared_method(selector) {
                if !m.is_abstract() {
                    return Some(m.reference.clone());
                }
            }
            interfaces.extend(class.interfaces.iter().cloned());
            current = class.superclass.clone();
        }

        let mut seen = FxHashSet::default();
        while let Some(iface) = interfaces.pop_front() {
            if !seen.insert(iface.clone()) {
                continue;
            }
            let Some(class) = self.lookup_class(&iface) else {
                continue;
            };
            if let Some(m) = class.declared_method(selector) {
                if !m.is_abstract() && !m.is_static() {
                    return Some(m.reference.clone());
                }
            }
            interfaces.extend(class.interfaces.iter().cloned());
        }
        None
    }

    /// Canonical declaring class of a field, searching superclasses
    fn resolve_field(&self, field: &FieldRef) -> FieldRef {
        let mut current = Some(field.class.clone());
        while let Some(ty) = current {
            let Some(class) = self.lookup_class(&ty) else {
                break;
            };
            if class.declares_field(&field.name) {
                return FieldRef::new(ty, &*field.name);
            }
            current = class.superclass.clone();
        }
        field.clone()
    }

    fn declared_constructors(&self, ty: &TypeName) -> Vec<&MethodInfo> {
        self.lookup_class(ty)
            .map(|c| c.constructors().collect())
            .unwrap_or_default()
    }

    fn declares_constructor(&self, ty: &TypeName, descriptor: &str) -> bool {
        self.declared_constructors(ty)
            .iter()
            .any(|m| m.reference.descriptor() == descriptor)
    }

    fn class_initializer(&self, ty: &TypeName) -> Option<MethodRef> {
        self.lookup_class(ty)?
            .methods
            .iter()
            .find(|m| m.reference.is_class_initializer())
            .map(|m| m.reference.clone())
    }

    /// Ordinary methods declared by the class itself
    fn declared_methods(&self, ty: &TypeName) -> Vec<&MethodInfo> {
        self.lookup_class(ty)
            .map(|c| c.ordinary_methods().collect())
            .unwrap_or_default()
    }

    /// Public ordinary methods declared by the class or inherited from any
    /// supertype, the most specific declaration of each selector winning
    fn public_methods(&self, ty: &TypeName) -> Vec<&MethodInfo> {
        let mut out = Vec::new();
        let mut selectors = FxHashSet::default();
        let mut visited = FxHashSet::default();
        let mut queue = VecDeque::from([ty.clone()]);
        while let Some(current) = queue.pop_front() {
            if !visited.insert(current.clone()) {
                continue;
            }
            let Some(class) = self.lookup_class(&current) else {
                continue;
            };
            for m in class.ordinary_methods().filter(|m| m.is_public()) {
                if selectors.insert(m.selector().clone()) {
                    out.push(m);
                }
            }
            queue.extend(class.superclass.iter().cloned());
            queue.extend(class.interfaces.iter().cloned());
        }
        out
    }

    /// Superclass chain starting at `ty` itself
    fn superclass_chain(&self, ty: &TypeName) -> Vec<TypeName> {
        let mut chain = Vec::new();
        let mut current = Some(ty.clone());
        while let Some(t) = current {
            if chain.contains(&t) {
                break;
            }
            current = self.lookup_class(&t).and_then(|c| c.superclass.clone());
            chain.push(t);
        }
        chain
    }
}

/// Subtype test by walking declared supertypes; usable by hierarchies that do
/// not precompute a closure.
pub fn walk_is_subtype(hierarchy: &dyn ClassHierarchy, sub: &TypeName, sup: &TypeName) -> bool {
    if sub == sup {
        return true;
    }
    if sub.is_primitive() || sup.is_primitive() {
        return false;
    }
    if sup.as_str() == types::OBJECT {
        return true;
    }
    match (sub.element_type(), sup.element_type()) {
        (Some(se), Some(pe)) => {
            return !se.is_primitive() && !pe.is_primitive() && walk_is_subtype(hierarchy, &se, &pe)
        }
        (Some(_), None) | (None, Some(_)) => return false,
        (None, None) => {}
    }

    let mut visited = FxHashSet::default();
    let mut queue = VecDeque::from([sub.clone()]);
    while let Some(ty) = queue.pop_front() {
        if &ty == sup {
            return true;
        }
        if !visited.insert(ty.clone()) {
            continue;
        }
        if let Some(class) = hierarchy.lookup_class(&ty) {
            queue.extend(class.superclass.iter().cloned());
            queue.extend(class.interfaces.iter().cloned());
        }
    }
    false
}
