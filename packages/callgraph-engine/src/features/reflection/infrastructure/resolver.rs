//! Reflective call sites and the FULL-mode bounded fallback
//!
//! Every call whose declared target is a reflective API method is recorded
//! as a `ReflectiveSite`. Context selection does the constant-driven work;
//! the site record is what the builder consults at quiescence to decide
//! whether some of its keys stayed unresolved, and if so whether a bounded
//! over-approximation applies.

use crate::features::call_graph::domain::NodeId;
use crate::features::hierarchy::ports::ClassHierarchy;
use crate::features::ir::domain::ValueId;
use crate::features::points_to::domain::{InstanceKey, PointerKey};
use crate::features::reflection::domain::ReflectiveOp;
use crate::shared::constants::methods;
use crate::shared::models::{MethodRef, TypeName};

/// A call site whose declared target is a reflective API method
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReflectiveSite {
    pub caller: NodeId,
    pub site: u32,
    pub op: ReflectiveOp,
    pub target: MethodRef,
    /// Receiver, or the name argument of `forName`
    pub key: PointerKey,
    pub args: Vec<ValueId>,
    pub def: Option<ValueId>,
    pub exception: Option<ValueId>,
    /// Type the result is cast to, if any
    pub bound: Option<TypeName>,
}

impl ReflectiveSite {
    pub fn describe(&self) -> String {
        format!("{} at {}#{}", self.op, self.caller, self.site)
    }
}

/// Resolution state of a site once the analysis is quiescent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SiteState {
    /// Nothing reaches the site
    Unreached,
    /// Every key carries the constant the operation needs
    Resolved,
    /// Some keys resolve, others are not usable
    Partial,
    /// Keys reach the site but none of them is usable
    Unresolved,
}

impl SiteState {
    /// Some key reaching the site was not resolved from a constant
    pub fn has_unresolved_keys(self) -> bool {
        matches!(self, SiteState::Partial | SiteState::Unresolved)
    }
}

pub fn site_state<'k>(op: ReflectiveOp, keys: impl IntoIterator<Item = &'k InstanceKey>) -> SiteState {
    let (mut resolving, mut other) = (false, false);
    for key in keys {
        if is_resolving_key(op, key) {
            resolving = true;
        } else {
            other = true;
        }
        if resolving && other {
            break;
        }
    }
    match (resolving, other) {
        (false, false) => SiteState::Unreached,
        (true, false) => SiteState::Resolved,
        (true, true) => SiteState::Partial,
        (false, true) => SiteState::Unresolved,
    }
}

/// One class a FULL-mode fallback instantiates, with the constructors it calls
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FallbackTarget {
    pub class: TypeName,
    pub constructors: Vec<MethodRef>,
}

/// Concrete classes assignable to `bound` that already have a reachable node,
/// with the constructors an unresolved instantiation may run
pub fn fallback_targets(
    op: ReflectiveOp,
    bound: &TypeName,
    hierarchy: &dyn ClassHierarchy,
    is_reachable: impl Fn(&TypeName) -> bool,
) -> Vec<FallbackTarget> {
    if !op.is_instantiation() {
        return Vec::new();
    }
    hierarchy
        .classes()
        .into_iter()
        .filter(|c| c.is_concrete() && hierarchy.is_subtype(&c.name, bound) && is_reachable(&c.name))
        .filter_map(|c| {
            let constructors: Vec<MethodRef> = c
                .constructors()
                .filter(|m| match op {
                    ReflectiveOp::ClassNewInstance => m.reference.descriptor() == methods::NO_ARG_DESCRIPTOR,
                    _ => true,
                })
                .map(|m| m.reference.clone())
                .collect();
            (!constructors.is_empty()).then(|| FallbackTarget {
                class: c.name.clone(),
                constructors,
            })
        })
        .collect()
}
