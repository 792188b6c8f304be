//! Incremental `getConstructor` / `getMethod` resolution
//!
//! A lookup collects the constant names and parameter-type arrays that reach
//! a specialized `getXxx` node and answers which candidate members match.
//! Strict matches (constant name, known-length array of constant classes) are
//! monotone and reported as soon as the facts arrive. Relaxed matches depend
//! on the absence of facts and are only asked for at quiescence.

use crate::features::ir::domain::ValueId;
use crate::features::points_to::domain::{InstanceKey, InstanceKeyId};
use crate::features::reflection::domain::{ReflectionOptions, ReflectiveOp};
use crate::shared::models::{MethodRef, TypeName};
use rustc_hash::{FxHashMap, FxHashSet};
use std::collections::BTreeSet;
use std::sync::Arc;

/// What a synthetic `getXxx` node looks up, and where its arguments live
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupRequest {
    pub op: ReflectiveOp,
    pub class: TypeName,
    /// Parameter holding the member name (`getMethod` family only)
    pub name_param: Option<ValueId>,
    /// Parameter holding the `Class[]` of parameter types
    pub types_param: ValueId,
    pub candidates: Vec<MethodRef>,
}

#[derive(Debug, Default)]
struct ParameterTypes {
    length: Option<u32>,
    classes: BTreeSet<TypeName>,
    non_constant: bool,
}

/// Result of a quiescent resolution round
#[derive(Debug, Default)]
pub struct Relaxed {
    pub matches: Vec<MethodRef>,
    /// Why the lookup could not be fully resolved, when it could not
    pub unresolved: Option<String>,
}

#[derive(Debug)]
pub struct MemberLookup {
    request: LookupRequest,
    names: BTreeSet<Arc<str>>,
    name_non_constant: bool,
    arrays: FxHashMap<InstanceKeyId, ParameterTypes>,
    /// Something other than a known-length array reached the types parameter
    types_unknown: bool,
    emitted: FxHashSet<usize>,
}

impl MemberLookup {
    pub fn new(request: LookupRequest) -> Self {
        Self {
            request,
            names: BTreeSet::new(),
            name_non_constant: false,
            arrays: FxHashMap::default(),
            types_unknown: false,
            emitted: FxHashSet::default(),
        }
    }

    pub fn add_name(&mut self, key: &InstanceKey) {
        match key.as_string_constant() {
            Some(name) => {
                self.names.insert(Arc::from(name));
            }
            None => self.name_non_constant = true,
        }
    }

    /// Record a key reaching the types parameter. Returns true for a newly
    /// seen array whose contents the caller should start observing.
    pub fn add_types(&mut self, id: InstanceKeyId, key: &InstanceKey) -> bool {
        if !key.concrete_type().is_array() {
            self.types_unknown = true;
            return false;
        }
        if self.arrays.contains_key(&id) {
            return false;
        }
        let length = key.array_length();
        if length.is_none() {
            self.types_unknown = true;
        }
        self.arrays.insert(
            id,
            ParameterTypes {
                length,
                ..Default::default()
            },
        );
        true
    }

    /// Record a key stored into the parameter-type array `array`
    pub fn add_element(&mut self, array: InstanceKeyId, key: &InstanceKey) {
        let Some(types) = self.arrays.get_mut(&array) else {
            return;
        };
        match key.as_class_constant() {
            Some(ty) => {
                types.classes.insert(ty.clone());
            }
            None => types.non_constant = true,
        }
    }

    fn name_matches(&self, member: &MethodRef, any_name: bool) -> bool {
        self.request.name_param.is_none() || any_name || self.names.contains(member.name())
    }

    fn types_match_strictly(&self, member: &MethodRef) -> bool {
        let arity = member.arity() as u32;
        self.arrays.values().any(|types| {
            types.length == Some(arity)
                && member
                    .parameter_types()
                    .iter()
                    .all(|p| types.classes.contains(p))
        })
    }

    /// Arrays of the right length whose contents are not fully constant
    fn types_match_by_arity(&self, member: &MethodRef) -> bool {
        let arity = member.arity() as u32;
        self.arrays.values().any(|types| {
            types.length == Some(arity) && (types.classes.is_empty() || types.non_constant)
        })
    }

    fn emit(&mut self, mut accept: impl FnMut(&Self, &MethodRef) -> bool) -> Vec<MethodRef> {
        let mut out = Vec::new();
        for (i, member) in self.request.candidates.iter().enumerate() {
            if !self.emitted.contains(&i) && accept(self, member) {
                out.push((i, member.clone()));
            }
        }
        out.into_iter()
            .map(|(i, member)| {
                self.emitted.insert(i);
                member
            })
            .collect()
    }

    /// Members matched by constant facts alone, not reported before
    pub fn strict_matches(&mut self) -> Vec<MethodRef> {
        self.emit(|s, m| s.name_matches(m, false) && s.types_match_strictly(m))
    }

    /// Members matched once the facts are known to be complete
    pub fn relaxed_matches(&mut self, options: ReflectionOptions) -> Relaxed {
        let full = options.allows_fallback();
        let any_name = full && self.name_non_constant;
        let any_types = full && self.types_unknown;
        let matches = self.emit(|s, m| {
            s.name_matches(m, any_name)
                && (s.types_match_strictly(m) || s.types_match_by_arity(m) || any_types)
        });

        let unresolved = if full {
            None
        } else if self.name_non_constant {
            Some(format!("{} on {} with a non-constant name", self.request.op, self.request.class))
        } else if self.types_unknown {
            Some(format!(
                "{} on {} with unknown parameter types",
                self.request.op, self.request.class
            ))
        } else {
            None
        };
        Relaxed { matches, unresolved }
    }
}
