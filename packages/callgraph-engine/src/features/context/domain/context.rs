//! Analysis contexts
//!
//! A context disambiguates otherwise identical call graph nodes. Contexts are a
//! closed set of variants; the key/value view (`Context::get`) and the kind
//! predicate (`Context::is_a`) are derived from the variant.
//!
//! # Variants
//! - `Everywhere`: the shared default context (context-insensitive)
//! - `CallString`: k most recent call sites (k-CFA)
//! - `ReceiverInstance`: keyed by the abstract object flowing into the receiver
//! - `ReceiverType`: keyed by the concrete type of the receiver
//! - `ConstantParameter`: keyed by a constant flowing into one parameter

use crate::features::points_to::domain::InstanceKeyId;
use crate::shared::models::{MethodRef, TypeName};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// A call site independent of the caller's context
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CallSiteRef {
    pub method: MethodRef,
    /// Statement index of the invoke within the method body
    pub index: u32,
}

impl CallSiteRef {
    pub fn new(method: MethodRef, index: u32) -> Self {
        Self { method, index }
    }
}

impl fmt::Display for CallSiteRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.method, self.index)
    }
}

/// k-limited call string, most recent call site first
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct CallString(Arc<[CallSiteRef]>);

impl CallString {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Prepend `site`, dropping the oldest entries beyond `depth`
    pub fn push(&self, site: CallSiteRef, depth: usize) -> Self {
        let mut sites = Vec::with_capacity(depth.min(self.0.len() + 1));
        sites.push(site);
        sites.extend(self.0.iter().take(depth.saturating_sub(1)).cloned());
        sites.truncate(depth);
        Self(Arc::from(sites))
    }

    pub fn sites(&self) -> &[CallSiteRef] {
        &self.0
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for CallString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (i, site) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{site}")?;
        }
        f.write_str("]")
    }
}

/// Kind of a context, used by the `is_a` predicate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContextKind {
    Everywhere,
    CallString,
    ReceiverInstance,
    ReceiverType,
    ConstantParameter,
}

/// Keys of the context key/value view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContextKey {
    Receiver,
    ReceiverType,
    Parameter(usize),
    CallString,
}

/// Values of the context key/value view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextItem<'a> {
    InstanceKey(InstanceKeyId),
    Type(&'a TypeName),
    CallString(&'a CallString),
}

/// Immutable analysis context
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum Context {
    #[default]
    Everywhere,
    CallString(CallString),
    ReceiverInstance(InstanceKeyId),
    ReceiverType(TypeName),
    ConstantParameter { index: usize, key: InstanceKeyId },
}

impl Context {
    pub fn kind(&self) -> ContextKind {
        match self {
            Context::Everywhere => ContextKind::Everywhere,
            Context::CallString(_) => ContextKind::CallString,
            Context::ReceiverInstance(_) => ContextKind::ReceiverInstance,
            Context::ReceiverType(_) => ContextKind::ReceiverType,
            Context::ConstantParameter { .. } => ContextKind::ConstantParameter,
        }
    }

    #[inline]
    pub fn is_a(&self, kind: ContextKind) -> bool {
        self.kind() == kind
    }

    /// Value bound to `key`, if this context carries one
    pub fn get(&self, key: ContextKey) -> Option<ContextItem<'_>> {
        match (self, key) {
            (Context::ReceiverInstance(ik), ContextKey::Receiver) => {
                Some(ContextItem::InstanceKey(*ik))
            }
            (Context::ReceiverType(ty), ContextKey::ReceiverType) => Some(ContextItem::Type(ty)),
            (Context::ConstantParameter { index, key: ik }, ContextKey::Parameter(wanted))
                if *index == wanted =>
            {
                Some(ContextItem::InstanceKey(*ik))
            }
            (Context::CallString(cs), ContextKey::CallString) => Some(ContextItem::CallString(cs)),
            _ => None,
        }
    }

    /// Instance key the context is keyed on, for receiver and parameter contexts
    pub fn keyed_instance(&self) -> Option<InstanceKeyId> {
        match self {
            Context::ReceiverInstance(ik) | Context::ConstantParameter { key: ik, .. } => Some(*ik),
            _ => None,
        }
    }

    /// Call string carried by the context (empty for other kinds)
    pub fn call_string(&self) -> CallString {
        match self {
            Context::CallString(cs) => cs.clone(),
            _ => CallString::empty(),
        }
    }
}

impl fmt::Display for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Context::Everywhere => f.write_str("Everywhere"),
            Context::CallString(cs) => write!(f, "CallString{cs}"),
            Context::ReceiverInstance(ik) => write!(f, "Receiver({ik})"),
            Context::ReceiverType(ty) => write!(f, "ReceiverType({ty})"),
            Context::ConstantParameter { index, key } => write!(f, "Parameter{index}({key})"),
        }
    }
}
