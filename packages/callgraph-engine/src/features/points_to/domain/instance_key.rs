//! Abstract objects
//!
//! An instance key stands for every runtime object created at one allocation
//! site (optionally in one context), for every object of one concrete type, or
//! for one compile-time constant. Constant keys for methods let a reflective
//! `Constructor`/`Method` object carry which member it denotes.

use crate::features::call_graph::domain::NodeId;
use crate::shared::constants::types;
use crate::shared::models::{MethodRef, TypeName};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Dense id of an interned instance key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct InstanceKeyId(pub u32);

impl InstanceKeyId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for InstanceKeyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ik{}", self.0)
    }
}

/// Compile-time constant value
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConstantValue {
    /// String literal
    String(Arc<str>),

    /// Class literal (`Foo.class`) or a resolved `Class` object
    Class(TypeName),

    /// Reflective `Constructor` (for `<init>`) or `Method` object
    Method(MethodRef),
}

impl ConstantValue {
    pub fn string(value: impl AsRef<str>) -> Self {
        ConstantValue::String(Arc::from(value.as_ref()))
    }

    /// Runtime type of the constant object
    pub fn runtime_type(&self) -> TypeName {
        match self {
            ConstantValue::String(_) => TypeName::new(types::STRING),
            ConstantValue::Class(_) => TypeName::new(types::CLASS),
            ConstantValue::Method(m) if m.is_constructor() => TypeName::new(types::CONSTRUCTOR),
            ConstantValue::Method(_) => TypeName::new(types::METHOD),
        }
    }
}

impl fmt::Display for ConstantValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConstantValue::String(s) => write!(f, "\"{s}\""),
            ConstantValue::Class(ty) => write!(f, "{ty}.class"),
            ConstantValue::Method(m) => write!(f, "{m}"),
        }
    }
}

/// Abstract object identity
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum InstanceKey {
    /// Objects allocated by statement `site` of `node`
    AllocationSite {
        node: NodeId,
        site: u32,
        ty: TypeName,
        /// Constant array length, when known
        length: Option<u32>,
    },

    /// Every object of one concrete type
    TypeBased(TypeName),

    /// A compile-time constant
    Constant(ConstantValue),
}

impl InstanceKey {
    /// Concrete runtime type of the objects this key stands for
    pub fn concrete_type(&self) -> TypeName {
        match self {
            InstanceKey::AllocationSite { ty, .. } | InstanceKey::TypeBased(ty) => ty.clone(),
            InstanceKey::Constant(value) => value.runtime_type(),
        }
    }

    pub fn as_constant(&self) -> Option<&ConstantValue> {
        match self {
            InstanceKey::Constant(value) => Some(value),
            _ => None,
        }
    }

    /// Class named by a constant `Class` key
    pub fn as_class_constant(&self) -> Option<&TypeName> {
        match self {
            InstanceKey::Constant(ConstantValue::Class(ty)) => Some(ty),
            _ => None,
        }
    }

    /// Member denoted by a constant `Constructor`/`Method` key
    pub fn as_method_constant(&self) -> Option<&MethodRef> {
        match self {
            InstanceKey::Constant(ConstantValue::Method(m)) => Some(m),
            _ => None,
        }
    }

    pub fn as_string_constant(&self) -> Option<&str> {
        match self {
            InstanceKey::Constant(ConstantValue::String(s)) => Some(s),
            _ => None,
        }
    }

    pub fn array_length(&self) -> Option<u32> {
        match self {
            InstanceKey::AllocationSite { length, .. } => *length,
            _ => None,
        }
    }
}

impl fmt::Display for InstanceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InstanceKey::AllocationSite { node, site, ty, .. } => {
                write!(f, "new {ty}@{node}:{site}")
            }
            InstanceKey::TypeBased(ty) => write!(f, "type {ty}"),
            InstanceKey::Constant(value) => write!(f, "const {value}"),
        }
    }
}
