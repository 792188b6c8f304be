//! Abstract storage locations

use super::instance_key::InstanceKeyId;
use crate::features::call_graph::domain::NodeId;
use crate::features::ir::domain::ValueId;
use crate::shared::models::FieldRef;
use std::fmt;

/// Dense id of an interned pointer key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PointerKeyId(pub u32);

impl PointerKeyId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Storage location tracked by the points-to relation. Equality is structural.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PointerKey {
    /// SSA value of one node
    Local { node: NodeId, value: ValueId },

    /// Values returned by a node
    ReturnValue(NodeId),

    /// Exceptions escaping a node
    ExceptionalReturn(NodeId),

    /// Instance field of one abstract object
    InstanceField { object: InstanceKeyId, field: FieldRef },

    /// Static field (one global location per field)
    StaticField(FieldRef),

    /// Collapsed contents of one abstract array
    ArrayContents(InstanceKeyId),
}

impl PointerKey {
    pub fn local(node: NodeId, value: ValueId) -> Self {
        PointerKey::Local { node, value }
    }

    /// Node owning the location, for node-local keys
    pub fn node(&self) -> Option<NodeId> {
        match self {
            PointerKey::Local { node, .. }
            | PointerKey::ReturnValue(node)
            | PointerKey::ExceptionalReturn(node) => Some(*node),
            _ => None,
        }
    }
}

impl fmt::Display for PointerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PointerKey::Local { node, value } => write!(f, "{node}:v{value}"),
            PointerKey::ReturnValue(node) => write!(f, "{node}:ret"),
            PointerKey::ExceptionalReturn(node) => write!(f, "{node}:exc"),
            PointerKey::InstanceField { object, field } => write!(f, "{object}.{}", field.name),
            PointerKey::StaticField(field) => write!(f, "{field}"),
            PointerKey::ArrayContents(object) => write!(f, "{object}[]"),
        }
    }
}

/// Dereferenced part of an object: a field or the array contents
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Slot {
    Field(FieldRef),
    ArrayContents,
}

impl Slot {
    /// Location of this slot within `object`
    pub fn of(&self, object: InstanceKeyId) -> PointerKey {
        match self {
            Slot::Field(field) => PointerKey::InstanceField {
                object,
                field: field.clone(),
            },
            Slot::ArrayContents => PointerKey::ArrayContents(object),
        }
    }
}
