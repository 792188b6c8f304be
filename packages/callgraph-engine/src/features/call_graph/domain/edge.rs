//! Edge provenance

use crate::features::reflection::domain::ReflectiveOp;
use crate::shared::models::TypeName;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Why an edge exists
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EdgeCause {
    /// Root → entry point
    EntryPoint,
    /// Root → `<clinit>` of a class that became initialized
    ClassInitialization,
    /// Static or special invoke
    StaticDispatch,
    /// Virtual or interface invoke, resolved per receiver object
    VirtualDispatch,
    /// Synthesized from constant reflective facts
    Reflective { op: ReflectiveOp },
    /// Synthesized by the bounded type-based fallback
    ReflectiveFallback { op: ReflectiveOp, bound: TypeName },
}

impl EdgeCause {
    pub fn is_reflective(&self) -> bool {
        matches!(
            self,
            EdgeCause::Reflective { .. } | EdgeCause::ReflectiveFallback { .. }
        )
    }

    pub fn reflective_op(&self) -> Option<ReflectiveOp> {
        match self {
            EdgeCause::Reflective { op } | EdgeCause::ReflectiveFallback { op, .. } => Some(*op),
            _ => None,
        }
    }
}

impl fmt::Display for EdgeCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EdgeCause::EntryPoint => f.write_str("entry"),
            EdgeCause::ClassInitialization => f.write_str("clinit"),
            EdgeCause::StaticDispatch => f.write_str("static"),
            EdgeCause::VirtualDispatch => f.write_str("virtual"),
            EdgeCause::Reflective { op } => write!(f, "reflective:{}", op.as_str()),
            EdgeCause::ReflectiveFallback { op, bound } => {
                write!(f, "reflective-fallback:{}<:{bound}", op.as_str())
            }
        }
    }
}

/// One justification of an edge: the call site (if any) and the cause
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EdgeProvenance {
    /// Statement index of the invoke in the caller; `None` for root edges
    pub site: Option<u32>,
    pub cause: EdgeCause,
}

impl EdgeProvenance {
    pub fn new(site: Option<u32>, cause: EdgeCause) -> Self {
        Self { site, cause }
    }
}
