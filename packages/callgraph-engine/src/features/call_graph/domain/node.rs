//! Call graph nodes

use crate::features::context::domain::Context;
use crate::shared::models::MethodRef;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable index of a node in the call graph arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub u32);

impl NodeId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One analysis-time incarnation of a method: (method, context)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CgNode {
    pub id: NodeId,
    pub method: MethodRef,
    pub context: Context,
}

impl fmt::Display for CgNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} [{}]", self.id, self.method, self.context)
    }
}
