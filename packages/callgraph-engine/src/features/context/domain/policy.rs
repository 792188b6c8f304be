//! Default context-sensitivity policy

use serde::{Deserialize, Serialize};

/// Policy applied to calls no specialized selector claims
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum ContextPolicy {
    /// One shared `Everywhere` context per method (0-CFA)
    Insensitive,

    /// k-limited call strings (k-CFA)
    CallString { depth: usize },
}

impl Default for ContextPolicy {
    fn default() -> Self {
        ContextPolicy::Insensitive
    }
}

impl ContextPolicy {
    /// Call-string depth, 0 for the insensitive policy
    pub fn depth(&self) -> usize {
        match self {
            Self::Insensitive => 0,
            Self::CallString { depth } => *depth,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Insensitive => "insensitive",
            Self::CallString { .. } => "call_string",
        }
    }
}
