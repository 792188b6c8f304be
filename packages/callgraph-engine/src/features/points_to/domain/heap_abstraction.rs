//! Allocation abstraction policy

use serde::{Deserialize, Serialize};

/// How `new` statements map to instance keys
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeapAbstraction {
    /// One instance key per concrete type
    TypeBased,

    /// One instance key per allocation statement and node
    AllocationSite,
}

impl Default for HeapAbstraction {
    fn default() -> Self {
        HeapAbstraction::AllocationSite
    }
}
