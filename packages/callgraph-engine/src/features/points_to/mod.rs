//! Pointer analysis
//!
//! Abstract heap (instance keys, pointer keys), the incremental Andersen
//! propagation engine and the finished, queryable points-to relation.

pub mod application;
pub mod domain;
pub mod infrastructure;

pub use application::PointerAnalysis;
pub use domain::{ConstantValue, HeapAbstraction, InstanceKey, InstanceKeyId, PointerKey, PointerKeyId, Slot};
pub use infrastructure::{
    HeapModel, Notification, ObserverId, PointsToSet, PropagationEngine, PropagationStats, Worklist,
    WorklistOrder,
};
