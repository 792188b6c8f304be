//! Points-to solver infrastructure

pub mod heap_model;
pub mod points_to_set;
pub mod propagation;
pub mod worklist;

pub use heap_model::HeapModel;
pub use points_to_set::PointsToSet;
pub use propagation::{Notification, ObserverId, PropagationEngine, PropagationStats};
pub use worklist::{Worklist, WorklistOrder};
