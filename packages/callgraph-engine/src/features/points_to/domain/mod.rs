//! Heap abstraction domain types

pub mod heap_abstraction;
pub mod instance_key;
pub mod pointer_key;

pub use heap_abstraction::HeapAbstraction;
pub use instance_key::{ConstantValue, InstanceKey, InstanceKeyId};
pub use pointer_key::{PointerKey, PointerKeyId, Slot};
