//! Class hierarchy adapters

pub mod in_memory;

pub use in_memory::{HierarchyModel, InMemoryHierarchy, InMemoryHierarchyBuilder};
