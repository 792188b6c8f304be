//! Class hierarchy
//!
//! Subtype, method-resolution and member queries over an already-built class
//! lattice. The engine only depends on the `ClassHierarchy` port.

pub mod domain;
pub mod infrastructure;
pub mod ports;

pub use domain::{ClassDef, ClassInfo, FieldDef, MethodDef, MethodFlags, MethodInfo};
pub use infrastructure::{HierarchyModel, InMemoryHierarchy, InMemoryHierarchyBuilder};
pub use ports::ClassHierarchy;
