//! Class hierarchy domain model

pub mod model;

pub use model::{ClassDef, ClassInfo, FieldDef, MethodDef, MethodFlags, MethodInfo};
