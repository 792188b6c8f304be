//! Feature modules - Each feature follows Hexagonal Architecture
//!
//! Each feature contains:
//! - domain/     - Pure analysis model
//! - ports/      - Interface definitions (traits)
//! - application/ - Use cases
//! - infrastructure/ - Implementations of ports and solver machinery

// External collaborators consumed through ports
pub mod hierarchy;
pub mod ir;

pub mod context;
pub mod points_to;
pub mod call_graph;

// Reflective API recognition, synthetic bodies and the FULL-mode fallback
pub mod reflection;

// Fixpoint driver
pub mod builder;
