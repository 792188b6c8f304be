//! Context domain types

pub mod context;
pub mod policy;

pub use context::{CallSiteRef, CallString, Context, ContextItem, ContextKey, ContextKind};
pub use policy::ContextPolicy;
