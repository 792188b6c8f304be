//! Context model and context selectors
//!
//! Contexts distinguish several analysis-time incarnations of one method.
//! The default policy is context-insensitive (`Everywhere`) or k-CFA; specialized
//! selectors (reflection) are placed ahead of it in a `SelectorChain`.

pub mod domain;
pub mod infrastructure;
pub mod ports;

pub use domain::{CallSiteRef, CallString, Context, ContextItem, ContextKey, ContextKind, ContextPolicy};
pub use infrastructure::{CallStringSelector, EverywhereSelector, SelectorChain};
pub use ports::{ContextSelector, DispatchKey, SelectionRequest};
