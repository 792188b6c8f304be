//! Context selector implementations

pub mod selectors;

pub use selectors::{CallStringSelector, EverywhereSelector, SelectorChain};
