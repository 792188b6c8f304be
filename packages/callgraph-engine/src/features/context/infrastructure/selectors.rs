//! Default context selectors and the priority chain

use crate::features::context::domain::{Context, ContextPolicy};
use crate::features::context::ports::{ContextSelector, SelectionRequest};
use crate::shared::models::MethodRef;

/// Context-insensitive policy: every callee runs in `Everywhere`
#[derive(Debug, Default, Clone, Copy)]
pub struct EverywhereSelector;

impl ContextSelector for EverywhereSelector {
    fn name(&self) -> &'static str {
        "everywhere"
    }

    fn select(&self, _request: &SelectionRequest<'_>) -> Option<Context> {
        Some(Context::Everywhere)
    }
}

/// k-CFA: the callee context is the caller's call string extended by the call site
#[derive(Debug, Clone, Copy)]
pub struct CallStringSelector {
    depth: usize,
}

impl CallStringSelector {
    pub fn new(depth: usize) -> Self {
        Self { depth }
    }

    pub fn depth(&self) -> usize {
        self.depth
    }
}

impl ContextSelector for CallStringSelector {
    fn name(&self) -> &'static str {
        "call_string"
    }

    fn select(&self, request: &SelectionRequest<'_>) -> Option<Context> {
        if self.depth == 0 {
            return Some(Context::Everywhere);
        }
        let cs = request
            .caller_context
            .call_string()
            .push(request.site.clone(), self.depth);
        Some(Context::CallString(cs))
    }
}

/// Selectors consulted in priority order; the first `Some` wins
pub struct SelectorChain {
    selectors: Vec<Box<dyn ContextSelector>>,
}

impl SelectorChain {
    /// Chain holding only the default policy selector
    pub fn from_policy(policy: ContextPolicy) -> Self {
        let default: Box<dyn ContextSelector> = match policy {
            ContextPolicy::Insensitive => Box::new(EverywhereSelector),
            ContextPolicy::CallString { depth } => Box::new(CallStringSelector::new(depth)),
        };
        Self {
            selectors: vec![default],
        }
    }

    /// Insert a selector ahead of every selector already in the chain
    pub fn push_front(&mut self, selector: Box<dyn ContextSelector>) {
        self.selectors.insert(0, selector);
    }

    /// Context for a callee; `Everywhere` if no selector applies
    pub fn select(&self, request: &SelectionRequest<'_>) -> Context {
        self.selectors
            .iter()
            .find_map(|s| s.select(request))
            .unwrap_or(Context::Everywhere)
    }

    pub fn relevant_parameter(&self, callee: &MethodRef) -> Option<usize> {
        self.selectors.iter().find_map(|s| s.relevant_parameter(callee))
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.selectors.iter().map(|s| s.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.selectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selectors.is_empty()
    }
}
