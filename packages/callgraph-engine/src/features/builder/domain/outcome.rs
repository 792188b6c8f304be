//! Build inputs and outputs

use super::diagnostics::Warning;
use crate::features::call_graph::domain::CallGraph;
use crate::features::context::domain::Context;
use crate::features::points_to::application::PointerAnalysis;
use crate::shared::models::MethodRef;
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Entry method and the context its node gets
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entrypoint {
    pub method: MethodRef,
    pub context: Context,
}

impl Entrypoint {
    /// Entry in the `Everywhere` context
    pub fn new(method: MethodRef) -> Self {
        Self {
            method,
            context: Context::Everywhere,
        }
    }

    pub fn with_context(method: MethodRef, context: Context) -> Self {
        Self { method, context }
    }
}

/// Cooperative cancellation flag, cheap to clone and share across threads
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BuildStatus {
    /// Fixpoint reached
    Completed,
    /// Stopped by the cancellation token; the graph is partial
    Cancelled,
    /// Stopped after `max_steps`; the graph is partial
    BudgetExhausted,
}

impl BuildStatus {
    pub fn is_complete(self) -> bool {
        matches!(self, BuildStatus::Completed)
    }
}

/// Build statistics
#[derive(Debug, Clone, Default, Serialize)]
pub struct BuildStats {
    pub nodes: usize,
    pub edges: usize,
    pub instance_keys: usize,
    pub pointer_keys: usize,
    /// Driver loop iterations
    pub steps: usize,
    /// Quiescence rounds that evaluated deferred decisions
    pub quiescence_rounds: usize,
    pub bodies_lowered: usize,
    pub synthetic_bodies: usize,
    pub reflective_sites: usize,
    pub propagations: usize,
    #[serde(skip)]
    pub duration: Duration,
}

/// Finished (or partial) call graph and points-to relation
pub struct BuildResult {
    pub status: BuildStatus,
    pub call_graph: CallGraph,
    pub pointer_analysis: PointerAnalysis,
    pub warnings: Vec<Warning>,
    pub stats: BuildStats,
}

impl BuildResult {
    pub fn is_complete(&self) -> bool {
        self.status.is_complete()
    }
}

impl std::fmt::Debug for BuildResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BuildResult")
            .field("status", &self.status)
            .field("warnings", &self.warnings.len())
            .field("stats", &self.stats)
            .finish()
    }
}
