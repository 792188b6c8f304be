//! Analysis configuration

use super::error::{ConfigError, ConfigResult};
use super::preset::Preset;
use crate::features::context::domain::ContextPolicy;
use crate::features::points_to::domain::HeapAbstraction;
use crate::features::points_to::infrastructure::WorklistOrder;
use crate::features::reflection::domain::ReflectionOptions;
use crate::shared::constants::capacity;
use serde::{Deserialize, Serialize};

/// Settings read once at the start of a build
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Reflection policy
    pub reflection: ReflectionOptions,

    /// Default context policy for calls no specialized selector claims
    pub context_policy: ContextPolicy,

    /// Allocation abstraction for `new`
    pub heap_abstraction: HeapAbstraction,

    /// Order of the propagation worklist
    pub worklist_order: WorklistOrder,

    /// Stop after this many worklist steps (None=unlimited)
    pub max_steps: Option<usize>,

    /// Lower large batches of new nodes in parallel
    pub parallel_lowering: bool,

    /// Smallest batch lowered in parallel
    pub parallel_threshold: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self::preset(Preset::Balanced)
    }
}

impl AnalysisConfig {
    /// Complete configuration for a preset
    pub fn preset(preset: Preset) -> Self {
        let (context_policy, heap_abstraction) = match preset {
            Preset::Fast => (ContextPolicy::Insensitive, HeapAbstraction::TypeBased),
            Preset::Balanced => (ContextPolicy::Insensitive, HeapAbstraction::AllocationSite),
            Preset::Precise => (ContextPolicy::CallString { depth: 1 }, HeapAbstraction::AllocationSite),
        };
        Self {
            reflection: ReflectionOptions::Full,
            context_policy,
            heap_abstraction,
            worklist_order: WorklistOrder::Fifo,
            max_steps: None,
            parallel_lowering: true,
            parallel_threshold: capacity::PARALLEL_LOWERING_THRESHOLD,
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> ConfigResult<()> {
        if let ContextPolicy::CallString { depth } = self.context_policy {
            if depth == 0 || depth > capacity::MAX_CALL_STRING_DEPTH {
                return Err(ConfigError::range_with_hint(
                    "context_policy.depth",
                    depth,
                    1,
                    capacity::MAX_CALL_STRING_DEPTH,
                    "Use the insensitive policy for depth 0",
                ));
            }
        }

        if self.parallel_threshold == 0 {
            return Err(ConfigError::Validation(
                "parallel_threshold must be at least 1".to_string(),
            ));
        }

        if self.max_steps == Some(0) {
            return Err(ConfigError::Validation(
                "max_steps must be positive or None for unlimited".to_string(),
            ));
        }

        Ok(())
    }

    /// Builder: Set reflection
    pub fn reflection(mut self, v: ReflectionOptions) -> Self {
        self.reflection = v;
        self
    }

    /// Builder: Set context_policy
    pub fn context_policy(mut self, v: ContextPolicy) -> Self {
        self.context_policy = v;
        self
    }

    /// Builder: Set heap_abstraction
    pub fn heap_abstraction(mut self, v: HeapAbstraction) -> Self {
        self.heap_abstraction = v;
        self
    }

    /// Builder: Set worklist_order
    pub fn worklist_order(mut self, v: WorklistOrder) -> Self {
        self.worklist_order = v;
        self
    }

    /// Builder: Set max_steps
    pub fn max_steps(mut self, v: Option<usize>) -> Self {
        self.max_steps = v;
        self
    }

    /// Builder: Set parallel_lowering
    pub fn parallel_lowering(mut self, v: bool) -> Self {
        self.parallel_lowering = v;
        self
    }

    /// Builder: Set parallel_threshold
    pub fn parallel_threshold(mut self, v: usize) -> Self {
        self.parallel_threshold = v;
        self
    }

    /// Human-readable one-line summary
    pub fn describe(&self) -> String {
        format!(
            "reflection={} contexts={} heap={:?} order={:?}",
            self.reflection,
            self.context_policy.as_str(),
            self.heap_abstraction,
            self.worklist_order
        )
    }
}
