/*
 * Callgraph Engine - Whole-Program Call Graph Construction
 *
 * Feature-First Hexagonal Architecture:
 * - shared/      : Identity types (TypeName, MethodRef, FieldRef) and constants
 * - features/    : Vertical slices (hierarchy → ir → context → points_to → reflection → builder)
 * - config/      : Presets, overrides and YAML configuration
 *
 * Analysis:
 * - Andersen-style inclusion-based pointer analysis with difference propagation
 * - On-the-fly call graph with pluggable context selectors (0-CFA, k-CFA)
 * - Reflection resolution under NONE / STRING_ONLY / FULL policies
 * - Rayon-parallel lowering of newly discovered method bodies
 */

#![allow(clippy::too_many_arguments)] // Selection requests carry the whole call site
#![allow(clippy::type_complexity)] // Wiring keys are tuples
#![allow(clippy::module_inception)] // Module naming intentional
#![allow(clippy::should_implement_trait)] // from_str naming intentional

// ═══════════════════════════════════════════════════════════════════════════
// Module Exports - Feature-First Architecture
// ═══════════════════════════════════════════════════════════════════════════

/// Shared models and constants
pub mod shared;

/// Feature modules
pub mod features;

/// Configuration system
pub mod config;

/// Error types
pub mod errors;

// ═══════════════════════════════════════════════════════════════════════════
// Re-exports for Public API
// ═══════════════════════════════════════════════════════════════════════════

pub use config::{AnalysisConfig, ConfigError, Preset};
pub use errors::{CallGraphError, Result};
pub use features::builder::{
    BuildResult, BuildStats, BuildStatus, CallGraphBuilder, CancellationToken, Entrypoint, Warning, WarningKind,
};
pub use features::call_graph::{CallGraph, CgNode, EdgeCause, GraphSnapshot, NodeId};
pub use features::context::{Context, ContextPolicy, ContextSelector};
pub use features::hierarchy::{ClassHierarchy, InMemoryHierarchy};
pub use features::ir::{BodyBuilder, InMemoryIr, IrOracle};
pub use features::points_to::{HeapAbstraction, InstanceKey, PointerAnalysis, PointerKey, WorklistOrder};
pub use features::reflection::{ReflectionOptions, ReflectiveOp};
pub use shared::models::{FieldRef, MethodRef, TypeName};
