//! Error types for callgraph-engine
//!
//! Only internal-consistency faults and configuration problems surface as errors.
//! Unresolvable reflective targets and missing classes are reported as warnings
//! (see `features::builder::domain::diagnostics`) and cancellation is a build status.

use crate::config::ConfigError;
use thiserror::Error;

/// Main error type for call graph construction
#[derive(Debug, Error)]
pub enum CallGraphError {
    /// A second node was requested for an existing (method, context) pair
    #[error("Duplicate call graph node for {method} in context {context}")]
    DuplicateNode { method: String, context: String },

    /// Arena, index or edge sets disagree with each other
    #[error("Call graph invariant violated: {0}")]
    InvariantViolation(String),

    /// Malformed JVM method descriptor
    #[error("Invalid method descriptor '{descriptor}': {reason}")]
    InvalidDescriptor { descriptor: String, reason: String },

    /// Class hierarchy could not be assembled
    #[error("Invalid class hierarchy: {0}")]
    InvalidHierarchy(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// JSON model loading error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CallGraphError {
    /// Create an invariant violation
    pub fn invariant(msg: impl Into<String>) -> Self {
        CallGraphError::InvariantViolation(msg.into())
    }

    /// Create a hierarchy error
    pub fn hierarchy(msg: impl Into<String>) -> Self {
        CallGraphError::InvalidHierarchy(msg.into())
    }

    /// Create a descriptor error
    pub fn descriptor(descriptor: impl Into<String>, reason: impl Into<String>) -> Self {
        CallGraphError::InvalidDescriptor {
            descriptor: descriptor.into(),
            reason: reason.into(),
        }
    }

    /// True for faults that mean the shared data model is corrupt
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            CallGraphError::DuplicateNode { .. } | CallGraphError::InvariantViolation(_)
        )
    }
}

/// Result type alias for call graph operations
pub type Result<T> = std::result::Result<T, CallGraphError>;
