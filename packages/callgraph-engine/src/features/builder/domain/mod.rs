//! Builder domain: inputs, outputs and diagnostics

pub mod diagnostics;
pub mod outcome;

pub use diagnostics::{Diagnostics, Warning, WarningKind};
pub use outcome::{BuildResult, BuildStats, BuildStatus, CancellationToken, Entrypoint};
