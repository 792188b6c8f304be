//! Per-build warning sink
//!
//! Unresolvable reflective targets and classes missing from the hierarchy do
//! not stop a build. They are collected here, de-duplicated, and handed to
//! the caller with the result.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningKind {
    /// A reflective argument could not be reduced to constants
    UnresolvedReflectiveTarget,
    /// A class or member named reflectively is outside the hierarchy
    MissingReflectiveClass,
    /// An allocation names a class outside the hierarchy
    UnresolvedClass,
}

impl WarningKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::UnresolvedReflectiveTarget => "unresolved_reflective_target",
            Self::MissingReflectiveClass => "missing_reflective_class",
            Self::UnresolvedClass => "unresolved_class",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Warning {
    pub kind: WarningKind,
    pub message: String,
    /// Method and statement the warning is about, when there is one
    pub site: Option<String>,
}

impl Warning {
    pub fn new(kind: WarningKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            site: None,
        }
    }

    pub fn at(mut self, site: impl Into<String>) -> Self {
        self.site = Some(site.into());
        self
    }

    /// Text of the warning mentions `needle` (message or site)
    pub fn mentions(&self, needle: &str) -> bool {
        self.message.contains(needle) || self.site.as_deref().is_some_and(|s| s.contains(needle))
    }
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.kind.as_str(), self.message)?;
        if let Some(site) = &self.site {
            write!(f, " ({site})")?;
        }
        Ok(())
    }
}

/// Warning collector shared by the driver and lowering workers
#[derive(Debug, Default)]
pub struct Diagnostics {
    warnings: Mutex<BTreeSet<Warning>>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a warning; repeated warnings are kept and logged once
    pub fn report(&self, warning: Warning) {
        let mut warnings = self.warnings.lock();
        if warnings.contains(&warning) {
            return;
        }
        warn!(kind = warning.kind.as_str(), site = ?warning.site, "{}", warning.message);
        warnings.insert(warning);
    }

    pub fn len(&self) -> usize {
        self.warnings.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.warnings.lock().is_empty()
    }

    /// Take every warning collected so far, in a stable order
    pub fn drain(&self) -> Vec<Warning> {
        std::mem::take(&mut *self.warnings.lock()).into_iter().collect()
    }
}
