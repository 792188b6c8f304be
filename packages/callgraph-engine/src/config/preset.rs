//! Preset configurations
//!
//! Presets provide complete default configurations for common use cases.

use serde::{Deserialize, Serialize};

/// Configuration preset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Preset {
    /// Quick whole-program overview
    ///
    /// - Contexts: insensitive (0-CFA)
    /// - Heap: one instance key per type
    Fast,

    /// Default analysis (0-1-CFA)
    ///
    /// - Contexts: insensitive
    /// - Heap: allocation sites
    Balanced,

    /// Call-site sensitive analysis
    ///
    /// - Contexts: call strings of depth 1 (1-CFA)
    /// - Heap: allocation sites, cloned per context
    Precise,
}

impl Preset {
    /// Parse preset from string
    pub fn from_str(s: &str) -> Result<Self, String> {
        match s.to_lowercase().as_str() {
            "fast" => Ok(Self::Fast),
            "balanced" => Ok(Self::Balanced),
            "precise" => Ok(Self::Precise),
            _ => Err(format!("Unknown preset '{}'. Valid presets: fast, balanced, precise", s)),
        }
    }

    /// Convert to string
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fast => "fast",
            Self::Balanced => "balanced",
            Self::Precise => "precise",
        }
    }

    pub fn all() -> [Preset; 3] {
        [Self::Fast, Self::Balanced, Self::Precise]
    }
}

impl Default for Preset {
    fn default() -> Self {
        Self::Balanced
    }
}

impl std::fmt::Display for Preset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
