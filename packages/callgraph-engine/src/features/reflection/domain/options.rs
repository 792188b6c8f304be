//! Reflection policy

use serde::{Deserialize, Serialize};

/// How aggressively reflective calls are resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReflectionOptions {
    /// Reflective calls are ordinary calls
    None,

    /// Synthesize only from constant strings, classes and members
    StringOnly,

    /// Constant resolution plus bounded type-based over-approximation
    Full,
}

impl ReflectionOptions {
    /// Any reflective synthesis at all
    #[inline]
    pub fn is_enabled(self) -> bool {
        !matches!(self, ReflectionOptions::None)
    }

    /// Non-constant arguments may be over-approximated
    #[inline]
    pub fn allows_fallback(self) -> bool {
        matches!(self, ReflectionOptions::Full)
    }

    pub fn from_str(s: &str) -> Result<Self, String> {
        match s.to_ascii_uppercase().replace('-', "_").as_str() {
            "NONE" => Ok(Self::None),
            "STRING_ONLY" => Ok(Self::StringOnly),
            "FULL" => Ok(Self::Full),
            _ => Err(format!(
                "Unknown reflection option '{}'. Valid options: NONE, STRING_ONLY, FULL",
                s
            )),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "NONE",
            Self::StringOnly => "STRING_ONLY",
            Self::Full => "FULL",
        }
    }
}

impl Default for ReflectionOptions {
    fn default() -> Self {
        Self::Full
    }
}

impl std::fmt::Display for ReflectionOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
