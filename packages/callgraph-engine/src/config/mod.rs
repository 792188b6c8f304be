//! Analysis configuration
//!
//! Two levels:
//! - Preset: `AnalysisConfig::preset(Preset::Precise)`
//! - Overrides: builder setters, or a YAML document naming a preset plus overrides
//!
//! ```rust
//! use callgraph_engine::config::{AnalysisConfig, Preset};
//! use callgraph_engine::features::reflection::ReflectionOptions;
//!
//! let config = AnalysisConfig::preset(Preset::Fast).reflection(ReflectionOptions::StringOnly);
//! assert!(config.validate().is_ok());
//! ```

pub mod analysis_config;
pub mod error;
pub mod io;
pub mod preset;

pub use analysis_config::AnalysisConfig;
pub use error::{ConfigError, ConfigResult};
pub use io::{ConfigExportV1, ConfigOverrides};
pub use preset::Preset;
