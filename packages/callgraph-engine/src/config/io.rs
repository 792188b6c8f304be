//! Configuration I/O (YAML)
//!
//! A document names a base preset and optionally overrides single fields:
//!
//! ```yaml
//! version: 1
//! preset: precise
//! overrides:
//!   reflection: STRING_ONLY
//!   max_steps: 100000
//! ```

use super::analysis_config::AnalysisConfig;
use super::error::{ConfigError, ConfigResult};
use super::preset::Preset;
use crate::features::context::domain::ContextPolicy;
use crate::features::points_to::domain::HeapAbstraction;
use crate::features::points_to::infrastructure::WorklistOrder;
use crate::features::reflection::domain::ReflectionOptions;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Supported schema versions
const SUPPORTED_VERSIONS: [u32; 1] = [1];

/// YAML Schema v1
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigExportV1 {
    /// Schema version (always 1 for v1)
    pub version: u32,

    /// Base preset
    pub preset: String,

    /// Fine-grained overrides
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overrides: Option<ConfigOverrides>,
}

/// Field overrides on top of the preset
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reflection: Option<ReflectionOptions>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub context_policy: Option<ContextPolicy>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub heap_abstraction: Option<HeapAbstraction>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub worklist_order: Option<WorklistOrder>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_steps: Option<usize>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub parallel_lowering: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub parallel_threshold: Option<usize>,
}

impl ConfigOverrides {
    fn apply(self, config: &mut AnalysisConfig) {
        if let Some(v) = self.reflection {
            config.reflection = v;
        }
        if let Some(v) = self.context_policy {
            config.context_policy = v;
        }
        if let Some(v) = self.heap_abstraction {
            config.heap_abstraction = v;
        }
        if let Some(v) = self.worklist_order {
            config.worklist_order = v;
        }
        if let Some(v) = self.max_steps {
            config.max_steps = Some(v);
        }
        if let Some(v) = self.parallel_lowering {
            config.parallel_lowering = v;
        }
        if let Some(v) = self.parallel_threshold {
            config.parallel_threshold = v;
        }
    }
}

impl AnalysisConfig {
    /// Parse and validate a YAML document
    pub fn from_yaml_str(content: &str) -> ConfigResult<AnalysisConfig> {
        let export: ConfigExportV1 = serde_yaml::from_str(content)?;

        if !SUPPORTED_VERSIONS.contains(&export.version) {
            return Err(ConfigError::UnsupportedVersion {
                found: export.version,
                supported: SUPPORTED_VERSIONS.to_vec(),
            });
        }

        let preset =
            Preset::from_str(&export.preset).map_err(|_| ConfigError::UnknownPreset(export.preset.clone()))?;

        let mut config = AnalysisConfig::preset(preset);
        if let Some(overrides) = export.overrides {
            overrides.apply(&mut config);
        }
        config.validate()?;
        Ok(config)
    }

    /// Load from a YAML file
    pub fn from_yaml_file(path: impl AsRef<Path>) -> ConfigResult<AnalysisConfig> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    /// Export as a balanced-preset document with every field overridden
    pub fn to_yaml(&self) -> ConfigResult<String> {
        let export = ConfigExportV1 {
            version: 1,
            preset: Preset::Balanced.to_string(),
            overrides: Some(ConfigOverrides {
                reflection: Some(self.reflection),
                context_policy: Some(self.context_policy),
                heap_abstraction: Some(self.heap_abstraction),
                worklist_order: Some(self.worklist_order),
                max_steps: self.max_steps,
                parallel_lowering: Some(self.parallel_lowering),
                parallel_threshold: Some(self.parallel_threshold),
            }),
        };
        Ok(serde_yaml::to_string(&export)?)
    }
}
