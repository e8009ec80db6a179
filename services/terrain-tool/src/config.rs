//! Tool configuration.
//!
//! Settings are layered, highest priority first:
//! - command-line flags
//! - the YAML file given with `--config`
//! - `TERRAIN_*` environment variables
//! - built-in defaults

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

use terrain_analysis::{GradientConfig, GriddingConfig, WeightFunction};
use terrain_common::ReferenceSystem;

/// Effective configuration for one tool run.
#[derive(Debug, Clone, Default)]
pub struct ToolConfig {
    pub gridding: GriddingConfig,
    pub gradient: GradientConfig,
    pub reference_system: Option<ReferenceSystem>,
}

/// Contents of a YAML configuration file. Every key is optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub search_radius: Option<f64>,
    pub weight_function: Option<WeightFunction>,
    pub inverse_distance_exponent: Option<f64>,
    pub gradient_fallback: Option<bool>,
    pub reference_system: Option<ReferenceSystem>,
}

impl FileConfig {
    /// Parse a YAML document.
    pub fn from_yaml_str(text: &str) -> Result<Self> {
        serde_yaml::from_str(text).context("Invalid configuration file")
    }

    /// Load a YAML configuration file.
    pub fn from_yaml_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_yaml_str(&text)
    }
}

/// Settings given on the command line.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub search_radius: Option<f64>,
    pub weight_function: Option<WeightFunction>,
    pub inverse_distance_exponent: Option<f64>,
    pub gradient_fallback: bool,
    pub reference_system: Option<String>,
}

impl ToolConfig {
    /// Start from the environment and defaults.
    pub fn from_env() -> Self {
        Self {
            gridding: GriddingConfig::from_env(),
            gradient: GradientConfig::from_env(),
            reference_system: None,
        }
    }

    /// Resolve the effective configuration and validate it.
    pub fn load(file: Option<&Path>, overrides: &Overrides) -> Result<Self> {
        let mut config = Self::from_env();
        if let Some(path) = file {
            config.apply_file(FileConfig::from_yaml_file(path)?);
        }
        config.apply_overrides(overrides);
        config.validate()?;
        Ok(config)
    }

    pub fn apply_file(&mut self, file: FileConfig) {
        if let Some(radius) = file.search_radius {
            self.gridding.search_radius = radius;
        }
        if let Some(function) = file.weight_function {
            self.gridding.weight_function = function;
        }
        if let Some(exponent) = file.inverse_distance_exponent {
            self.gridding.inverse_distance_exponent = exponent;
        }
        if let Some(fallback) = file.gradient_fallback {
            self.gradient.fallback_enabled = fallback;
        }
        if file.reference_system.is_some() {
            self.reference_system = file.reference_system;
        }
    }

    pub fn apply_overrides(&mut self, overrides: &Overrides) {
        if let Some(radius) = overrides.search_radius {
            self.gridding.search_radius = radius;
        }
        if let Some(function) = overrides.weight_function {
            self.gridding.weight_function = function;
        }
        if let Some(exponent) = overrides.inverse_distance_exponent {
            self.gridding.inverse_distance_exponent = exponent;
        }
        // A flag can only switch the fallback on.
        if overrides.gradient_fallback {
            self.gradient.fallback_enabled = true;
        }
        if let Some(code) = &overrides.reference_system {
            self.reference_system = Some(ReferenceSystem::new(code.as_str()));
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.gridding
            .validate()
            .map_err(|e| anyhow::anyhow!("Invalid gridding configuration: {}", e))
    }
}
