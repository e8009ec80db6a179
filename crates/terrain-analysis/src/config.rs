//! Configuration for the terrain analysis engines.

use crate::gridding::WeightFunction;
use serde::{Deserialize, Serialize};

/// Configuration for the gridding engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GriddingConfig {
    /// Search radius in georeferenced units. Samples further away from a
    /// cell than this do not contribute to it.
    pub search_radius: f64,

    /// Weighting kernel used to combine samples.
    pub weight_function: WeightFunction,

    /// Exponent `p` of the inverse-distance kernel `1 / r^p`.
    pub inverse_distance_exponent: f64,
}

impl Default for GriddingConfig {
    fn default() -> Self {
        Self {
            search_radius: 10.0,
            weight_function: WeightFunction::InverseDistance,
            inverse_distance_exponent: 2.0,
        }
    }
}

impl GriddingConfig {
    /// Load configuration from environment variables.
    ///
    /// Unparseable values are ignored and the default is kept.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(val) = std::env::var("TERRAIN_SEARCH_RADIUS") {
            if let Ok(radius) = val.parse() {
                config.search_radius = radius;
            }
        }

        if let Ok(val) = std::env::var("TERRAIN_WEIGHT_FUNCTION") {
            if let Ok(function) = val.parse() {
                config.weight_function = function;
            }
        }

        if let Ok(val) = std::env::var("TERRAIN_IDW_EXPONENT") {
            if let Ok(exponent) = val.parse() {
                config.inverse_distance_exponent = exponent;
            }
        }

        config
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if !(self.search_radius.is_finite() && self.search_radius > 0.0) {
            return Err("search_radius must be a positive finite number".to_string());
        }

        if !(self.inverse_distance_exponent.is_finite() && self.inverse_distance_exponent > 0.0)
        {
            return Err("inverse_distance_exponent must be a positive finite number".to_string());
        }

        Ok(())
    }
}

/// Configuration for the gradient/curvature engine.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GradientConfig {
    /// Enable the central/forward/backward difference fallback chain
    /// when Horn's kernel lacks neighbours.
    pub fallback_enabled: bool,
}

impl GradientConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(val) = std::env::var("TERRAIN_GRADIENT_FALLBACK") {
            config.fallback_enabled = val.to_lowercase() == "true" || val == "1";
        }

        config
    }
}
