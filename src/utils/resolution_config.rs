// src/utils/resolution_config.rs
//! Resolution configuration: documented defaults, per-call overrides and
//! environment-derived overrides for the binary.

use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;

use crate::errors::{ResolutionError, Result};

pub const DEFAULT_BATCH_SIZE: usize = 100;
pub const DEFAULT_FUZZY_MATCH_THRESHOLD: f64 = 0.75;
pub const DEFAULT_MAX_EDIT_DISTANCE: usize = 3;

/// Informational confidence bands. Tiers never consult them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfidenceThresholds {
    pub high: f64,
    pub medium: f64,
    pub low: f64,
}

impl Default for ConfidenceThresholds {
    fn default() -> Self {
        Self {
            high: 0.9,
            medium: 0.7,
            low: 0.5,
        }
    }
}

/// Immutable configuration for one `resolve_batch` call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolutionConfig {
    pub batch_size: usize,
    pub enable_fuzzy_matching: bool,
    pub fuzzy_match_threshold: f64,
    pub max_edit_distance: usize,
    pub confidence_thresholds: ConfidenceThresholds,
}

impl Default for ResolutionConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            enable_fuzzy_matching: true,
            fuzzy_match_threshold: DEFAULT_FUZZY_MATCH_THRESHOLD,
            max_edit_distance: DEFAULT_MAX_EDIT_DISTANCE,
            confidence_thresholds: ConfidenceThresholds::default(),
        }
    }
}

impl ResolutionConfig {
    /// Returns a new config with every `Some` override applied.
    pub fn with_overrides(&self, overrides: &ResolutionConfigOverrides) -> Self {
        Self {
            batch_size: overrides.batch_size.unwrap_or(self.batch_size),
            enable_fuzzy_matching: overrides
                .enable_fuzzy_matching
                .unwrap_or(self.enable_fuzzy_matching),
            fuzzy_match_threshold: overrides
                .fuzzy_match_threshold
                .unwrap_or(self.fuzzy_match_threshold),
            max_edit_distance: overrides.max_edit_distance.unwrap_or(self.max_edit_distance),
            confidence_thresholds: overrides
                .confidence_thresholds
                .unwrap_or(self.confidence_thresholds),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            return Err(ResolutionError::Validation(
                "batch_size must be at least 1".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.fuzzy_match_threshold) {
            return Err(ResolutionError::Validation(format!(
                "fuzzy_match_threshold must be within [0, 1], got {}",
                self.fuzzy_match_threshold
            )));
        }
        Ok(())
    }
}

/// Caller-supplied partial configuration, merged onto the defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolutionConfigOverrides {
    pub batch_size: Option<usize>,
    pub enable_fuzzy_matching: Option<bool>,
    pub fuzzy_match_threshold: Option<f64>,
    pub max_edit_distance: Option<usize>,
    pub confidence_thresholds: Option<ConfidenceThresholds>,
}

impl ResolutionConfigOverrides {
    /// Reads `RESOLUTION_*` environment variables. Unset variables stay `None`.
    pub fn from_env() -> Self {
        let overrides = Self {
            batch_size: parse_env("RESOLUTION_BATCH_SIZE"),
            enable_fuzzy_matching: parse_env("RESOLUTION_ENABLE_FUZZY"),
            fuzzy_match_threshold: parse_env("RESOLUTION_FUZZY_THRESHOLD"),
            max_edit_distance: parse_env("RESOLUTION_MAX_EDIT_DISTANCE"),
            confidence_thresholds: None,
        };
        debug!("Resolution config overrides from env: {:?}", overrides);
        overrides
    }
}

fn parse_env<T: FromStr>(key: &str) -> Option<T> {
    let raw = env::var(key).ok()?;
    match raw.trim().parse::<T>() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!("Ignoring unparsable value for {}: '{}'", key, raw);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_documented_values() {
        let config = ResolutionConfig::default();
        assert_eq!(config.batch_size, 100);
        assert!(config.enable_fuzzy_matching);
        assert_eq!(config.fuzzy_match_threshold, 0.75);
        assert_eq!(config.max_edit_distance, 3);
    }

    #[test]
    fn test_overrides_do_not_touch_base() {
        let base = ResolutionConfig::default();
        let merged = base.with_overrides(&ResolutionConfigOverrides {
            fuzzy_match_threshold: Some(0.7),
            batch_size: Some(10),
            ..Default::default()
        });

        assert_eq!(merged.fuzzy_match_threshold, 0.7);
        assert_eq!(merged.batch_size, 10);
        assert_eq!(merged.max_edit_distance, 3);
        assert_eq!(base, ResolutionConfig::default());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let zero_batch = ResolutionConfig {
            batch_size: 0,
            ..Default::default()
        };
        assert!(zero_batch.validate().is_err());

        let bad_threshold = ResolutionConfig {
            fuzzy_match_threshold: 1.5,
            ..Default::default()
        };
        assert!(bad_threshold.validate().is_err());
        assert!(ResolutionConfig::default().validate().is_ok());
    }

    #[test]
    fn test_overrides_from_env() {
        env::set_var("RESOLUTION_BATCH_SIZE", "25");
        env::set_var("RESOLUTION_ENABLE_FUZZY", "false");
        env::set_var("RESOLUTION_MAX_EDIT_DISTANCE", "not-a-number");

        let overrides = ResolutionConfigOverrides::from_env();
        assert_eq!(overrides.batch_size, Some(25));
        assert_eq!(overrides.enable_fuzzy_matching, Some(false));
        assert_eq!(overrides.max_edit_distance, None);

        // Cleanup
        env::remove_var("RESOLUTION_BATCH_SIZE");
        env::remove_var("RESOLUTION_ENABLE_FUZZY");
        env::remove_var("RESOLUTION_MAX_EDIT_DISTANCE");
    }
}
