//! Evaluation configuration with layered resolution.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::ConfigError;

/// Configuration for an evaluation session.
///
/// Resolution order (highest priority first):
/// 1. Environment variables (`CONCORD_*`)
/// 2. Project config (`concord.toml` in the session root)
/// 3. Compiled defaults
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct EvalConfig {
    /// Absolute z-score above which a rating is flagged as an outlier.
    /// Default: 3.0.
    pub outlier_threshold: Option<f64>,
    /// Assignments completed faster than this are implausible and can be
    /// masked via the short-assignment filter. Default: none (filter off).
    pub min_work_duration_secs: Option<u64>,
    /// Whether threshold selection keeps workers without a defined
    /// quality score. Default: false.
    pub include_missing_scores: Option<bool>,
}

impl EvalConfig {
    /// Load configuration with 3-layer resolution.
    pub fn load(root: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        // Layer 2: project config
        let project_config_path = root.join("concord.toml");
        if project_config_path.exists() {
            Self::merge_toml_file(&mut config, &project_config_path)?;
        }

        // Layer 1 (highest priority): environment variables
        Self::apply_env_overrides(&mut config);

        Self::validate(&config)?;

        Ok(config)
    }

    /// Load configuration from a TOML string (for testing).
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(toml_str).map_err(|e| ConfigError::ParseError {
            path: "<string>".to_string(),
            message: e.to_string(),
        })?;
        Self::validate(&config)?;
        Ok(config)
    }

    /// Validate the configuration values.
    pub fn validate(config: &EvalConfig) -> Result<(), ConfigError> {
        if let Some(threshold) = config.outlier_threshold {
            if !threshold.is_finite() || threshold <= 0.0 {
                return Err(ConfigError::ValidationFailed {
                    field: "outlier_threshold".to_string(),
                    message: "must be a finite value greater than 0".to_string(),
                });
            }
        }
        Ok(())
    }

    /// Returns the effective outlier threshold, defaulting to 3.0.
    pub fn effective_outlier_threshold(&self) -> f64 {
        self.outlier_threshold.unwrap_or(3.0)
    }

    /// Returns the minimum plausible work duration, if configured.
    pub fn effective_min_work_duration_secs(&self) -> Option<u64> {
        self.min_work_duration_secs
    }

    /// Returns whether unscored workers survive threshold selection.
    /// Defaults to false.
    pub fn effective_include_missing_scores(&self) -> bool {
        self.include_missing_scores.unwrap_or(false)
    }

    /// Serialize the config back to TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ParseError {
            path: "<serialization>".to_string(),
            message: e.to_string(),
        })
    }

    /// Merge a TOML file into the existing config.
    /// Unknown keys are silently ignored (forward-compatible).
    fn merge_toml_file(config: &mut EvalConfig, path: &Path) -> Result<(), ConfigError> {
        let content =
            std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
                path: path.display().to_string(),
            })?;

        let file_config: EvalConfig =
            toml::from_str(&content).map_err(|e| ConfigError::ParseError {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;

        Self::merge(config, &file_config);
        Ok(())
    }

    /// Merge `other` into `base`, where `other` values override `base`
    /// values only when `other` has a `Some` value.
    fn merge(base: &mut EvalConfig, other: &EvalConfig) {
        if other.outlier_threshold.is_some() {
            base.outlier_threshold = other.outlier_threshold;
        }
        if other.min_work_duration_secs.is_some() {
            base.min_work_duration_secs = other.min_work_duration_secs;
        }
        if other.include_missing_scores.is_some() {
            base.include_missing_scores = other.include_missing_scores;
        }
    }

    /// Apply environment variable overrides.
    /// Pattern: `CONCORD_OUTLIER_THRESHOLD`, `CONCORD_MIN_WORK_DURATION_SECS`.
    fn apply_env_overrides(config: &mut EvalConfig) {
        if let Ok(val) = std::env::var("CONCORD_OUTLIER_THRESHOLD") {
            if let Ok(v) = val.parse::<f64>() {
                config.outlier_threshold = Some(v);
            }
        }
        if let Ok(val) = std::env::var("CONCORD_MIN_WORK_DURATION_SECS") {
            if let Ok(v) = val.parse::<u64>() {
                config.min_work_duration_secs = Some(v);
            }
        }
        if let Ok(val) = std::env::var("CONCORD_INCLUDE_MISSING_SCORES") {
            if let Ok(v) = val.parse::<bool>() {
                config.include_missing_scores = Some(v);
            }
        }
    }
}
