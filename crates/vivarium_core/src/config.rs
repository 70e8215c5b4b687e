//! Configuration management for brain construction and logging.
//!
//! Structures map onto the `config.toml` file. Every field has a default, so
//! a partial file (or none at all) is valid.
//!
//! ## Example `config.toml`
//!
//! ```toml
//! [brain]
//! trace = false
//! scratch_capacity = 64
//!
//! [brain.default_gain_limits]
//! min = 0.5
//! max = 2.0
//!
//! [logging]
//! level = "info"
//! ```

use crate::brain::BrainOptions;
use crate::error::BrainError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use vivarium_data::GainLimits;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct BrainConfig {
    /// Used when a genome's modulation profile has no limits of its own.
    pub default_gain_limits: GainLimits,
    /// Record evaluation traces by default.
    pub trace: bool,
    pub scratch_capacity: usize,
}

impl Default for BrainConfig {
    fn default() -> Self {
        Self {
            default_gain_limits: GainLimits::default(),
            trace: false,
            scratch_capacity: 32,
        }
    }
}

impl BrainConfig {
    #[must_use]
    pub fn brain_options(&self) -> BrainOptions {
        BrainOptions {
            default_gain_limits: self.default_gain_limits,
            scratch_capacity: self.scratch_capacity,
            ..BrainOptions::default()
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default `EnvFilter` directive, overridden by `RUST_LOG`.
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(default)]
pub struct AppConfig {
    pub brain: BrainConfig,
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Validates all configuration parameters.
    ///
    /// # Validation Rules
    /// - Gain limits must be finite and positive, with `min <= max`
    /// - Scratch capacity must be non-zero and reasonable (<= 1 << 20)
    /// - Logging level must not be empty
    pub fn validate(&self) -> anyhow::Result<()> {
        let limits = self.brain.default_gain_limits;
        anyhow::ensure!(
            limits.min.is_finite() && limits.max.is_finite(),
            "Gain limits must be finite"
        );
        anyhow::ensure!(limits.min > 0.0, "Minimum gain must be positive");
        anyhow::ensure!(
            limits.min <= limits.max,
            "Minimum gain must not exceed maximum gain"
        );
        anyhow::ensure!(
            self.brain.scratch_capacity > 0,
            "Scratch capacity must be positive"
        );
        anyhow::ensure!(
            self.brain.scratch_capacity <= 1 << 20,
            "Scratch capacity too large (max 1048576)"
        );
        anyhow::ensure!(
            !self.logging.level.trim().is_empty(),
            "Logging level must not be empty"
        );
        Ok(())
    }

    pub fn from_toml(content: &str) -> anyhow::Result<Self> {
        let config = toml::from_str::<Self>(content).map_err(BrainError::from)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads and validates a config file. A missing file yields defaults.
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            tracing::debug!(path = %path.display(), "Config file not found, using defaults");
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path).map_err(|e| {
            BrainError::from(e).with_context(format!("reading {}", path.display()))
        })?;
        Self::from_toml(&content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_validates() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = AppConfig::from_toml("[brain]\ntrace = true\n").expect("valid");
        assert!(config.brain.trace);
        assert_eq!(config.brain.scratch_capacity, 32);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_gain_limits_from_toml() {
        let config = AppConfig::from_toml(
            "[brain.default_gain_limits]\nmin = 0.25\nmax = 3.0\n",
        )
        .expect("valid");
        let options = config.brain.brain_options();
        assert_eq!(options.default_gain_limits.min, 0.25);
        assert_eq!(options.default_gain_limits.max, 3.0);
    }

    #[test]
    fn test_inverted_gain_limits() {
        let config = AppConfig {
            brain: BrainConfig {
                default_gain_limits: GainLimits { min: 2.0, max: 1.0 },
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_scratch_capacity() {
        let config = AppConfig {
            brain: BrainConfig {
                scratch_capacity: 0,
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_malformed_toml_is_rejected() {
        assert!(AppConfig::from_toml("[brain\ntrace = ").is_err());
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let config = AppConfig::load("/definitely/not/here.toml").expect("defaults");
        assert_eq!(config, AppConfig::default());
    }
}
