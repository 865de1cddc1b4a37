//! Coordinator configuration.
//!
//! Loaded once at startup from TOML. Every field has a default, so an empty
//! file is a valid configuration.
//!
//! ```toml
//! state_replay = 8
//! validate_paths = true
//! frame_budget_us = 16666
//! stage_capacity = 64
//!
//! [clock]
//! min_delta_seconds = 0.001
//! max_delta_seconds = 0.25
//! ```

use std::path::Path;

use marionette_core::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};

/// Configuration for a [`FrameCoordinator`](crate::FrameCoordinator).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoordinatorConfig {
    /// How many past lifecycle states a new subscriber receives.
    pub state_replay: usize,
    /// Check that the model directory and settings file exist before
    /// handing them to the engine.
    pub validate_paths: bool,
    /// Frames slower than this (microseconds) are logged and counted.
    pub frame_budget_us: u32,
    /// Initial capacity of the staging maps.
    pub stage_capacity: usize,
    /// Delta-time bounds for frame clocks built from this config.
    pub clock: ClockConfig,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            state_replay: 8,
            validate_paths: true,
            frame_budget_us: 16_666, // ~16ms for 60fps
            stage_capacity: 64,
            clock: ClockConfig::default(),
        }
    }
}

impl CoordinatorConfig {
    /// Parses and validates a configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed TOML and
    /// [`ConfigError::Invalid`] for values that fail [`Self::validate`].
    pub fn from_toml_str(text: &str) -> ConfigResult<Self> {
        let config: Self = toml::from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, otherwise as
    /// [`Self::from_toml_str`].
    pub fn from_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Checks that the values can work together.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] describing the first bad value.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.state_replay == 0 {
            return Err(ConfigError::Invalid("state_replay must be at least 1".into()));
        }
        if self.frame_budget_us == 0 {
            return Err(ConfigError::Invalid("frame_budget_us must be positive".into()));
        }
        self.clock.validate()
    }
}

/// Bounds applied to measured frame deltas.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClockConfig {
    /// Smallest delta ever reported, in seconds.
    pub min_delta_seconds: f32,
    /// Largest delta ever reported, in seconds.
    pub max_delta_seconds: f32,
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self {
            min_delta_seconds: 0.001,
            max_delta_seconds: 0.25,
        }
    }
}

impl ClockConfig {
    /// Checks `0 <= min <= max` with finite bounds.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if the bounds are unusable.
    pub fn validate(&self) -> ConfigResult<()> {
        let (min, max) = (self.min_delta_seconds, self.max_delta_seconds);
        if !min.is_finite() || !max.is_finite() || min < 0.0 || min > max {
            return Err(ConfigError::Invalid(format!(
                "clock bounds must satisfy 0 <= min <= max, got min={min} max={max}"
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_toml_is_default() {
        let config = CoordinatorConfig::from_toml_str("").unwrap();
        assert_eq!(config, CoordinatorConfig::default());
    }

    #[test]
    fn test_partial_override() {
        let config = CoordinatorConfig::from_toml_str(
            r"
            validate_paths = false

            [clock]
            max_delta_seconds = 0.1
            ",
        )
        .unwrap();
        assert!(!config.validate_paths);
        assert!((config.clock.max_delta_seconds - 0.1).abs() < f32::EPSILON);
        assert!((config.clock.min_delta_seconds - 0.001).abs() < f32::EPSILON);
        assert_eq!(config.state_replay, 8);
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(matches!(
            CoordinatorConfig::from_toml_str("state_replay = 0"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            CoordinatorConfig::from_toml_str("[clock]\nmin_delta_seconds = 1.0\nmax_delta_seconds = 0.5"),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn test_malformed_toml() {
        assert!(matches!(
            CoordinatorConfig::from_toml_str("state_replay = \"many\""),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        let path = std::env::temp_dir().join("marionette_missing_config.toml");
        assert!(matches!(
            CoordinatorConfig::from_file(&path),
            Err(ConfigError::Io { .. })
        ));
    }
}
