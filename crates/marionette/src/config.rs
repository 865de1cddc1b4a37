//! Application configuration.
//!
//! ```toml
//! [coordinator]
//! validate_paths = true
//! frame_budget_us = 16666
//!
//! [frame_loop]
//! target_fps = 60
//!
//! [demo]
//! frames = 180
//! width = 800
//! height = 600
//! model_dir = "live2d/Hiyori"
//! settings_file = "Hiyori.model3.json"
//! ```

use std::path::{Path, PathBuf};

use marionette_core::{ConfigError, ConfigResult};
use marionette_rendering::CoordinatorConfig;
use serde::{Deserialize, Serialize};

use crate::frame_loop::FrameLoopConfig;

/// Settings for the headless demo run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DemoSettings {
    /// Frames to run before shutting down.
    pub frames: u64,
    /// Drawable width.
    pub width: u32,
    /// Drawable height.
    pub height: u32,
    /// Model directory. A sample model is generated when unset.
    pub model_dir: Option<PathBuf>,
    /// Settings file inside `model_dir`.
    pub settings_file: String,
}

impl Default for DemoSettings {
    fn default() -> Self {
        Self {
            frames: 180,
            width: 800,
            height: 600,
            model_dir: None,
            settings_file: "Hiyori.model3.json".to_string(),
        }
    }
}

/// Top-level configuration file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarionetteConfig {
    /// Coordinator settings.
    pub coordinator: CoordinatorConfig,
    /// Frame loop settings.
    pub frame_loop: FrameLoopConfig,
    /// Demo settings.
    pub demo: DemoSettings,
}

impl MarionetteConfig {
    /// Parses and validates a TOML document.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed TOML and
    /// [`ConfigError::Invalid`] for values that cannot work.
    pub fn from_toml_str(text: &str) -> ConfigResult<Self> {
        let config: Self = toml::from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML file.
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

    /// Checks every section.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError::Invalid`] found.
    pub fn validate(&self) -> ConfigResult<()> {
        self.coordinator.validate()?;
        self.frame_loop.validate()?;
        if self.demo.width == 0 || self.demo.height == 0 {
            return Err(ConfigError::Invalid("demo drawable size must be non-zero".into()));
        }
        Ok(())
    }
}
