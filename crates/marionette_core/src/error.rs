//! # Marionette Error Types
//!
//! Loading a model is the only coordinator operation that can fail. Rendering
//! without a model is a defined no-op, not an error, so it has no variant here.

use std::path::PathBuf;

use thiserror::Error;

/// Errors reported by a downstream character engine.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// The engine was not compiled into this build.
    #[error("character engine is not available in this build")]
    Unavailable,

    /// The engine refused the model (corrupt settings, bad moc data, ...).
    #[error("engine rejected model: {reason}")]
    Rejected {
        /// Engine-provided reason.
        reason: String,
    },

    /// Reading a model asset failed.
    #[error("engine i/o failure: {0}")]
    Io(String),
}

/// Errors that can occur while loading a model into the coordinator.
///
/// Every variant leaves the coordinator in the state it was in before the
/// load was attempted.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LoadError {
    /// The coordinator was built against an engine that is not available.
    #[error("character engine unavailable")]
    EngineUnavailable,

    /// The model directory does not exist or is not a directory.
    #[error("model directory not found: {}", .0.display())]
    DirectoryNotFound(PathBuf),

    /// The settings file does not exist inside the model directory.
    #[error("model settings file not found: {}", .0.display())]
    SettingsNotFound(PathBuf),

    /// A model path could not be split into directory and settings file.
    #[error("invalid model path: {0}")]
    InvalidModelPath(String),

    /// The engine failed to build the model.
    #[error(transparent)]
    Engine(#[from] EngineError),
}

/// Errors that can occur while loading configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read config {}: {source}", path.display())]
    Io {
        /// File that was being read.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The configuration text is not valid TOML for the expected schema.
    #[error("failed to parse config: {0}")]
    Parse(String),

    /// The configuration parsed but holds values that cannot work.
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Result type for model loading.
pub type LoadResult<T> = Result<T, LoadError>;

/// Result type for configuration loading.
pub type ConfigResult<T> = Result<T, ConfigError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_error_converts_into_load_error() {
        let err: LoadError = EngineError::Rejected {
            reason: "bad moc".to_string(),
        }
        .into();
        assert_eq!(err.to_string(), "engine rejected model: bad moc");
    }

    #[test]
    fn test_missing_paths_are_reported() {
        let err = LoadError::SettingsNotFound(PathBuf::from("models/Hiyori/Hiyori.model3.json"));
        assert!(err.to_string().contains("Hiyori.model3.json"));
    }
}
