//! Model metadata.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use marionette_core::{LoadError, LoadResult};

/// Metadata describing a character model.
///
/// `model_path` points at the model's settings file, e.g.
/// `live2d/Hiyori/Hiyori.model3.json`. `parameter_ids` lists the ids the
/// model understands; an empty set accepts every id.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ModelInfo {
    /// Unique identifier for this model.
    pub model_id: String,
    /// Human-readable display name.
    pub name: String,
    /// Path to the settings file.
    pub model_path: PathBuf,
    /// Supported parameter ids (empty = accept all).
    pub parameter_ids: BTreeSet<String>,
}

impl ModelInfo {
    /// Creates model info that accepts every parameter id.
    pub fn new(
        model_id: impl Into<String>,
        name: impl Into<String>,
        model_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            model_id: model_id.into(),
            name: name.into(),
            model_path: model_path.into(),
            parameter_ids: BTreeSet::new(),
        }
    }

    /// Restricts the model to the given parameter ids.
    #[must_use]
    pub fn with_parameter_ids<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.parameter_ids = ids.into_iter().map(Into::into).collect();
        self
    }

    /// Returns true if the model accepts `id`.
    #[must_use]
    pub fn accepts(&self, id: &str) -> bool {
        self.parameter_ids.is_empty() || self.parameter_ids.contains(id)
    }

    /// Splits `model_path` into (directory, settings file name).
    ///
    /// A bare file name resolves against the current directory.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::InvalidModelPath`] if the path has no file name
    /// or the file name is not UTF-8.
    pub fn split_path(&self) -> LoadResult<(&Path, &str)> {
        let invalid = || LoadError::InvalidModelPath(self.model_path.display().to_string());
        let file_name = self
            .model_path
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(invalid)?;
        let directory = match self.model_path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        Ok((directory, file_name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_path() {
        let info = ModelInfo::new("hiyori", "Hiyori", "live2d/Hiyori/Hiyori.model3.json");
        let (dir, file) = info.split_path().unwrap();
        assert_eq!(dir, Path::new("live2d/Hiyori"));
        assert_eq!(file, "Hiyori.model3.json");
    }

    #[test]
    fn test_split_bare_file_name() {
        let info = ModelInfo::new("test", "Test", "test.model3.json");
        let (dir, file) = info.split_path().unwrap();
        assert_eq!(dir, Path::new("."));
        assert_eq!(file, "test.model3.json");
    }

    #[test]
    fn test_split_rejects_directory_only() {
        let info = ModelInfo::new("test", "Test", "/");
        assert!(matches!(info.split_path(), Err(LoadError::InvalidModelPath(_))));
    }

    #[test]
    fn test_parameter_filter() {
        let open = ModelInfo::new("a", "A", "a.json");
        assert!(open.accepts("Anything"));

        let closed = open.clone().with_parameter_ids(["ParamAngleX", "ParamEyeLOpen"]);
        assert!(closed.accepts("ParamAngleX"));
        assert!(!closed.accepts("ParamMouthOpenY"));
        assert_ne!(open, closed);
    }

    #[test]
    fn test_structural_equality() {
        let a = ModelInfo::new("id", "Name", "path.json");
        let b = ModelInfo::new("id", "Name", "path.json");
        assert_eq!(a, b);
    }
}
