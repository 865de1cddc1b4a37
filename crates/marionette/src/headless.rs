//! # Headless Character Engine
//!
//! A software [`CharacterEngine`] with no graphics SDK. It keeps each
//! model's parameter table and simulated time, and "draws" by appending a
//! snapshot to a `Vec<HeadlessFrame>`.
//!
//! ```text
//! load_model  ──► read settings file (non-empty UTF-8) ──► HeadlessModel
//! set_parameter ► parameters[id] = value
//! update      ──► time += delta
//! draw        ──► target.push(HeadlessFrame { size, projection, params, time })
//! ```

use std::collections::BTreeMap;
use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};

use marionette_core::EngineError;
use marionette_rendering::{CharacterEngine, DrawableSize, Projection};

/// Named off-screen surface models are bound to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadlessSurface {
    label: String,
}

impl HeadlessSurface {
    /// Creates a surface with a label for logs.
    #[must_use]
    pub fn new(label: impl Into<String>) -> Self {
        Self { label: label.into() }
    }

    /// Returns the surface label.
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }
}

/// A model loaded by the [`HeadlessEngine`].
#[derive(Debug)]
pub struct HeadlessModel {
    name: String,
    surface: String,
    parameters: BTreeMap<String, f32>,
    time_seconds: f64,
}

impl HeadlessModel {
    /// Returns the model name (settings file stem).
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the current value of a parameter, if it was ever set.
    #[must_use]
    pub fn parameter(&self, id: &str) -> Option<f32> {
        self.parameters.get(id).copied()
    }

    /// Returns the simulated time in seconds.
    #[must_use]
    pub fn time_seconds(&self) -> f64 {
        self.time_seconds
    }
}

/// One drawn frame.
#[derive(Debug, Clone, PartialEq)]
pub struct HeadlessFrame {
    /// Model that was drawn.
    pub model: String,
    /// Surface the model was bound to.
    pub surface: String,
    /// Drawable size of the frame.
    pub size: DrawableSize,
    /// Projection the coordinator computed.
    pub projection: Projection,
    /// Every parameter value at draw time.
    pub parameters: BTreeMap<String, f32>,
    /// Simulated time at draw time.
    pub time_seconds: f64,
}

/// Software character engine.
#[derive(Debug, Default)]
pub struct HeadlessEngine {
    loaded: u64,
    released: u64,
}

impl HeadlessEngine {
    /// Creates an engine with no models.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns models loaded and not yet released.
    #[must_use]
    pub fn live_models(&self) -> u64 {
        self.loaded - self.released
    }
}

impl CharacterEngine for HeadlessEngine {
    type Surface = HeadlessSurface;
    type Model = HeadlessModel;
    type Target = Vec<HeadlessFrame>;

    fn load_model(
        &mut self,
        surface: &HeadlessSurface,
        directory: &Path,
        settings_file: &str,
    ) -> Result<HeadlessModel, EngineError> {
        let path = directory.join(settings_file);
        let settings = std::fs::read_to_string(&path).map_err(|err| match err.kind() {
            ErrorKind::InvalidData => EngineError::Rejected {
                reason: format!("{} is not UTF-8", path.display()),
            },
            _ => EngineError::Io(format!("{}: {err}", path.display())),
        })?;
        if settings.trim().is_empty() {
            return Err(EngineError::Rejected {
                reason: format!("{} is empty", path.display()),
            });
        }

        let name = Path::new(settings_file)
            .file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or(settings_file)
            .trim_end_matches(".model3")
            .to_string();

        self.loaded += 1;
        tracing::debug!("Headless model {} bound to {}", name, surface.label());
        Ok(HeadlessModel {
            name,
            surface: surface.label().to_string(),
            parameters: BTreeMap::new(),
            time_seconds: 0.0,
        })
    }

    fn set_parameter(&mut self, model: &mut HeadlessModel, id: &str, value: f32) {
        model.parameters.insert(id.to_string(), value);
    }

    fn update(&mut self, model: &mut HeadlessModel, delta_seconds: f32) {
        model.time_seconds += f64::from(delta_seconds);
    }

    fn draw(
        &mut self,
        model: &mut HeadlessModel,
        target: &mut Vec<HeadlessFrame>,
        projection: &Projection,
        size: DrawableSize,
    ) {
        target.push(HeadlessFrame {
            model: model.name.clone(),
            surface: model.surface.clone(),
            size,
            projection: *projection,
            parameters: model.parameters.clone(),
            time_seconds: model.time_seconds,
        });
    }

    fn release_model(&mut self, model: HeadlessModel) {
        self.released += 1;
        tracing::debug!("Headless model {} released", model.name);
    }
}

/// A generated model directory under the temp dir, removed on drop.
#[derive(Debug)]
pub struct SampleModel {
    dir: PathBuf,
}

impl SampleModel {
    /// Writes a minimal settings file named `settings_file`.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory or file cannot be written.
    pub fn create(settings_file: &str) -> io::Result<Self> {
        let dir = std::env::temp_dir().join(format!("marionette_sample_{}", std::process::id()));
        std::fs::create_dir_all(&dir)?;
        let sample = Self { dir };
        std::fs::write(
            sample.dir.join(settings_file),
            r#"{"Version": 3, "FileReferences": {"Moc": "sample.moc3"}}"#,
        )?;
        Ok(sample)
    }

    /// Returns the model directory.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.dir
    }
}

impl Drop for SampleModel {
    fn drop(&mut self) {
        if let Err(err) = std::fs::remove_dir_all(&self.dir) {
            tracing::warn!("Could not remove sample model {}: {}", self.dir.display(), err);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;

    fn fixture(name: &str, contents: &[u8]) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("marionette_headless_{}_{}", name, std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("Hiyori.model3.json"), contents).unwrap();
        dir
    }

    #[test]
    fn test_load_update_draw() {
        let dir = fixture("ok", br#"{"Version": 3}"#);
        let surface = HeadlessSurface::new("offscreen");
        let mut engine = HeadlessEngine::new();

        let mut model = engine.load_model(&surface, &dir, "Hiyori.model3.json").unwrap();
        assert_eq!(model.name(), "Hiyori");

        engine.set_parameter(&mut model, "ParamAngleX", 15.0);
        engine.update(&mut model, 0.5);
        engine.update(&mut model, 0.25);
        let mut frames = Vec::new();
        let size = DrawableSize::new(800, 600);
        engine.draw(&mut model, &mut frames, &Projection::for_drawable(size), size);

        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].surface, "offscreen");
        assert_eq!(frames[0].parameters.get("ParamAngleX"), Some(&15.0));
        assert!((frames[0].time_seconds - 0.75).abs() < 1e-9);

        engine.release_model(model);
        assert_eq!(engine.live_models(), 0);
        fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn test_rejects_empty_and_non_utf8() {
        let surface = HeadlessSurface::new("offscreen");
        let mut engine = HeadlessEngine::new();

        let empty = fixture("empty", b"  \n");
        assert!(matches!(
            engine.load_model(&surface, &empty, "Hiyori.model3.json"),
            Err(EngineError::Rejected { .. })
        ));

        let binary = fixture("binary", &[0xff, 0xfe, 0x00]);
        assert!(matches!(
            engine.load_model(&surface, &binary, "Hiyori.model3.json"),
            Err(EngineError::Rejected { .. })
        ));

        assert!(matches!(
            engine.load_model(&surface, &empty, "missing.model3.json"),
            Err(EngineError::Io(_))
        ));
        assert_eq!(engine.live_models(), 0);

        fs::remove_dir_all(empty).unwrap();
        fs::remove_dir_all(binary).unwrap();
    }

    #[test]
    fn test_sample_model_removed_on_drop() {
        let sample = SampleModel::create("Sample.model3.json").unwrap();
        let dir = sample.path().to_path_buf();

        // A failed run still cleans up: the engine rejects the wrong file.
        let mut engine = HeadlessEngine::new();
        let surface = HeadlessSurface::new("offscreen");
        assert!(engine.load_model(&surface, &dir, "Other.model3.json").is_err());
        assert!(engine.load_model(&surface, &dir, "Sample.model3.json").is_ok());

        drop(sample);
        assert!(!dir.exists());
    }
}
