//! # Downstream Engine Seam
//!
//! The coordinator never touches a graphics SDK directly. Everything it
//! needs from the character engine goes through [`CharacterEngine`]:
//!
//! ```text
//! FrameCoordinator ──load_model──► engine ──► E::Model (owned by coordinator)
//!                  ──set_parameter─►        (id forwarded verbatim)
//!                  ──update────────►        (physics, pose)
//!                  ──draw──────────►        (target, projection, size)
//!                  ──release_model─►        (frees GPU resources)
//! ```

pub mod mock;

use std::path::Path;

use marionette_core::EngineError;

use crate::projection::{DrawableSize, Projection};

/// A character rendering/simulation engine.
///
/// The engine holds shared resources (renderer, shader cache, id table);
/// each loaded model is returned to the caller as an owned `Model` value and
/// handed back on every call, so only the owner of the model can mutate or
/// free it.
pub trait CharacterEngine: Send {
    /// Whether the engine was compiled into this build.
    const AVAILABLE: bool = true;

    /// Long-lived graphics surface the engine draws into (e.g. a metal layer).
    type Surface: Send + Sync + ?Sized;

    /// A loaded model.
    type Model: Send;

    /// Per-frame draw target (e.g. command buffer + render pass).
    type Target: ?Sized;

    /// Builds a model from `settings_file` inside `directory`.
    ///
    /// # Errors
    ///
    /// Returns an [`EngineError`] if the assets cannot be read or are
    /// rejected.
    fn load_model(
        &mut self,
        surface: &Self::Surface,
        directory: &Path,
        settings_file: &str,
    ) -> Result<Self::Model, EngineError>;

    /// Sets one parameter on the model.
    fn set_parameter(&mut self, model: &mut Self::Model, id: &str, value: f32);

    /// Advances physics and pose by `delta_seconds` (never negative).
    fn update(&mut self, model: &mut Self::Model, delta_seconds: f32);

    /// Submits draw commands for the model.
    fn draw(
        &mut self,
        model: &mut Self::Model,
        target: &mut Self::Target,
        projection: &Projection,
        size: DrawableSize,
    );

    /// Frees the model and any engine resources it holds.
    fn release_model(&mut self, model: Self::Model);
}

/// Stand-in for an engine that was not compiled into this build.
///
/// Every load fails with [`EngineError::Unavailable`]; there is never a model
/// to update or draw.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnavailableEngine;

impl CharacterEngine for UnavailableEngine {
    const AVAILABLE: bool = false;

    type Surface = ();
    type Model = ();
    type Target = ();

    fn load_model(&mut self, _surface: &(), _directory: &Path, _settings_file: &str) -> Result<(), EngineError> {
        Err(EngineError::Unavailable)
    }

    fn set_parameter(&mut self, _model: &mut (), _id: &str, _value: f32) {}

    fn update(&mut self, _model: &mut (), _delta_seconds: f32) {}

    fn draw(&mut self, _model: &mut (), _target: &mut (), _projection: &Projection, _size: DrawableSize) {}

    fn release_model(&mut self, _model: ()) {}
}
