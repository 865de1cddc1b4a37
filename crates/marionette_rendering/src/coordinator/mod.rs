//! # Frame Coordinator
//!
//! One lock around the character model. Producers stage parameters from any
//! thread; the render step applies them, advances the simulation and draws,
//! all while holding the lock.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                          render_frame                            │
//! ├──────────────────────────────────────────────────────────────────┤
//! │  1. lock frame state                                             │
//! │  2. no model?  ─────────────────────────────► Skipped (no-op)    │
//! │  3. swap stage → spare map, apply each id → value (filtered)     │
//! │  4. engine.update(delta)          (bad/negative delta → 0.0)     │
//! │  5. engine.draw(target, projection(size), size)                  │
//! │  6. stats, lifecycle, unlock                                     │
//! └──────────────────────────────────────────────────────────────────┘
//!
//!  set_parameters ──► stage (short lock, never the frame lock)
//!  set_parameter  ──► try frame lock: free → apply now; busy → stage
//! ```
//!
//! Lock order is always frame → stage → stats/state. A `set_parameters`
//! call that returns before `render_frame` starts is applied by that frame;
//! one that races with a frame lands on it or on the next one.

mod frame;
mod stats;

pub use frame::{FrameOutcome, FrameReport, RenderState};
pub use stats::CoordinatorStats;

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use marionette_core::{LoadError, LoadResult, ParameterMap, ParameterStage, StateBroadcast, StateSubscription};
use parking_lot::Mutex;

use crate::config::CoordinatorConfig;
use crate::engine::CharacterEngine;
use crate::model::ModelInfo;
use crate::projection::{DrawableSize, Projection};

/// Everything only the lock holder may touch.
struct FrameState<E: CharacterEngine> {
    engine: E,
    model: Option<E::Model>,
    info: Option<ModelInfo>,
    /// Second half of the double-buffered stage.
    spare: ParameterMap,
    frames: u64,
    drawn_since_load: bool,
}

/// Thread-safe coordinator between parameter producers and a single-threaded
/// character engine.
///
/// Share it with `Arc`; every method takes `&self`.
///
/// ## Usage
///
/// ```rust
/// use std::sync::Arc;
/// use marionette_rendering::{CoordinatorConfig, DrawableSize, FrameCoordinator};
/// use marionette_rendering::engine::mock::{RecordingEngine, RecordingTarget};
///
/// let config = CoordinatorConfig { validate_paths: false, ..CoordinatorConfig::default() };
/// let coordinator = FrameCoordinator::with_config(RecordingEngine::new(), Arc::new(()), config);
/// coordinator.load_model("live2d/Hiyori", "Hiyori.model3.json").unwrap();
///
/// // Any thread
/// coordinator.set_parameters([("ParamAngleX", 15.0)]);
///
/// // Render thread
/// let mut target = RecordingTarget::new(1);
/// let outcome = coordinator.render_frame(0.016, &mut target, DrawableSize::new(800, 600));
/// assert!(outcome.is_rendered());
/// ```
pub struct FrameCoordinator<E: CharacterEngine> {
    frame: Mutex<FrameState<E>>,
    stage: ParameterStage,
    surface: Arc<E::Surface>,
    loaded: AtomicBool,
    state: StateBroadcast<RenderState>,
    stats: Mutex<CoordinatorStats>,
    config: CoordinatorConfig,
}

impl<E: CharacterEngine> FrameCoordinator<E> {
    /// Creates a coordinator with the default configuration.
    ///
    /// `surface` is the graphics surface the engine draws into. The
    /// coordinator shares it and never destroys it.
    #[must_use]
    pub fn new(engine: E, surface: Arc<E::Surface>) -> Self {
        Self::with_config(engine, surface, CoordinatorConfig::default())
    }

    /// Creates a coordinator with an explicit configuration.
    #[must_use]
    pub fn with_config(engine: E, surface: Arc<E::Surface>, config: CoordinatorConfig) -> Self {
        Self {
            frame: Mutex::new(FrameState {
                engine,
                model: None,
                info: None,
                spare: ParameterMap::with_capacity(config.stage_capacity),
                frames: 0,
                drawn_since_load: false,
            }),
            stage: ParameterStage::with_capacity(config.stage_capacity),
            surface,
            loaded: AtomicBool::new(false),
            state: StateBroadcast::new(RenderState::Uninitialized, config.state_replay),
            stats: Mutex::new(CoordinatorStats::default()),
            config,
        }
    }

    /// Whether the engine was compiled into this build.
    #[must_use]
    pub fn sdk_available() -> bool {
        E::AVAILABLE
    }

    /// Loads a model from `settings_file` inside `directory`.
    ///
    /// On success any previously loaded model is released. On failure the
    /// coordinator is left exactly as it was: a loaded model stays loaded.
    ///
    /// # Errors
    ///
    /// Returns a [`LoadError`] if the engine is unavailable, the paths do not
    /// exist (when `validate_paths` is set) or the engine rejects the model.
    pub fn load_model(&self, directory: impl AsRef<Path>, settings_file: &str) -> LoadResult<()> {
        self.load(directory.as_ref(), settings_file, None)
    }

    /// Loads the model described by `info` and keeps `info` for parameter
    /// filtering.
    ///
    /// # Errors
    ///
    /// As [`Self::load_model`], plus [`LoadError::InvalidModelPath`] if
    /// `info.model_path` has no file name.
    pub fn load_model_info(&self, info: ModelInfo) -> LoadResult<()> {
        let (directory, settings_file) = match info.split_path() {
            Ok((directory, settings_file)) => (directory.to_path_buf(), settings_file.to_string()),
            Err(err) => {
                self.record_load_failure(self.is_model_loaded(), &err);
                return Err(err);
            }
        };
        self.load(&directory, &settings_file, Some(info))
    }

    fn load(&self, directory: &Path, settings_file: &str, info: Option<ModelInfo>) -> LoadResult<()> {
        let mut guard = self.frame.lock();
        let frame = &mut *guard;
        let had_model = frame.model.is_some();

        let result = if E::AVAILABLE {
            self.check_paths(directory, settings_file).and_then(|()| {
                frame
                    .engine
                    .load_model(&*self.surface, directory, settings_file)
                    .map_err(LoadError::from)
            })
        } else {
            Err(LoadError::EngineUnavailable)
        };

        match result {
            Ok(model) => {
                let replaced = frame.model.replace(model);
                if let Some(old) = replaced {
                    frame.engine.release_model(old);
                    self.stats.lock().releases += 1;
                }
                frame.info = info;
                frame.drawn_since_load = false;
                self.loaded.store(true, Ordering::Release);
                self.stats.lock().loads += 1;

                // Equal states are conflated: a reload before any draw is not
                // a visible transition.
                if !self.state.publish(RenderState::Ready) {
                    tracing::debug!("Reloaded before first draw, state stays Ready");
                }
                tracing::info!(
                    "Model loaded: {} from {}",
                    settings_file,
                    directory.display()
                );
                Ok(())
            }
            Err(err) => {
                self.record_load_failure(had_model, &err);
                Err(err)
            }
        }
    }

    fn check_paths(&self, directory: &Path, settings_file: &str) -> LoadResult<()> {
        if !self.config.validate_paths {
            return Ok(());
        }
        if !directory.is_dir() {
            return Err(LoadError::DirectoryNotFound(directory.to_path_buf()));
        }
        let settings = directory.join(settings_file);
        if settings_file.is_empty() || !settings.is_file() {
            return Err(LoadError::SettingsNotFound(settings));
        }
        Ok(())
    }

    fn record_load_failure(&self, had_model: bool, err: &LoadError) {
        self.stats.lock().failed_loads += 1;
        if had_model {
            tracing::warn!("Model load failed, keeping current model: {}", err);
        } else {
            self.state.publish(RenderState::Error);
            tracing::warn!("Model load failed: {}", err);
        }
    }

    /// Sets one parameter immediately, bypassing the stage.
    ///
    /// Never waits for the frame lock. If no frame is in flight the value is
    /// written to the model right away (and any staged value for `id` is
    /// dropped so this later write wins); if a frame is in flight the value
    /// is staged for the next frame instead. With no model loaded the value
    /// is discarded, including while a load or release holds the lock.
    pub fn set_parameter(&self, id: &str, value: f32) {
        let Some(mut guard) = self.frame.try_lock() else {
            // Busy with a load or release: there is no model to stage for.
            if !self.is_model_loaded() {
                return;
            }
            tracing::debug!("Frame in flight, staging {} for next frame", id);
            self.stage.stage(id, value);
            return;
        };

        let frame = &mut *guard;
        let Some(model) = frame.model.as_mut() else {
            return;
        };
        self.stage.remove(id);
        if frame.info.as_ref().map_or(true, |info| info.accepts(id)) {
            frame.engine.set_parameter(model, id, value);
            self.stats.lock().parameters_applied += 1;
        }
    }

    /// Stages a batch of parameters for the next frame.
    ///
    /// The batch is staged atomically: a frame applies all of it or none of
    /// it. Returns the number of entries staged.
    pub fn set_parameters<I, K>(&self, params: I) -> usize
    where
        I: IntoIterator<Item = (K, f32)>,
        K: Into<String>,
    {
        self.stage.stage_batch(params)
    }

    /// Applies staged parameters, advances the simulation by `delta_seconds`
    /// and draws into `target`, all under the frame lock.
    ///
    /// A non-finite or non-positive delta advances by zero. With no model
    /// loaded nothing is applied or drawn and staged parameters are kept for
    /// the first frame after a load.
    pub fn render_frame(&self, delta_seconds: f32, target: &mut E::Target, size: DrawableSize) -> FrameOutcome {
        let mut guard = self.frame.lock();
        let start = Instant::now();
        let frame = &mut *guard;

        let Some(model) = frame.model.as_mut() else {
            self.stats.lock().frames_skipped += 1;
            tracing::trace!("No model loaded, frame skipped");
            return FrameOutcome::Skipped;
        };

        self.stage.swap_into(&mut frame.spare);
        let mut applied = 0u32;
        let mut filtered = 0u32;
        for (id, value) in frame.spare.drain() {
            if frame.info.as_ref().is_some_and(|info| !info.accepts(&id)) {
                filtered += 1;
                continue;
            }
            frame.engine.set_parameter(model, &id, value);
            applied += 1;
        }

        let delta = if delta_seconds.is_finite() && delta_seconds > 0.0 {
            delta_seconds
        } else {
            0.0
        };
        frame.engine.update(model, delta);

        let projection = Projection::for_drawable(size);
        frame.engine.draw(model, target, &projection, size);

        frame.frames += 1;
        let first_draw = !frame.drawn_since_load;
        frame.drawn_since_load = true;
        if first_draw {
            self.state.publish(RenderState::Rendering);
        }

        let elapsed_us = start.elapsed().as_micros() as u64;
        let over_budget = elapsed_us > u64::from(self.config.frame_budget_us);
        if over_budget {
            tracing::warn!(
                "Frame {} over budget: {}us > {}us",
                frame.frames,
                elapsed_us,
                self.config.frame_budget_us
            );
        }
        self.stats.lock().record_frame(applied, filtered, elapsed_us, over_budget);
        tracing::trace!("Frame {} drawn, {} parameters applied", frame.frames, applied);

        FrameOutcome::Rendered(FrameReport {
            frame_number: frame.frames,
            parameters_applied: applied,
            parameters_filtered: filtered,
            delta_seconds: delta,
            elapsed_us,
            over_budget,
        })
    }

    /// Releases the loaded model and clears staged parameters.
    ///
    /// Idempotent: with nothing loaded this only clears the stage.
    pub fn release_resources(&self) {
        let mut guard = self.frame.lock();
        let frame = &mut *guard;

        // Flag before clearing the stage: a busy `set_parameter` that reads
        // the flag after this point drops its value.
        self.loaded.store(false, Ordering::Release);
        frame.info = None;
        if let Some(model) = frame.model.take() {
            frame.engine.release_model(model);
            self.stats.lock().releases += 1;
            self.state.publish(RenderState::Released);
            tracing::info!("Model released after {} frames", frame.frames);
        }
        self.stage.clear();
    }

    /// Whether a model is loaded and ready to render.
    #[must_use]
    pub fn is_model_loaded(&self) -> bool {
        self.loaded.load(Ordering::Acquire)
    }

    /// Returns the current lifecycle state.
    #[must_use]
    pub fn state(&self) -> RenderState {
        self.state.current()
    }

    /// Subscribes to lifecycle transitions, starting with recent history.
    #[must_use]
    pub fn subscribe_state(&self) -> StateSubscription<RenderState> {
        self.state.subscribe()
    }

    /// Returns a snapshot of the running statistics.
    #[must_use]
    pub fn stats(&self) -> CoordinatorStats {
        *self.stats.lock()
    }

    /// Returns the info of the loaded model, if it was loaded from one.
    ///
    /// Waits for an in-flight frame.
    #[must_use]
    pub fn model_info(&self) -> Option<ModelInfo> {
        self.frame.lock().info.clone()
    }

    /// Returns the number of parameter ids waiting for the next frame.
    #[must_use]
    pub fn staged_len(&self) -> usize {
        self.stage.len()
    }

    /// Returns the surface the engine draws into.
    #[must_use]
    pub fn surface(&self) -> &Arc<E::Surface> {
        &self.surface
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &CoordinatorConfig {
        &self.config
    }
}

impl<E: CharacterEngine> Drop for FrameCoordinator<E> {
    fn drop(&mut self) {
        let frame = self.frame.get_mut();
        if let Some(model) = frame.model.take() {
            frame.engine.release_model(model);
        }
    }
}

impl<E: CharacterEngine> std::fmt::Debug for FrameCoordinator<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameCoordinator")
            .field("loaded", &self.is_model_loaded())
            .field("state", &self.state())
            .field("staged", &self.staged_len())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::mock::{EngineCall, RecordingEngine, RecordingTarget};
    use crate::engine::UnavailableEngine;

    fn unchecked() -> CoordinatorConfig {
        CoordinatorConfig {
            validate_paths: false,
            ..CoordinatorConfig::default()
        }
    }

    fn coordinator(engine: RecordingEngine) -> FrameCoordinator<RecordingEngine> {
        FrameCoordinator::with_config(engine, Arc::new(()), unchecked())
    }

    const SIZE: DrawableSize = DrawableSize::new(800, 600);

    #[test]
    fn test_render_before_load_is_noop() {
        let engine = RecordingEngine::new();
        let log = engine.log();
        let coordinator = coordinator(engine);
        let mut target = RecordingTarget::new(1);

        coordinator.set_parameter("ParamAngleX", 1.0);
        coordinator.set_parameters([("ParamAngleY", 2.0)]);
        assert_eq!(coordinator.render_frame(0.016, &mut target, SIZE), FrameOutcome::Skipped);
        coordinator.release_resources();

        assert!(!coordinator.is_model_loaded());
        assert_eq!(coordinator.state(), RenderState::Uninitialized);
        assert!(log.lock().calls.is_empty());
        assert_eq!(target.draws, 0);
        assert_eq!(coordinator.stats().frames_skipped, 1);
    }

    #[test]
    fn test_staged_before_load_survive_until_first_frame() {
        let engine = RecordingEngine::new();
        let log = engine.log();
        let coordinator = coordinator(engine);

        coordinator.set_parameters([("ParamAngleX", 3.0)]);
        coordinator.load_model("models", "a.model3.json").unwrap();
        let mut target = RecordingTarget::new(1);
        coordinator.render_frame(0.016, &mut target, SIZE);

        assert_eq!(log.lock().applied_parameters(), vec![("ParamAngleX".to_string(), 3.0)]);
    }

    #[test]
    fn test_last_staged_value_wins() {
        let engine = RecordingEngine::new();
        let log = engine.log();
        let coordinator = coordinator(engine);
        coordinator.load_model("models", "a.model3.json").unwrap();

        coordinator.set_parameters([("ParamAngleX", 1.0)]);
        coordinator.set_parameters([("ParamAngleX", 2.0)]);
        let mut target = RecordingTarget::new(1);
        coordinator.render_frame(0.016, &mut target, SIZE);

        assert_eq!(log.lock().applied_parameters(), vec![("ParamAngleX".to_string(), 2.0)]);
    }

    #[test]
    fn test_immediate_write_beats_older_staged_value() {
        let engine = RecordingEngine::new();
        let log = engine.log();
        let coordinator = coordinator(engine);
        coordinator.load_model("models", "a.model3.json").unwrap();

        coordinator.set_parameters([("ParamAngleX", 1.0)]);
        coordinator.set_parameter("ParamAngleX", 9.0);
        assert_eq!(coordinator.staged_len(), 0);

        let mut target = RecordingTarget::new(1);
        coordinator.render_frame(0.016, &mut target, SIZE);
        assert_eq!(log.lock().applied_parameters(), vec![("ParamAngleX".to_string(), 9.0)]);
    }

    #[test]
    fn test_bad_delta_is_zero_advance() {
        let engine = RecordingEngine::new();
        let log = engine.log();
        let coordinator = coordinator(engine);
        coordinator.load_model("models", "a.model3.json").unwrap();
        let mut target = RecordingTarget::new(1);

        for delta in [0.0, -1.0, f32::NAN, f32::INFINITY] {
            let outcome = coordinator.render_frame(delta, &mut target, SIZE);
            assert_eq!(outcome.report().map(|r| r.delta_seconds), Some(0.0));
        }
        assert_eq!(log.lock().update_deltas(), vec![0.0; 4]);
        assert_eq!(target.draws, 4);
    }

    #[test]
    fn test_lifecycle_states() {
        let coordinator = coordinator(RecordingEngine::new());
        let sub = coordinator.subscribe_state();
        let mut target = RecordingTarget::new(1);

        coordinator.load_model("models", "a.model3.json").unwrap();
        coordinator.render_frame(0.016, &mut target, SIZE);
        coordinator.render_frame(0.016, &mut target, SIZE);
        coordinator.release_resources();
        coordinator.release_resources();

        assert_eq!(
            sub.drain(),
            vec![
                RenderState::Uninitialized,
                RenderState::Ready,
                RenderState::Rendering,
                RenderState::Released,
            ]
        );
    }

    #[test]
    fn test_failed_first_load_reports_error() {
        let coordinator = coordinator(RecordingEngine::new().fail_loads_for("broken.model3.json"));

        let err = coordinator.load_model("models", "broken.model3.json").unwrap_err();
        assert!(matches!(err, LoadError::Engine(_)));
        assert!(!coordinator.is_model_loaded());
        assert_eq!(coordinator.state(), RenderState::Error);
        assert_eq!(coordinator.stats().failed_loads, 1);
    }

    #[test]
    fn test_reload_releases_previous_model() {
        let engine = RecordingEngine::new();
        let log = engine.log();
        let coordinator = coordinator(engine);

        coordinator.load_model("models", "a.model3.json").unwrap();
        coordinator.load_model("models", "b.model3.json").unwrap();

        let log = log.lock();
        assert_eq!(log.live_models(), 1);
        assert!(matches!(log.calls.last(), Some(EngineCall::Release { model: 1 })));
    }

    #[test]
    fn test_model_info_filters_parameters() {
        let engine = RecordingEngine::new();
        let log = engine.log();
        let coordinator = coordinator(engine);
        let info = ModelInfo::new("hiyori", "Hiyori", "live2d/Hiyori/Hiyori.model3.json")
            .with_parameter_ids(["ParamAngleX"]);

        coordinator.load_model_info(info.clone()).unwrap();
        assert_eq!(coordinator.model_info(), Some(info));

        coordinator.set_parameters([("ParamAngleX", 1.0), ("ParamUnknown", 2.0)]);
        let mut target = RecordingTarget::new(1);
        let outcome = coordinator.render_frame(0.016, &mut target, SIZE);

        let report = outcome.report().copied().unwrap();
        assert_eq!(report.parameters_applied, 1);
        assert_eq!(report.parameters_filtered, 1);
        assert_eq!(log.lock().applied_parameters(), vec![("ParamAngleX".to_string(), 1.0)]);

        let calls = log.lock().calls.clone();
        assert!(matches!(
            &calls[0],
            EngineCall::Load { directory, settings_file, .. }
                if directory == Path::new("live2d/Hiyori") && settings_file == "Hiyori.model3.json"
        ));
    }

    #[test]
    fn test_path_validation() {
        let coordinator = FrameCoordinator::new(RecordingEngine::new(), Arc::new(()));
        let missing = std::env::temp_dir().join("marionette_no_such_model_dir");

        assert!(matches!(
            coordinator.load_model(&missing, "a.model3.json"),
            Err(LoadError::DirectoryNotFound(_))
        ));
        assert!(matches!(
            coordinator.load_model(std::env::temp_dir(), "marionette_no_such_settings.model3.json"),
            Err(LoadError::SettingsNotFound(_))
        ));
        assert!(!coordinator.is_model_loaded());
    }

    #[test]
    fn test_unavailable_engine_degrades() {
        assert!(!FrameCoordinator::<UnavailableEngine>::sdk_available());
        assert!(FrameCoordinator::<RecordingEngine>::sdk_available());

        let coordinator = FrameCoordinator::new(UnavailableEngine, Arc::new(()));
        assert_eq!(
            coordinator.load_model("models", "a.model3.json"),
            Err(LoadError::EngineUnavailable)
        );
        coordinator.set_parameter("ParamAngleX", 1.0);
        coordinator.set_parameters([("ParamAngleX", 1.0)]);
        assert_eq!(coordinator.render_frame(0.016, &mut (), SIZE), FrameOutcome::Skipped);
        coordinator.release_resources();
        assert!(!coordinator.is_model_loaded());
    }

    #[test]
    fn test_drop_releases_model() {
        let engine = RecordingEngine::new();
        let log = engine.log();
        let coordinator = coordinator(engine);
        coordinator.load_model("models", "a.model3.json").unwrap();
        drop(coordinator);
        assert_eq!(log.lock().live_models(), 0);
    }
}
