//! Recording engine for tests (no graphics SDK required).
//!
//! Every call the coordinator makes is appended to a shared [`EngineLog`],
//! so tests can assert on exact call sequences, allocation balance and
//! render overlap from any thread.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use marionette_core::EngineError;
use parking_lot::Mutex;

use super::CharacterEngine;
use crate::projection::{DrawableSize, Projection};

/// One call received by a [`RecordingEngine`].
#[derive(Debug, Clone, PartialEq)]
pub enum EngineCall {
    /// A model was built.
    Load {
        /// Directory passed to the engine.
        directory: PathBuf,
        /// Settings file passed to the engine.
        settings_file: String,
        /// Serial of the model that was created.
        model: u64,
    },
    /// A parameter was applied.
    SetParameter {
        /// Target model serial.
        model: u64,
        /// Parameter id, verbatim.
        id: String,
        /// Value applied.
        value: f32,
    },
    /// The simulation was advanced.
    Update {
        /// Target model serial.
        model: u64,
        /// Delta passed to the engine.
        delta_seconds: f32,
    },
    /// The model was drawn.
    Draw {
        /// Target model serial.
        model: u64,
        /// Target the draw was submitted to.
        target: u64,
        /// Drawable size of the frame.
        size: DrawableSize,
        /// Projection computed for the frame.
        projection: Projection,
    },
    /// A model was released.
    Release {
        /// Serial of the released model.
        model: u64,
    },
}

/// Everything a [`RecordingEngine`] has seen.
#[derive(Debug, Default)]
pub struct EngineLog {
    /// Calls in arrival order.
    pub calls: Vec<EngineCall>,
    /// Successful loads.
    pub loads: u64,
    /// Failed loads.
    pub failed_loads: u64,
    /// Loads currently inside `load_model`.
    pub loading: u32,
    /// Releases.
    pub releases: u64,
    /// Draws, counted even when calls are not recorded.
    pub draws: u64,
    /// Renders between `update` and the end of `draw` right now.
    pub in_flight: u32,
    /// Highest `in_flight` ever observed.
    pub max_in_flight: u32,
}

impl EngineLog {
    /// Returns loads minus releases.
    #[must_use]
    pub fn live_models(&self) -> i64 {
        self.loads as i64 - self.releases as i64
    }

    /// Returns every applied (id, value) in order.
    #[must_use]
    pub fn applied_parameters(&self) -> Vec<(String, f32)> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                EngineCall::SetParameter { id, value, .. } => Some((id.clone(), *value)),
                _ => None,
            })
            .collect()
    }

    /// Returns every update delta in order.
    #[must_use]
    pub fn update_deltas(&self) -> Vec<f32> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                EngineCall::Update { delta_seconds, .. } => Some(*delta_seconds),
                _ => None,
            })
            .collect()
    }

    /// Returns the number of draw calls.
    #[must_use]
    pub fn draw_count(&self) -> usize {
        self.calls
            .iter()
            .filter(|call| matches!(call, EngineCall::Draw { .. }))
            .count()
    }
}

/// A loaded model inside a [`RecordingEngine`].
///
/// Deliberately not `Clone`: exactly one owner can hand it back.
#[derive(Debug, PartialEq, Eq)]
pub struct RecordedModel {
    /// Serial number, unique per engine.
    pub serial: u64,
}

/// Per-frame draw target for a [`RecordingEngine`].
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RecordingTarget {
    /// Identifies the target in [`EngineCall::Draw`].
    pub id: u64,
    /// Draws submitted to this target.
    pub draws: u32,
}

impl RecordingTarget {
    /// Creates a target with the given id.
    #[must_use]
    pub fn new(id: u64) -> Self {
        Self { id, draws: 0 }
    }
}

/// Test double implementing [`CharacterEngine`].
#[derive(Debug, Default)]
pub struct RecordingEngine {
    log: Arc<Mutex<EngineLog>>,
    failing_settings: HashSet<String>,
    draw_delay: Option<Duration>,
    load_delay: Option<Duration>,
    counters_only: bool,
    next_serial: u64,
}

impl RecordingEngine {
    /// Creates an engine that accepts every load.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes loads of `settings_file` fail with [`EngineError::Rejected`].
    #[must_use]
    pub fn fail_loads_for(mut self, settings_file: impl Into<String>) -> Self {
        self.failing_settings.insert(settings_file.into());
        self
    }

    /// Sleeps inside every draw, widening race windows in tests.
    #[must_use]
    pub fn with_draw_delay(mut self, delay: Duration) -> Self {
        self.draw_delay = Some(delay);
        self
    }

    /// Sleeps inside every load, before it succeeds or fails.
    #[must_use]
    pub fn with_load_delay(mut self, delay: Duration) -> Self {
        self.load_delay = Some(delay);
        self
    }

    /// Stops recording per-frame calls; loads and releases are still logged.
    ///
    /// For long-running loops where the call list would grow without bound.
    #[must_use]
    pub fn counters_only(mut self) -> Self {
        self.counters_only = true;
        self
    }

    /// Returns a handle to the shared log.
    #[must_use]
    pub fn log(&self) -> Arc<Mutex<EngineLog>> {
        Arc::clone(&self.log)
    }
}

impl CharacterEngine for RecordingEngine {
    type Surface = ();
    type Model = RecordedModel;
    type Target = RecordingTarget;

    fn load_model(
        &mut self,
        _surface: &(),
        directory: &Path,
        settings_file: &str,
    ) -> Result<RecordedModel, EngineError> {
        if let Some(delay) = self.load_delay {
            self.log.lock().loading += 1;
            std::thread::sleep(delay);
            self.log.lock().loading -= 1;
        }
        if self.failing_settings.contains(settings_file) {
            self.log.lock().failed_loads += 1;
            return Err(EngineError::Rejected {
                reason: format!("{settings_file} is corrupt"),
            });
        }

        self.next_serial += 1;
        let model = RecordedModel {
            serial: self.next_serial,
        };
        let mut log = self.log.lock();
        log.loads += 1;
        log.calls.push(EngineCall::Load {
            directory: directory.to_path_buf(),
            settings_file: settings_file.to_string(),
            model: model.serial,
        });
        Ok(model)
    }

    fn set_parameter(&mut self, model: &mut RecordedModel, id: &str, value: f32) {
        if self.counters_only {
            return;
        }
        self.log.lock().calls.push(EngineCall::SetParameter {
            model: model.serial,
            id: id.to_string(),
            value,
        });
    }

    fn update(&mut self, model: &mut RecordedModel, delta_seconds: f32) {
        let mut log = self.log.lock();
        log.in_flight += 1;
        log.max_in_flight = log.max_in_flight.max(log.in_flight);
        if !self.counters_only {
            log.calls.push(EngineCall::Update {
                model: model.serial,
                delta_seconds,
            });
        }
    }

    fn draw(
        &mut self,
        model: &mut RecordedModel,
        target: &mut RecordingTarget,
        projection: &Projection,
        size: DrawableSize,
    ) {
        if let Some(delay) = self.draw_delay {
            std::thread::sleep(delay);
        }
        target.draws += 1;

        let mut log = self.log.lock();
        log.draws += 1;
        if !self.counters_only {
            log.calls.push(EngineCall::Draw {
                model: model.serial,
                target: target.id,
                size,
                projection: *projection,
            });
        }
        log.in_flight = log.in_flight.saturating_sub(1);
    }

    fn release_model(&mut self, model: RecordedModel) {
        let mut log = self.log.lock();
        log.releases += 1;
        log.calls.push(EngineCall::Release {
            model: model.serial,
        });
    }
}
