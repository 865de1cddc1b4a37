//! # Frame Loop
//!
//! Drives a [`FrameCoordinator`] at a fixed frame rate, the way a display
//! link or a view's draw callback would:
//! ```text
//! Frame N:
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │ 1. ACQUIRE TARGET                                                   │
//! │    └─ None (no drawable this vsync) → frame skipped, clock kept     │
//! │                                                                     │
//! │ 2. RENDER                                                           │
//! │    ├─ delta = clock.tick()  (floored, clamped)                      │
//! │    └─ coordinator.render_frame(delta, target, size)                 │
//! │                                                                     │
//! │ 3. PRESENT                                                          │
//! │    └─ hand the target back to the caller                            │
//! │                                                                     │
//! │ 4. PACE                                                             │
//! │    └─ sleep the rest of 1 / target_fps                              │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```

use std::borrow::BorrowMut;
use std::sync::Arc;
use std::time::{Duration, Instant};

use marionette_core::{ConfigError, ConfigResult};
use marionette_rendering::{CharacterEngine, DrawableSize, FrameClock, FrameCoordinator, FrameOutcome};
use serde::{Deserialize, Serialize};

/// Configuration for the frame loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrameLoopConfig {
    /// Target frames per second.
    pub target_fps: u32,
    /// Sleep out the rest of each frame. Off for tests and benchmarks.
    pub pace: bool,
}

impl Default for FrameLoopConfig {
    fn default() -> Self {
        Self {
            target_fps: 60,
            pace: true,
        }
    }
}

impl FrameLoopConfig {
    /// Returns the frame budget for `target_fps`.
    #[must_use]
    pub fn frame_time(&self) -> Duration {
        Duration::from_secs(1) / self.target_fps.max(1)
    }

    /// Checks that the configuration can work.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if `target_fps` is zero.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.target_fps == 0 {
            return Err(ConfigError::Invalid("frame_loop.target_fps must be > 0".into()));
        }
        Ok(())
    }
}

/// Running totals for a [`FrameLoop`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameLoopStats {
    /// Frames the loop tried to produce.
    pub frames_attempted: u64,
    /// Frames the coordinator drew.
    pub frames_rendered: u64,
    /// Frames the coordinator skipped (no model loaded).
    pub frames_skipped: u64,
    /// Frames dropped because no target was available.
    pub frames_without_target: u64,
    /// Sum of render times (microseconds).
    pub render_us_sum: u64,
    /// Slowest render (microseconds).
    pub max_render_us: u64,
}

impl FrameLoopStats {
    /// Returns the average render time in milliseconds.
    #[must_use]
    pub fn avg_render_ms(&self) -> f64 {
        let renders = self.frames_rendered + self.frames_skipped;
        if renders == 0 {
            return 0.0;
        }
        (self.render_us_sum as f64 / renders as f64) / 1000.0
    }

    fn record(&mut self, outcome: &FrameOutcome, render_us: u64) {
        self.render_us_sum += render_us;
        self.max_render_us = self.max_render_us.max(render_us);
        if outcome.is_rendered() {
            self.frames_rendered += 1;
        } else {
            self.frames_skipped += 1;
        }
    }
}

/// Paces a shared coordinator from the render thread.
pub struct FrameLoop<E: CharacterEngine> {
    coordinator: Arc<FrameCoordinator<E>>,
    clock: FrameClock,
    config: FrameLoopConfig,
    stats: FrameLoopStats,
}

impl<E: CharacterEngine> FrameLoop<E> {
    /// Creates a loop. Delta bounds come from the coordinator's clock config.
    #[must_use]
    pub fn new(coordinator: Arc<FrameCoordinator<E>>, config: FrameLoopConfig) -> Self {
        let clock = FrameClock::new(coordinator.config().clock);
        Self {
            coordinator,
            clock,
            config,
            stats: FrameLoopStats::default(),
        }
    }

    /// Renders one frame with the time elapsed since the previous one.
    pub fn tick(&mut self, target: &mut E::Target, size: DrawableSize) -> FrameOutcome {
        self.stats.frames_attempted += 1;
        let delta = self.clock.tick();
        let start = Instant::now();
        let outcome = self.coordinator.render_frame(delta, target, size);
        self.stats.record(&outcome, start.elapsed().as_micros() as u64);
        outcome
    }

    /// Runs `frames` frames.
    ///
    /// `acquire` supplies a target and its size for each frame, or `None` to
    /// drop the frame. `present` receives the target after rendering.
    pub fn run<T, A, P>(&mut self, frames: u64, mut acquire: A, mut present: P) -> FrameLoopStats
    where
        T: BorrowMut<E::Target>,
        A: FnMut(u64) -> Option<(T, DrawableSize)>,
        P: FnMut(T, FrameOutcome),
    {
        let frame_time = self.config.frame_time();

        for frame in 0..frames {
            let frame_start = Instant::now();

            match acquire(frame) {
                Some((mut target, size)) => {
                    let outcome = self.tick(target.borrow_mut(), size);
                    present(target, outcome);
                }
                None => {
                    self.stats.frames_attempted += 1;
                    self.stats.frames_without_target += 1;
                    tracing::trace!("No target for frame {}, skipped", frame);
                }
            }

            if self.config.pace {
                let spent = frame_start.elapsed();
                if spent < frame_time {
                    std::thread::sleep(frame_time - spent);
                }
            }
        }

        self.stats
    }

    /// Returns the loop statistics.
    #[must_use]
    pub fn stats(&self) -> FrameLoopStats {
        self.stats
    }

    /// Returns the coordinator this loop drives.
    #[must_use]
    pub fn coordinator(&self) -> &Arc<FrameCoordinator<E>> {
        &self.coordinator
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &FrameLoopConfig {
        &self.config
    }
}
