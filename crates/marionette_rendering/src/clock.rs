//! Frame delta timing.

use std::time::{Duration, Instant};

use crate::config::ClockConfig;

/// Measures the time between consecutive frames.
///
/// The delta is floored so a frame never advances by zero (two ticks inside
/// one timer quantum) and clamped so a stalled thread does not push one huge
/// step into physics.
#[derive(Debug, Clone)]
pub struct FrameClock {
    config: ClockConfig,
    last: Instant,
    started: Instant,
    ticks: u64,
}

impl FrameClock {
    /// Creates a clock. The first tick measures from creation.
    #[must_use]
    pub fn new(config: ClockConfig) -> Self {
        Self::starting_at(config, Instant::now())
    }

    /// Creates a clock whose first tick measures from `start`.
    #[must_use]
    pub fn starting_at(config: ClockConfig, start: Instant) -> Self {
        Self {
            config,
            last: start,
            started: start,
            ticks: 0,
        }
    }

    /// Returns the delta in seconds since the previous tick.
    pub fn tick(&mut self) -> f32 {
        self.tick_at(Instant::now())
    }

    /// Returns the delta in seconds between the previous tick and `now`.
    pub fn tick_at(&mut self, now: Instant) -> f32 {
        let elapsed = now.saturating_duration_since(self.last);
        self.last = now;
        self.ticks += 1;

        // Not `clamp`: must not panic when min > max.
        elapsed
            .as_secs_f32()
            .min(self.config.max_delta_seconds)
            .max(self.config.min_delta_seconds)
    }

    /// Forgets the previous tick, e.g. after the loop was paused.
    pub fn reset(&mut self) {
        self.last = Instant::now();
    }

    /// Returns the number of ticks taken.
    #[must_use]
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Returns the time since the clock was created.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new(ClockConfig::default())
    }
}
