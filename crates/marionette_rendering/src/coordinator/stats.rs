//! Coordinator statistics.

/// Running totals for a [`FrameCoordinator`](super::FrameCoordinator).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CoordinatorStats {
    /// Frames simulated and drawn.
    pub frames_rendered: u64,
    /// `render_frame` calls made with no model loaded.
    pub frames_skipped: u64,
    /// Drawn frames that exceeded the frame budget.
    pub frames_over_budget: u64,
    /// Parameters applied to a model (staged and immediate).
    pub parameters_applied: u64,
    /// Staged parameters dropped by the model's id filter.
    pub parameters_filtered: u64,
    /// Successful loads.
    pub loads: u64,
    /// Failed loads.
    pub failed_loads: u64,
    /// Models released (explicitly or on reload).
    pub releases: u64,
    /// Duration of the last drawn frame (microseconds).
    pub last_frame_us: u64,
    /// Slowest drawn frame (microseconds).
    pub worst_frame_us: u64,
}

impl CoordinatorStats {
    /// Returns the fraction of drawn frames that were over budget.
    #[must_use]
    pub fn over_budget_ratio(&self) -> f32 {
        if self.frames_rendered == 0 {
            0.0
        } else {
            self.frames_over_budget as f32 / self.frames_rendered as f32
        }
    }

    pub(crate) fn record_frame(&mut self, applied: u32, filtered: u32, elapsed_us: u64, over_budget: bool) {
        self.frames_rendered += 1;
        self.parameters_applied += u64::from(applied);
        self.parameters_filtered += u64::from(filtered);
        self.last_frame_us = elapsed_us;
        self.worst_frame_us = self.worst_frame_us.max(elapsed_us);
        if over_budget {
            self.frames_over_budget += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_frame() {
        let mut stats = CoordinatorStats::default();
        stats.record_frame(3, 1, 900, false);
        stats.record_frame(2, 0, 20_000, true);

        assert_eq!(stats.frames_rendered, 2);
        assert_eq!(stats.parameters_applied, 5);
        assert_eq!(stats.parameters_filtered, 1);
        assert_eq!(stats.last_frame_us, 20_000);
        assert_eq!(stats.worst_frame_us, 20_000);
        assert!((stats.over_budget_ratio() - 0.5).abs() < f32::EPSILON);
    }
}
