//! Per-frame results and the coordinator lifecycle.

/// Lifecycle of a [`FrameCoordinator`](super::FrameCoordinator), as seen by
/// state subscribers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RenderState {
    /// No model has been loaded yet.
    Uninitialized,
    /// A model is loaded and nothing has been drawn with it yet.
    Ready,
    /// At least one frame has been drawn with the current model.
    Rendering,
    /// A load failed while no model was loaded.
    Error,
    /// The model was released.
    Released,
}

impl RenderState {
    /// Returns true if a model is loaded in this state.
    #[must_use]
    pub const fn has_model(self) -> bool {
        matches!(self, Self::Ready | Self::Rendering)
    }
}

/// What happened to one `render_frame` call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FrameOutcome {
    /// Nothing was loaded; nothing was applied or drawn.
    Skipped,
    /// The frame was simulated and drawn.
    Rendered(FrameReport),
}

impl FrameOutcome {
    /// Returns true if the frame was drawn.
    #[must_use]
    pub const fn is_rendered(&self) -> bool {
        matches!(self, Self::Rendered(_))
    }

    /// Returns the report of a drawn frame.
    #[must_use]
    pub const fn report(&self) -> Option<&FrameReport> {
        match self {
            Self::Rendered(report) => Some(report),
            Self::Skipped => None,
        }
    }
}

/// Details of a drawn frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameReport {
    /// Frames drawn by this coordinator, including this one.
    pub frame_number: u64,
    /// Staged parameters applied to the model.
    pub parameters_applied: u32,
    /// Staged parameters dropped because the model does not accept them.
    pub parameters_filtered: u32,
    /// Delta actually passed to the engine (after sanitizing).
    pub delta_seconds: f32,
    /// Time spent applying, simulating and drawing (microseconds).
    pub elapsed_us: u64,
    /// Whether `elapsed_us` exceeded the configured budget.
    pub over_budget: bool,
}
