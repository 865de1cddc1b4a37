//! # Marionette Rendering
//!
//! Thread-safe coordination between parameter producers and a
//! single-threaded character engine.
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────────┐
//! │                          Producer threads                          │
//! │   tracking ──┐   lip sync ──┐   ParameterDriver ──┐                │
//! └──────────────┼──────────────┼─────────────────────┼────────────────┘
//!                ▼              ▼                     ▼
//!         ┌────────────────────────────────────────────────┐
//!         │          ParameterStage (double-buffered)      │
//!         └───────────────────────┬────────────────────────┘
//!                                 │ swap
//!         ┌───────────────────────▼────────────────────────┐
//!         │      FrameCoordinator (one lock per frame)     │
//!         │   apply ──► update(delta) ──► draw(projection) │
//!         └───────────────────────┬────────────────────────┘
//!                                 ▼
//!                      CharacterEngine (trait)
//! ```
//!
//! ## Guarantees
//!
//! - At most one frame touches the model at any time
//! - A batch from `set_parameters` is applied whole by exactly one frame
//! - Rendering, staging and releasing with no model loaded are no-ops

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod clock;
pub mod config;
pub mod coordinator;
pub mod driver;
pub mod engine;
pub mod model;
pub mod projection;

pub use clock::FrameClock;
pub use config::{ClockConfig, CoordinatorConfig};
pub use coordinator::{CoordinatorStats, FrameCoordinator, FrameOutcome, FrameReport, RenderState};
pub use driver::{drive_parameters, ParameterDriver, ParameterSink};
pub use engine::{CharacterEngine, UnavailableEngine};
pub use model::ModelInfo;
pub use projection::{DrawableSize, Projection};

pub use marionette_core::{EngineError, LoadError, LoadResult, ParameterMap, StateSubscription};
