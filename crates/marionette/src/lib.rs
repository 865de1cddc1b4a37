//! # Marionette
//!
//! Application layer over the frame coordinator.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                             MARIONETTE                              │
//! ├─────────────────────────────────────────────────────────────────────┤
//! │                                                                     │
//! │  producer ──ParameterMap──► ParameterDriver ──┐                     │
//! │                                               ▼                     │
//! │  FrameLoop ──tick──► FrameCoordinator ──► HeadlessEngine            │
//! │   (pacing)            (marionette_rendering)  (software)            │
//! │                                                                     │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - `config`: TOML configuration for the demo binary
//! - `frame_loop`: frame pacing and per-frame target handling
//! - `headless`: software character engine

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod config;
pub mod frame_loop;
pub mod headless;

pub use marionette_core as core;
pub use marionette_rendering as rendering;

pub use config::{DemoSettings, MarionetteConfig};
pub use frame_loop::{FrameLoop, FrameLoopConfig, FrameLoopStats};
pub use headless::{HeadlessEngine, HeadlessFrame, HeadlessModel, HeadlessSurface, SampleModel};
