//! # Marionette Core
//!
//! Synchronization primitives behind the Marionette frame coordinator:
//! - A staging map that many producer threads write and one render step drains
//! - A latest-value broadcast with bounded replay for lifecycle observers
//! - The shared error taxonomy
//!
//! ## Architecture Rules
//!
//! 1. **Producers never wait on a frame** - staging takes one short lock
//! 2. **Batches are atomic** - a drain sees a whole batch or none of it
//! 3. **Steady-state frames do not allocate** - the stage is double-buffered
//!
//! ## Example
//!
//! ```rust
//! use marionette_core::{ParameterMap, ParameterStage};
//!
//! let stage = ParameterStage::new();
//! stage.stage_batch([("ParamAngleX", 15.0), ("ParamAngleY", -5.0)]);
//!
//! let mut drained = ParameterMap::new();
//! assert_eq!(stage.swap_into(&mut drained), 2);
//! assert!(stage.is_empty());
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod error;
pub mod state;
pub mod sync;

pub use error::{ConfigError, ConfigResult, EngineError, LoadError, LoadResult};
pub use state::{StateBroadcast, StateSubscription};
pub use sync::{ParameterMap, ParameterStage};
