//! # Synchronization Primitives for Cross-Thread Parameter Updates
//!
//! ## The Problem
//!
//! ```text
//! Thread 1..N (tracking/animation): WRITE parameter values
//! Render thread:                    APPLY values, simulate, draw
//!
//! Writing straight into the model: TORN FRAMES (half a pose applied)
//! Holding the render lock to write: PRODUCERS STALL FOR A WHOLE FRAME
//! ```
//!
//! ## The Solution: Double-Buffered Staging
//!
//! ```text
//! Producers:  stage batch → [Pending Map]    (short lock, O(batch))
//!
//! Frame N:
//!   SWAP [Pending Map] <-> [Spare Map]       (short lock, O(1))
//!   Render drains Spare Map into the model   (no producer lock held)
//! ```
//!
//! A batch is inserted under a single lock acquisition, so a swap always
//! observes whole batches.

mod parameter_stage;

pub use parameter_stage::{ParameterMap, ParameterStage};
