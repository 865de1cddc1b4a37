//! # Parameter Stage
//!
//! Pending parameter writes, buffered until the next render step.
//!
//! ## Architecture
//!
//! ```text
//!      ┌────────────┐ ┌────────────┐ ┌────────────┐
//!      │ Producer A │ │ Producer B │ │ Producer C │
//!      └─────┬──────┘ └─────┬──────┘ └─────┬──────┘
//!            │ stage_batch  │              │
//!            ▼              ▼              ▼
//!      ┌─────────────────────────────────────────┐
//!      │        ParameterStage (pending map)     │
//!      │   id → value, last write wins per id    │
//!      └────────────────────┬────────────────────┘
//!                           │ swap_into (once per frame)
//!                           ▼
//!      ┌─────────────────────────────────────────┐
//!      │      Render step's spare map → model    │
//!      └─────────────────────────────────────────┘
//! ```
//!
//! ## Thread Safety
//!
//! - `stage` / `stage_batch`: any thread, any number of times
//! - `swap_into`: the render step only; it is never concurrent with itself
//!   because the caller holds its own frame lock

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;

/// Parameter id → value.
pub type ParameterMap = HashMap<String, f32>;

/// Staging area for parameter writes coming from producer threads.
///
/// ## Usage
///
/// ```rust
/// use marionette_core::{ParameterMap, ParameterStage};
///
/// let stage = ParameterStage::with_capacity(64);
///
/// // Tracking thread
/// stage.stage_batch([("ParamAngleX", 10.0), ("ParamEyeLOpen", 0.8)]);
/// stage.stage("ParamAngleX", 12.0); // last write wins
///
/// // Render thread, once per frame
/// let mut spare = ParameterMap::with_capacity(64);
/// stage.swap_into(&mut spare);
/// assert_eq!(spare.get("ParamAngleX"), Some(&12.0));
/// ```
#[derive(Debug, Default)]
pub struct ParameterStage {
    /// Values waiting for the next drain.
    pending: Mutex<ParameterMap>,
    /// Incremented once per non-empty publish.
    generation: AtomicU64,
    /// Total number of values ever staged.
    writes: AtomicU64,
}

impl ParameterStage {
    /// Creates an empty stage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty stage with room for `capacity` distinct ids.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            pending: Mutex::new(HashMap::with_capacity(capacity)),
            generation: AtomicU64::new(0),
            writes: AtomicU64::new(0),
        }
    }

    /// Stages a single value.
    pub fn stage(&self, id: impl Into<String>, value: f32) {
        let id = id.into();
        self.pending.lock().insert(id, value);
        self.writes.fetch_add(1, Ordering::Relaxed);
        self.generation.fetch_add(1, Ordering::Release);
    }

    /// Stages a batch of values atomically.
    ///
    /// Keys are converted before the lock is taken, so the critical section
    /// is only the map inserts. A later entry for the same id inside one
    /// batch overwrites an earlier one.
    ///
    /// Returns the number of entries staged.
    pub fn stage_batch<I, K>(&self, batch: I) -> usize
    where
        I: IntoIterator<Item = (K, f32)>,
        K: Into<String>,
    {
        let owned: Vec<(String, f32)> = batch
            .into_iter()
            .map(|(id, value)| (id.into(), value))
            .collect();
        if owned.is_empty() {
            return 0;
        }

        let count = owned.len();
        self.pending.lock().extend(owned);

        self.writes.fetch_add(count as u64, Ordering::Relaxed);
        self.generation.fetch_add(1, Ordering::Release);
        count
    }

    /// Removes a pending value, returning it if one was staged.
    pub fn remove(&self, id: &str) -> Option<f32> {
        self.pending.lock().remove(id)
    }

    /// Swaps the pending map with `spare`.
    ///
    /// `spare` is cleared first and then receives every pending value; the
    /// stage keeps `spare`'s old allocation, so alternating two maps frame
    /// after frame does not allocate.
    ///
    /// Returns the number of values drained.
    pub fn swap_into(&self, spare: &mut ParameterMap) -> usize {
        spare.clear();
        std::mem::swap(&mut *self.pending.lock(), spare);
        spare.len()
    }

    /// Discards every pending value.
    pub fn clear(&self) {
        self.pending.lock().clear();
    }

    /// Returns the number of distinct ids waiting.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pending.lock().len()
    }

    /// Returns true if nothing is waiting.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pending.lock().is_empty()
    }

    /// Returns a copy of the pending values.
    #[must_use]
    pub fn snapshot(&self) -> ParameterMap {
        self.pending.lock().clone()
    }

    /// Returns the publish generation (bumped once per non-empty stage call).
    #[inline]
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    /// Returns the total number of values ever staged.
    #[inline]
    #[must_use]
    pub fn total_writes(&self) -> u64 {
        self.writes.load(Ordering::Relaxed)
    }
}
