//! Suppress-until-window-closes.
//!
//! Partial sums are never emitted. After each watermark advance the gate
//! evicts the key's closed windows from the store and hands back their final
//! state. Eviction and hand-off happen in the same call, and the store rejects
//! accumulation into evicted windows, so each `(key, window)` leaves the gate
//! at most once.

use crate::state::{AggregateState, AggregateStore};
use crate::time::WatermarkTracker;

/// Closure sweep over one key's outstanding windows.
#[derive(Debug, Default)]
pub struct SuppressionGate;

impl SuppressionGate {
    pub fn new() -> Self {
        Self
    }

    /// Evict and return every window of `key` that the tracker considers
    /// closed, oldest first.
    pub fn check_closures(
        &self,
        key: &str,
        tracker: &WatermarkTracker,
        store: &mut AggregateStore,
    ) -> Vec<AggregateState> {
        if tracker.watermark(key).is_none() {
            return Vec::new();
        }
        store.evict_closed(key, tracker.closure_bound(key))
    }

    /// Evict every outstanding window regardless of watermarks.
    ///
    /// Used on graceful shutdown.
    pub fn drain(&self, store: &mut AggregateStore) -> Vec<AggregateState> {
        store.drain()
    }
}

#[cfg(test)]
#[path = "tests/suppression_tests.rs"]
mod tests;
