//! One processing lane.
//!
//! ```text
//! raw payload ─▶ Keyer ─▶ Event
//!                          │
//!                          ▼
//!   WatermarkTracker.observe(key, ts)
//!   TumblingEventTimeWindows.assign(ts) ─▶ late? ─▶ drop + count
//!   AggregateStore.accumulate(key, window, amount)
//!   SuppressionGate.check_closures(key) ─▶ Emitter.emit ─▶ ResultSink
//! ```
//!
//! A lane is single-threaded and owns all of its state by value, so a closure
//! sweep and an accumulate for the same key can never interleave.

use crate::config::EngineConfig;
use crate::emitter::{AggregateResult, Emitter};
use crate::error::{ConfigError, EngineError, Rejected};
use crate::keyer::{Event, Keyer, KeyerStats};
use crate::sink::ResultSink;
use crate::state::{Accumulated, AggregateState, AggregateStore};
use crate::suppression::SuppressionGate;
use crate::time::WatermarkTracker;
use crate::types::RawRecord;
use crate::window::TumblingEventTimeWindows;

/// Counters of one lane.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LaneStats {
    /// Events accepted into the store.
    pub accumulated: u64,
    /// Events dropped because their window was already closed.
    pub late_dropped: u64,
    /// `(key, window)` entries created.
    pub windows_opened: u64,
    /// Results published.
    pub emitted: u64,
    /// Events refused after the lane halted.
    pub discarded: u64,
    /// Closed windows that were evicted but never published.
    pub lost: u64,
}

impl LaneStats {
    pub fn merge(&mut self, other: &LaneStats) {
        self.accumulated += other.accumulated;
        self.late_dropped += other.late_dropped;
        self.windows_opened += other.windows_opened;
        self.emitted += other.emitted;
        self.discarded += other.discarded;
        self.lost += other.lost;
    }
}

/// Windowed per-key summation for the keys routed to one lane.
pub struct WindowAggregator<S: ResultSink> {
    assigner: TumblingEventTimeWindows,
    tracker: WatermarkTracker,
    store: AggregateStore,
    gate: SuppressionGate,
    emitter: Emitter<S>,
    stats: LaneStats,
    halted: Option<String>,
}

impl<S: ResultSink> WindowAggregator<S> {
    pub fn new(config: &EngineConfig, sink: S) -> Result<Self, ConfigError> {
        config.validate()?;
        let assigner =
            TumblingEventTimeWindows::of_with_offset(config.window_size(), config.window_offset())?;
        Ok(Self {
            assigner,
            tracker: WatermarkTracker::with_grace(config.grace()),
            store: AggregateStore::new(),
            gate: SuppressionGate::new(),
            emitter: Emitter::new(sink, config.display_offset()?),
            stats: LaneStats::default(),
            halted: None,
        })
    }

    /// Process one keyed event and return the results it caused to be emitted.
    ///
    /// A fatal error halts the lane: this and every later call returns an
    /// error and nothing more is accumulated or emitted.
    pub fn process(&mut self, event: Event) -> Result<Vec<AggregateResult>, EngineError> {
        if let Some(reason) = &self.halted {
            self.stats.discarded += 1;
            return Err(EngineError::Halted(reason.clone()));
        }

        let advanced = self.tracker.observe(&event.group_key, event.timestamp);
        let window = self.assigner.assign(event.timestamp);

        if self.tracker.is_closed(&event.group_key, &window) {
            self.drop_late(&event, "window closed by watermark");
        } else {
            match self
                .store
                .accumulate(&event.group_key, window, event.amount)
            {
                Ok(Accumulated::Opened) => {
                    self.stats.windows_opened += 1;
                    self.stats.accumulated += 1;
                }
                Ok(Accumulated::Updated) => self.stats.accumulated += 1,
                Ok(Accumulated::Late) => self.drop_late(&event, "window already emitted"),
                Err(err) => return Err(self.halt(err.into())),
            }
        }

        if advanced.is_none() {
            return Ok(Vec::new());
        }
        let closed = self
            .gate
            .check_closures(&event.group_key, &self.tracker, &mut self.store);
        self.emit_all(closed)
    }

    /// Emit every outstanding window as final, regardless of watermarks.
    ///
    /// Called on graceful shutdown.
    pub fn flush(&mut self) -> Result<Vec<AggregateResult>, EngineError> {
        if let Some(reason) = &self.halted {
            return Err(EngineError::Halted(reason.clone()));
        }
        let drained = self.gate.drain(&mut self.store);
        tracing::debug!(windows = drained.len(), "draining outstanding windows");
        let results = self.emit_all(drained)?;
        self.emitter.flush().map_err(|err| self.halt(err.into()))?;
        Ok(results)
    }

    fn emit_all(
        &mut self,
        closed: Vec<AggregateState>,
    ) -> Result<Vec<AggregateResult>, EngineError> {
        let pending = closed.len();
        let mut results = Vec::with_capacity(pending);
        for state in closed {
            match self.emitter.emit(state) {
                Ok(result) => {
                    self.stats.emitted += 1;
                    results.push(result);
                }
                Err(err) => {
                    // Closed windows are already evicted; the rest of the batch is gone.
                    let lost = pending - results.len();
                    self.stats.lost += lost as u64;
                    tracing::error!(lost, error = %err, "closed windows lost on emission failure");
                    return Err(self.halt(err.into()));
                }
            }
        }
        Ok(results)
    }

    fn drop_late(&mut self, event: &Event, reason: &str) {
        self.stats.late_dropped += 1;
        tracing::warn!(
            key = %event.group_key,
            order_id = %event.id,
            timestamp = event.timestamp,
            reason,
            "dropping late event"
        );
    }

    fn halt(&mut self, err: EngineError) -> EngineError {
        tracing::error!(error = %err, "lane halted");
        self.halted = Some(err.to_string());
        err
    }

    pub fn is_halted(&self) -> bool {
        self.halted.is_some()
    }

    pub fn stats(&self) -> LaneStats {
        self.stats
    }

    pub fn store(&self) -> &AggregateStore {
        &self.store
    }

    pub fn sink(&self) -> &S {
        self.emitter.sink()
    }

    pub fn into_sink(self) -> S {
        self.emitter.into_sink()
    }
}

/// Counters of a [`Pipeline`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PipelineStats {
    pub keyer: KeyerStats,
    pub lane: LaneStats,
}

/// A [`Keyer`] in front of a single [`WindowAggregator`].
pub struct Pipeline<S: ResultSink> {
    keyer: Keyer,
    aggregator: WindowAggregator<S>,
}

impl<S: ResultSink> Pipeline<S> {
    pub fn new(config: &EngineConfig, sink: S) -> Result<Self, ConfigError> {
        Ok(Self {
            keyer: Keyer::new(),
            aggregator: WindowAggregator::new(config, sink)?,
        })
    }

    /// Key and process one raw record.
    ///
    /// Malformed and unkeyable records are dropped and counted; they produce
    /// `Ok` with no results.
    pub fn process_record(
        &mut self,
        record: &RawRecord,
    ) -> Result<Vec<AggregateResult>, EngineError> {
        match self.keyer.key(record) {
            Ok(event) => self.aggregator.process(event),
            Err(Rejected::Malformed(_) | Rejected::Unkeyable { .. }) => Ok(Vec::new()),
        }
    }

    pub fn flush(&mut self) -> Result<Vec<AggregateResult>, EngineError> {
        self.aggregator.flush()
    }

    pub fn stats(&self) -> PipelineStats {
        PipelineStats {
            keyer: self.keyer.stats(),
            lane: self.aggregator.stats(),
        }
    }

    pub fn aggregator(&self) -> &WindowAggregator<S> {
        &self.aggregator
    }

    pub fn into_sink(self) -> S {
        self.aggregator.into_sink()
    }
}

#[cfg(test)]
#[path = "tests/engine_tests.rs"]
mod tests;
