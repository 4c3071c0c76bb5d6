//! Hash-partitioned aggregation job.
//!
//! ```text
//! submit() (caller thread)
//!     |  Keyer
//!     |  hash partition by group key
//!     v
//! Lane threads (parallelism), one WindowAggregator each
//!     |  ChannelSink
//!     v
//! Collector thread, owns the user's ResultSink
//! ```
//!
//! All channels are bounded, so a slow sink throttles the lanes and a busy
//! lane throttles `submit`.

use std::thread::{self, JoinHandle};

use anyhow::{Context, Result, anyhow};
use crossbeam_channel::{Receiver, Sender, bounded};
use tallycrab_core::config::EngineConfig;
use tallycrab_core::engine::{LaneStats, WindowAggregator};
use tallycrab_core::error::{EmissionError, EngineError};
use tallycrab_core::keyer::{Event, Keyer, KeyerStats};
use tallycrab_core::partitioner::{GroupKeyPartitioner, Partitioner, group_key_partitioner};
use tallycrab_core::sink::{ChannelSink, OutputRecord, ResultSink};
use tallycrab_core::types::RawRecord;

/// Messages from the router to a lane.
enum LaneInput {
    Event(Event),
    /// No more input. With `drain`, outstanding windows are emitted first.
    Finish { drain: bool },
}

/// Outcome of one lane.
#[derive(Debug)]
pub struct LaneReport {
    pub index: usize,
    pub stats: LaneStats,
    /// The fatal error that halted the lane, if any.
    pub error: Option<EngineError>,
}

/// Outcome of a finished job.
#[derive(Debug)]
pub struct JobReport<S> {
    /// The user's sink, handed back after the collector stopped.
    pub sink: S,
    pub keyer: KeyerStats,
    pub lanes: Vec<LaneReport>,
    /// First error returned by the user's sink. The collector stops there.
    pub sink_error: Option<EmissionError>,
}

impl<S> JobReport<S> {
    /// True when no lane halted and the sink never failed.
    pub fn is_healthy(&self) -> bool {
        self.sink_error.is_none() && self.lanes.iter().all(|lane| lane.error.is_none())
    }

    /// Lane counters summed over all lanes.
    pub fn lane_totals(&self) -> LaneStats {
        let mut totals = LaneStats::default();
        for lane in &self.lanes {
            totals.merge(&lane.stats);
        }
        totals
    }

    pub fn total_emitted(&self) -> u64 {
        self.lane_totals().emitted
    }

    pub fn first_error(&self) -> Option<&EngineError> {
        self.lanes.iter().find_map(|lane| lane.error.as_ref())
    }
}

/// A running job: `parallelism` lanes plus a collector.
pub struct AggregationJob<S> {
    keyer: Keyer,
    partitioner: GroupKeyPartitioner,
    senders: Vec<Sender<LaneInput>>,
    lanes: Vec<JoinHandle<LaneReport>>,
    collector: JoinHandle<(S, Option<EmissionError>)>,
}

impl<S> AggregationJob<S>
where
    S: ResultSink + Send + 'static,
{
    /// Validate `config` and start the lane and collector threads.
    pub fn start(config: &EngineConfig, sink: S) -> Result<Self> {
        config.validate().context("invalid engine configuration")?;
        let parallelism = config.parallelism;

        let (output_tx, output_rx) = bounded::<OutputRecord>(config.channel_capacity);

        let mut senders = Vec::with_capacity(parallelism);
        let mut lanes = Vec::with_capacity(parallelism);
        for index in 0..parallelism {
            let aggregator = WindowAggregator::new(config, ChannelSink::new(output_tx.clone()))
                .context("failed to build lane")?;
            let (tx, rx) = bounded(config.channel_capacity);
            senders.push(tx);
            let handle = thread::Builder::new()
                .name(format!("tallycrab-lane-{index}"))
                .spawn(move || run_lane(index, aggregator, rx))
                .with_context(|| format!("failed to spawn lane {index}"))?;
            lanes.push(handle);
        }
        // Only the lanes hold output senders now; the collector ends when they do.
        drop(output_tx);

        let collector = thread::Builder::new()
            .name("tallycrab-collector".to_string())
            .spawn(move || run_collector(sink, output_rx))
            .context("failed to spawn collector")?;

        tracing::info!(
            parallelism,
            window_size_ms = config.window_size_ms,
            grace_ms = config.grace_ms,
            "aggregation job started"
        );

        Ok(Self {
            keyer: Keyer::new(),
            partitioner: group_key_partitioner(),
            senders,
            lanes,
            collector,
        })
    }

    /// Key a raw record and route it to its lane.
    ///
    /// Malformed and unkeyable records are counted and dropped. Blocks while
    /// the target lane's channel is full.
    pub fn submit(&mut self, record: RawRecord) -> Result<()> {
        match self.keyer.key(&record) {
            Ok(event) => self.submit_event(event),
            Err(_) => Ok(()),
        }
    }

    /// Route an already keyed event to its lane.
    pub fn submit_event(&mut self, event: Event) -> Result<()> {
        let lane = self.partitioner.partition(&event, self.senders.len());
        self.senders[lane]
            .send(LaneInput::Event(event))
            .map_err(|_| anyhow!("lane {lane} stopped receiving"))
    }

    /// Stop accepting input, wait for every lane and the collector.
    ///
    /// With `drain`, each healthy lane emits its outstanding windows as final
    /// before stopping. Without it, they are discarded.
    pub fn finish(self, drain: bool) -> Result<JobReport<S>> {
        for (lane, sender) in self.senders.iter().enumerate() {
            sender
                .send(LaneInput::Finish { drain })
                .map_err(|_| anyhow!("lane {lane} stopped receiving"))?;
        }
        drop(self.senders);

        let mut lanes = Vec::with_capacity(self.lanes.len());
        for (index, handle) in self.lanes.into_iter().enumerate() {
            let report = handle
                .join()
                .map_err(|_| anyhow!("lane {index} panicked"))?;
            lanes.push(report);
        }
        let (sink, sink_error) = self
            .collector
            .join()
            .map_err(|_| anyhow!("collector panicked"))?;

        let report = JobReport {
            sink,
            keyer: self.keyer.stats(),
            lanes,
            sink_error,
        };
        let totals = report.lane_totals();
        tracing::info!(
            parsed = report.keyer.parsed,
            parse_errors = report.keyer.parse_errors,
            unkeyable = report.keyer.unkeyable,
            accumulated = totals.accumulated,
            late_dropped = totals.late_dropped,
            emitted = totals.emitted,
            discarded = totals.discarded,
            lost = totals.lost,
            healthy = report.is_healthy(),
            "aggregation job finished"
        );
        Ok(report)
    }
}

fn run_lane(
    index: usize,
    mut aggregator: WindowAggregator<ChannelSink>,
    input: Receiver<LaneInput>,
) -> LaneReport {
    let mut error = None;

    // A halted lane keeps receiving so the router never blocks on it.
    for message in input.iter() {
        match message {
            LaneInput::Event(event) => {
                keep_first(&mut error, aggregator.process(event).map(|_| ()));
            }
            LaneInput::Finish { drain: true } if !aggregator.is_halted() => {
                keep_first(&mut error, aggregator.flush().map(|_| ()));
                break;
            }
            LaneInput::Finish { .. } => {
                tracing::debug!(
                    lane = index,
                    outstanding = aggregator.store().len(),
                    "lane stopping, outstanding windows discarded"
                );
                break;
            }
        }
    }

    let stats = aggregator.stats();
    tracing::debug!(lane = index, emitted = stats.emitted, "lane finished");
    LaneReport {
        index,
        stats,
        error,
    }
}

/// Remember the error that halted the lane. Later `Halted` refusals repeat it.
fn keep_first(slot: &mut Option<EngineError>, result: Result<(), EngineError>) {
    if let Err(err) = result {
        if slot.is_none() && !matches!(err, EngineError::Halted(_)) {
            *slot = Some(err);
        }
    }
}

fn run_collector<S: ResultSink>(
    mut sink: S,
    output: Receiver<OutputRecord>,
) -> (S, Option<EmissionError>) {
    for record in output.iter() {
        if let Err(err) = sink.publish(record) {
            tracing::error!(error = %err, "result sink failed; collector stopping");
            return (sink, Some(err));
        }
    }
    let error = sink.flush().err();
    (sink, error)
}

#[cfg(test)]
#[path = "tests/job_tests.rs"]
mod tests;
