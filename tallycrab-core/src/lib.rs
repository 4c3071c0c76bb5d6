//! # TallyCrab Core
//!
//! Event-time aggregation engine for keyed transaction streams.
//!
//! Raw payloads are keyed, assigned to tumbling windows, summed with exact
//! decimal arithmetic and emitted exactly once when the per-key watermark
//! closes their window:
//!
//! - [`keyer`]: payload parsing and group-key derivation: [`Keyer`](keyer::Keyer),
//!   [`Event`](keyer::Event).
//! - [`window`]: [`TimeWindow`](window::TimeWindow) and the
//!   [`TumblingEventTimeWindows`](window::TumblingEventTimeWindows) assigner.
//! - [`state`]: [`AggregateStore`](state::AggregateStore), the lane-owned
//!   `(key, window) -> AggregateState` map.
//! - [`time`]: per-key [`WatermarkTracker`](time::WatermarkTracker).
//! - [`suppression`]: [`SuppressionGate`](suppression::SuppressionGate), the
//!   closure sweep that evicts finished windows.
//! - [`emitter`] / [`sink`]: result rendering and the output collaborator seam.
//! - [`engine`]: [`WindowAggregator`](engine::WindowAggregator) (one
//!   processing lane) and [`Pipeline`](engine::Pipeline) (keyer + lane).
//! - [`partitioner`]: key-to-lane routing.
//! - [`config`] / [`error`]: engine configuration and the error taxonomy.

pub mod config;
pub mod emitter;
pub mod engine;
pub mod error;
pub mod keyer;
pub mod partitioner;
pub mod sink;
pub mod state;
pub mod suppression;
pub mod time;
pub mod types;
pub mod window;
