//! # TallyCrab API
//!
//! Parallel aggregation jobs built from `tallycrab-core` lanes.
//!
//! ```rust,no_run
//! use tallycrab_api::AggregationJob;
//! use tallycrab_core::config::EngineConfig;
//! use tallycrab_core::sink::CollectingSink;
//! use tallycrab_core::types::RawRecord;
//!
//! let config = EngineConfig { parallelism: 4, ..EngineConfig::default() };
//! let mut job = AggregationJob::start(&config, CollectingSink::new()).unwrap();
//! job.submit(RawRecord::from_text(
//!     r#"{"order_id":"1","timestamp":"2025-06-19T00:32:00Z","country":"US","amount":"1"}"#,
//!     None,
//! ))
//! .unwrap();
//! let report = job.finish(true).unwrap();
//! assert!(report.is_healthy());
//! ```
//!
//! - [`job`]: [`AggregationJob`](job::AggregationJob) and its
//!   [`JobReport`](job::JobReport).

pub mod job;

pub use job::{AggregationJob, JobReport, LaneReport};
pub use tallycrab_core;
