//! # Aggregation State
//!
//! The lane-owned `(key, window) -> AggregateState` map. This is the only
//! mutable state of a processing lane besides the watermark map; it is never
//! shared across lanes, so no locking is involved.

use std::collections::BTreeMap;

use ahash::AHashMap;
use rust_decimal::Decimal;

use crate::error::AccumulationError;
use crate::types::EventTime;
use crate::window::TimeWindow;

mod store;

pub use store::*;

#[cfg(test)]
#[path = "tests/store_tests.rs"]
mod tests;
