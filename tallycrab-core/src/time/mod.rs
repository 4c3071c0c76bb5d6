use std::time::Duration;

use ahash::AHashMap;

use crate::types::{EventTime, Watermark};
use crate::window::TimeWindow;

mod tracker;

pub use tracker::*;

#[cfg(test)]
#[path = "tests/time_tests.rs"]
mod tests;
