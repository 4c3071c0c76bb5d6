use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::types::EventTime;

mod assigners;
mod primitives;

pub use assigners::*;
pub use primitives::*;

#[cfg(test)]
#[path = "tests/window_tests.rs"]
mod tests;
