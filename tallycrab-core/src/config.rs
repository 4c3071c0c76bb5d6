//! Engine configuration.
//!
//! Every field has a default, so an empty TOML document is a valid config:
//!
//! ```toml
//! window_size_ms = 60000
//! grace_ms = 0
//! window_offset_ms = 0
//! display_offset = "-05:00"
//! parallelism = 1
//! channel_capacity = 1024
//! ```

use std::path::Path;
use std::time::Duration;

use chrono::FixedOffset;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Default tumbling window size: one minute.
pub const DEFAULT_WINDOW_SIZE_MS: u64 = 60_000;

/// Default display offset for window start labels.
pub const DEFAULT_DISPLAY_OFFSET: &str = "-05:00";

/// Default bounded channel capacity between the router and each lane.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1024;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Tumbling window size in milliseconds.
    pub window_size_ms: u64,
    /// How long after a window's end it still accepts events.
    pub grace_ms: u64,
    /// Window alignment offset, in `[0, window_size_ms)`.
    pub window_offset_ms: u64,
    /// Fixed UTC offset used to render window start labels, e.g. `-05:00`.
    pub display_offset: String,
    /// Number of parallel processing lanes.
    pub parallelism: usize,
    /// Capacity of each lane's input channel.
    pub channel_capacity: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            window_size_ms: DEFAULT_WINDOW_SIZE_MS,
            grace_ms: 0,
            window_offset_ms: 0,
            display_offset: DEFAULT_DISPLAY_OFFSET.to_string(),
            parallelism: 1,
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
        }
    }
}

impl EngineConfig {
    /// Parse a config from TOML text and validate it.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a config file from disk.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    pub fn window_size(&self) -> Duration {
        Duration::from_millis(self.window_size_ms)
    }

    pub fn window_offset(&self) -> Duration {
        Duration::from_millis(self.window_offset_ms)
    }

    pub fn grace(&self) -> Duration {
        Duration::from_millis(self.grace_ms)
    }

    /// The parsed display offset.
    pub fn display_offset(&self) -> Result<FixedOffset, ConfigError> {
        parse_utc_offset(&self.display_offset)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.window_size_ms == 0 {
            return Err(ConfigError::invalid("window_size_ms", "must be positive"));
        }
        if self.window_size_ms > i64::MAX as u64 {
            return Err(ConfigError::invalid("window_size_ms", "too large"));
        }
        if self.grace_ms > i64::MAX as u64 {
            return Err(ConfigError::invalid("grace_ms", "too large"));
        }
        if self.window_offset_ms >= self.window_size_ms {
            return Err(ConfigError::invalid(
                "window_offset_ms",
                format!("must be smaller than window_size_ms ({})", self.window_size_ms),
            ));
        }
        if self.parallelism == 0 {
            return Err(ConfigError::invalid("parallelism", "must be at least 1"));
        }
        if self.channel_capacity == 0 {
            return Err(ConfigError::invalid("channel_capacity", "must be at least 1"));
        }
        self.display_offset()?;
        Ok(())
    }
}

/// Parse a fixed UTC offset.
///
/// Accepts `Z`, `UTC`, `+HH:MM`, `-HH:MM`, `+HHMM`, `-HH` and the same forms
/// prefixed with `UTC` (e.g. `UTC-05:00`, `UTC-5`).
pub fn parse_utc_offset(text: &str) -> Result<FixedOffset, ConfigError> {
    let invalid = || ConfigError::invalid("display_offset", format!("`{text}` is not a UTC offset"));

    let trimmed = text.trim();
    let rest = trimmed
        .strip_prefix("UTC")
        .or_else(|| trimmed.strip_prefix("GMT"))
        .unwrap_or(trimmed);
    if rest.is_empty() || rest == "Z" {
        return FixedOffset::east_opt(0).ok_or_else(invalid);
    }

    let (sign, digits) = match rest.as_bytes()[0] {
        b'+' => (1, &rest[1..]),
        b'-' => (-1, &rest[1..]),
        _ => return Err(invalid()),
    };
    if !digits.is_ascii() {
        return Err(invalid());
    }

    let (hours, minutes) = match digits.split_once(':') {
        Some((h, m)) => (h, m),
        None if digits.len() == 4 => digits.split_at(2),
        None => (digits, "0"),
    };
    if hours.is_empty() || hours.len() > 2 || minutes.is_empty() || minutes.len() > 2 {
        return Err(invalid());
    }
    let hours: i32 = hours.parse().map_err(|_| invalid())?;
    let minutes: i32 = minutes.parse().map_err(|_| invalid())?;
    if hours > 23 || minutes > 59 {
        return Err(invalid());
    }

    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60)).ok_or_else(invalid)
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
