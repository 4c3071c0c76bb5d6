use super::*;

/// Fixed-size, non-overlapping event-time windows aligned to multiples of `size`.
///
/// Assignment is pure arithmetic on the timestamp, so the same timestamp maps
/// to the same window on every call and across restarts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TumblingEventTimeWindows {
    size_ms: i64,
    offset_ms: i64,
}

impl TumblingEventTimeWindows {
    /// Create tumbling windows of the given `size`.
    pub fn of(size: Duration) -> Result<Self, ConfigError> {
        Self::of_with_offset(size, Duration::ZERO)
    }

    /// Create tumbling windows shifted by a non-zero alignment `offset`.
    pub fn of_with_offset(size: Duration, offset: Duration) -> Result<Self, ConfigError> {
        let size_ms = i64::try_from(size.as_millis())
            .map_err(|_| ConfigError::invalid("window_size_ms", "too large"))?;
        if size_ms <= 0 {
            return Err(ConfigError::invalid(
                "window_size_ms",
                "must be at least one millisecond",
            ));
        }
        let offset_ms = i64::try_from(offset.as_millis())
            .map_err(|_| ConfigError::invalid("window_offset_ms", "too large"))?;
        if offset_ms >= size_ms {
            return Err(ConfigError::invalid(
                "window_offset_ms",
                "must be smaller than the window size",
            ));
        }
        Ok(Self { size_ms, offset_ms })
    }

    /// Return the window containing `timestamp`.
    ///
    /// `start = timestamp - (timestamp - offset) mod size` with Euclidean
    /// remainder, i.e. floor division also for pre-epoch timestamps.
    pub fn assign(&self, timestamp: EventTime) -> TimeWindow {
        let shifted = i128::from(timestamp) - i128::from(self.offset_ms);
        let rem = shifted.rem_euclid(i128::from(self.size_ms)) as i64;
        let start = timestamp.saturating_sub(rem);
        TimeWindow::new(start, start.saturating_add(self.size_ms))
    }
}
