use super::*;

/// Minimum possible event time. Used as the "no watermark yet" sentinel.
pub const EVENT_TIME_MIN: EventTime = i64::MIN;

/// Tracks the per-key event-time watermark of one processing lane.
///
/// The watermark of a key is the maximum event timestamp observed for it.
/// It never regresses: out-of-order events leave it unchanged. A window is
/// closed for a key once that key's watermark reaches `window.end + grace`.
/// This is the only closure signal; wall-clock time plays no part.
#[derive(Debug, Default)]
pub struct WatermarkTracker {
    marks: AHashMap<String, EventTime>,
    grace_ms: i64,
}

impl WatermarkTracker {
    /// Create a tracker with no grace period.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a tracker that keeps windows open for `grace` past their end.
    pub fn with_grace(grace: Duration) -> Self {
        Self {
            marks: AHashMap::new(),
            grace_ms: i64::try_from(grace.as_millis()).unwrap_or(i64::MAX),
        }
    }

    /// Observe an event for `key` at `timestamp`.
    ///
    /// Returns `Some(watermark)` if the key's watermark advanced (including
    /// the first observation of a key), `None` if it is unchanged.
    pub fn observe(&mut self, key: &str, timestamp: EventTime) -> Option<Watermark> {
        match self.marks.get_mut(key) {
            Some(mark) if timestamp <= *mark => None,
            Some(mark) => {
                *mark = timestamp;
                Some(Watermark::new(timestamp))
            }
            None => {
                self.marks.insert(key.to_string(), timestamp);
                Some(Watermark::new(timestamp))
            }
        }
    }

    /// Current watermark of `key`, or `None` if the key was never observed.
    pub fn watermark(&self, key: &str) -> Option<Watermark> {
        self.marks.get(key).map(|&ts| Watermark::new(ts))
    }

    /// Latest window end that is closed for `key`: every window with
    /// `end <= closure_bound(key)` is closed.
    pub fn closure_bound(&self, key: &str) -> EventTime {
        self.marks
            .get(key)
            .map_or(EVENT_TIME_MIN, |&ts| ts.saturating_sub(self.grace_ms))
    }

    /// Return true iff the key's watermark is at or past `window.end + grace`.
    pub fn is_closed(&self, key: &str, window: &TimeWindow) -> bool {
        self.marks.contains_key(key) && window.end <= self.closure_bound(key)
    }

    pub fn grace_ms(&self) -> i64 {
        self.grace_ms
    }

    /// Number of keys with a watermark.
    pub fn key_count(&self) -> usize {
        self.marks.len()
    }
}
