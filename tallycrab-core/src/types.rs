use serde::{Deserialize, Serialize};

/// Event time in milliseconds since epoch.
pub type EventTime = i64;

/// A record handed over by the transport, carrying the payload and an
/// optional externally supplied event time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StreamRecord<T> {
    pub value: T,
    pub timestamp: Option<EventTime>,
}

/// An undecoded input message as delivered by the transport.
pub type RawRecord = StreamRecord<Vec<u8>>;

impl RawRecord {
    /// Build a raw record from a text payload.
    pub fn from_text(payload: impl Into<String>, timestamp: Option<EventTime>) -> Self {
        Self {
            value: payload.into().into_bytes(),
            timestamp,
        }
    }
}

/// High-water mark of observed event time for one key.
///
/// No element with timestamp below a closed window's end is
/// aggregated once the watermark has passed it.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
pub struct Watermark {
    pub timestamp: EventTime,
}

impl Watermark {
    /// Create a new watermark at the given timestamp.
    pub fn new(timestamp: EventTime) -> Self {
        Self { timestamp }
    }
}

impl std::fmt::Display for Watermark {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Watermark({}ms)", self.timestamp)
    }
}

#[cfg(test)]
#[path = "tests/types_tests.rs"]
mod tests;
