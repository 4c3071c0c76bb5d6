//! Turns closed aggregates into published result records.

use chrono::{DateTime, FixedOffset};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::error::EmissionError;
use crate::sink::{OutputRecord, ResultSink};
use crate::state::AggregateState;
use crate::types::EventTime;

/// Format of the window start label: local time, no offset suffix.
pub const WINDOW_LABEL_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Final aggregate of one closed `(key, window)`.
///
/// `total_amount` is serialized as a JSON number holding the exact decimal
/// text, e.g. `300.00`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AggregateResult {
    pub country: String,
    pub window_start: String,
    #[serde(with = "rust_decimal::serde::arbitrary_precision")]
    pub total_amount: Decimal,
}

/// Renders closed windows and publishes them to a [`ResultSink`].
pub struct Emitter<S: ResultSink> {
    sink: S,
    offset: FixedOffset,
}

impl<S: ResultSink> Emitter<S> {
    pub fn new(sink: S, offset: FixedOffset) -> Self {
        Self { sink, offset }
    }

    /// Render, serialize and publish one closed aggregate.
    ///
    /// Exactly one `publish` call is made per successful emission. Any failure
    /// is returned; nothing is retried.
    pub fn emit(&mut self, state: AggregateState) -> Result<AggregateResult, EmissionError> {
        let result = AggregateResult {
            window_start: self.window_label(state.window.start)?,
            country: state.key,
            total_amount: state.total,
        };

        let payload = serde_json::to_vec(&result).map_err(|source| EmissionError::Serialize {
            key: result.country.clone(),
            source,
        })?;
        let record = OutputRecord {
            key: result.country.clone(),
            payload,
        };
        tracing::info!(
            key = %record.key,
            value = %record.payload_str(),
            "publishing message"
        );
        self.sink.publish(record)?;
        Ok(result)
    }

    /// Render a window start as local time in the configured offset.
    pub fn window_label(&self, start: EventTime) -> Result<String, EmissionError> {
        let utc = DateTime::from_timestamp_millis(start).ok_or(EmissionError::Label(start))?;
        Ok(utc
            .with_timezone(&self.offset)
            .naive_local()
            .format(WINDOW_LABEL_FORMAT)
            .to_string())
    }

    /// Flush the underlying sink.
    pub fn flush(&mut self) -> Result<(), EmissionError> {
        self.sink.flush()
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }
}

#[cfg(test)]
#[path = "tests/emitter_tests.rs"]
mod tests;
