//! Error taxonomy for the aggregation engine.
//!
//! Two classes of failure exist:
//!
//! - Recoverable, per-record: [`ParseError`] and unkeyable records. The record
//!   is dropped, counted, and processing continues.
//! - Fatal, per-lane: [`AccumulationError`] and [`EmissionError`]. The lane
//!   stops accepting input and the error is surfaced to the caller as an
//!   [`EngineError`].

use rust_decimal::Decimal;

use crate::window::TimeWindow;

/// A payload that does not conform to the order schema.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    /// The payload is not a JSON object.
    #[error("malformed payload: {0}")]
    Malformed(String),

    /// A required field is absent.
    #[error("missing field `{0}`")]
    MissingField(&'static str),

    /// A field is present but has the wrong JSON type.
    #[error("field `{field}` has invalid type: expected {expected}")]
    InvalidType {
        field: &'static str,
        expected: &'static str,
    },

    /// The amount is not a decimal number.
    #[error("non-numeric amount `{0}`")]
    InvalidAmount(String),

    /// The payload timestamp is not an RFC3339 instant.
    #[error("invalid timestamp `{value}`: {reason}")]
    InvalidTimestamp { value: String, reason: String },
}

impl From<serde_json::Error> for ParseError {
    fn from(err: serde_json::Error) -> Self {
        ParseError::Malformed(err.to_string())
    }
}

/// A record rejected by the keyer before it reaches the store.
#[derive(Debug, thiserror::Error)]
pub enum Rejected {
    #[error(transparent)]
    Malformed(#[from] ParseError),

    /// Parsed successfully but the derived key is empty.
    #[error("unkeyable record (order `{order_id}`)")]
    Unkeyable { order_id: String },
}

/// Adding an amount to a running total failed.
#[derive(Debug, thiserror::Error)]
pub enum AccumulationError {
    #[error("decimal overflow adding {amount} to {total} for key `{key}` in {window}")]
    Overflow {
        key: String,
        window: TimeWindow,
        total: Decimal,
        amount: Decimal,
    },

    /// The sum needs more than the 96-bit decimal mantissa and would be
    /// rounded.
    #[error("adding {amount} to {total} for key `{key}` in {window} loses precision")]
    Inexact {
        key: String,
        window: TimeWindow,
        total: Decimal,
        amount: Decimal,
    },
}

/// A closed window could not be turned into a published result.
#[derive(Debug, thiserror::Error)]
pub enum EmissionError {
    /// The window start cannot be represented as a calendar time.
    #[error("window start {0}ms is out of the displayable range")]
    Label(i64),

    #[error("failed to serialize result for key `{key}`: {source}")]
    Serialize {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to publish result for key `{key}`: {reason}")]
    Publish { key: String, reason: String },
}

/// Invalid engine configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid config value for `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },

    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Toml(#[from] toml::de::Error),
}

impl ConfigError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        ConfigError::Invalid {
            field,
            reason: reason.into(),
        }
    }
}

/// A fatal error that halts one processing lane.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error(transparent)]
    Accumulation(#[from] AccumulationError),

    #[error(transparent)]
    Emission(#[from] EmissionError),

    /// The lane already failed and refuses further input.
    #[error("lane halted after fatal error: {0}")]
    Halted(String),
}
