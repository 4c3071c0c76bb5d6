//! Payload parsing and group-key derivation.
//!
//! The input schema is a JSON object:
//!
//! ```json
//! {"order_id": "1", "timestamp": "2025-06-19T00:32:00Z", "country": "US", "amount": "100.50"}
//! ```
//!
//! `amount` may be a JSON string or number; either way it is read from its
//! decimal text, never through binary floating point. The grouping key is
//! `country`.

use chrono::DateTime;
use rust_decimal::Decimal;
use serde_json::{Map, Value};

use crate::error::{ParseError, Rejected};
use crate::types::{EventTime, RawRecord};

/// A parsed transaction event. Immutable once parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub id: String,
    pub timestamp: EventTime,
    pub group_key: String,
    pub amount: Decimal,
}

/// Parse one payload into an [`Event`].
///
/// `record_timestamp` is the event time supplied by the transport. When it is
/// absent the payload's own `timestamp` field is used. A payload `timestamp`
/// that is present must be valid RFC3339 either way.
///
/// A `null` country parses to an empty group key; rejecting it is the
/// [`Keyer`]'s job.
pub fn parse(payload: &[u8], record_timestamp: Option<EventTime>) -> Result<Event, ParseError> {
    let value: Value = serde_json::from_slice(payload)?;
    let Value::Object(fields) = value else {
        return Err(ParseError::Malformed("payload is not a JSON object".to_string()));
    };

    let id = order_id(&fields)?;
    let group_key = country(&fields)?;
    let amount = amount(&fields)?;
    let payload_timestamp = payload_timestamp(&fields)?;

    let timestamp = record_timestamp
        .or(payload_timestamp)
        .ok_or(ParseError::MissingField("timestamp"))?;

    Ok(Event {
        id,
        timestamp,
        group_key,
        amount,
    })
}

fn order_id(fields: &Map<String, Value>) -> Result<String, ParseError> {
    match fields.get("order_id") {
        None | Some(Value::Null) => Err(ParseError::MissingField("order_id")),
        Some(Value::String(s)) => Ok(s.clone()),
        Some(Value::Number(n)) => Ok(n.to_string()),
        Some(_) => Err(ParseError::InvalidType {
            field: "order_id",
            expected: "string",
        }),
    }
}

fn country(fields: &Map<String, Value>) -> Result<String, ParseError> {
    match fields.get("country") {
        None => Err(ParseError::MissingField("country")),
        Some(Value::Null) => Ok(String::new()),
        Some(Value::String(s)) => Ok(s.clone()),
        Some(_) => Err(ParseError::InvalidType {
            field: "country",
            expected: "string",
        }),
    }
}

fn amount(fields: &Map<String, Value>) -> Result<Decimal, ParseError> {
    let text = match fields.get("amount") {
        None | Some(Value::Null) => return Err(ParseError::MissingField("amount")),
        Some(Value::String(s)) => s.trim().to_string(),
        Some(Value::Number(n)) => n.to_string(),
        Some(other) => return Err(ParseError::InvalidAmount(other.to_string())),
    };
    parse_decimal(&text).ok_or(ParseError::InvalidAmount(text))
}

/// Parse decimal text exactly, accepting scientific notation.
pub fn parse_decimal(text: &str) -> Option<Decimal> {
    if text.is_empty() {
        return None;
    }
    Decimal::from_str_exact(text)
        .or_else(|_| Decimal::from_scientific(text))
        .ok()
}

fn payload_timestamp(fields: &Map<String, Value>) -> Result<Option<EventTime>, ParseError> {
    match fields.get("timestamp") {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => DateTime::parse_from_rfc3339(s)
            .map(|dt| Some(dt.timestamp_millis()))
            .map_err(|err| ParseError::InvalidTimestamp {
                value: s.clone(),
                reason: err.to_string(),
            }),
        Some(other) => Err(ParseError::InvalidTimestamp {
            value: other.to_string(),
            reason: "expected an RFC3339 string".to_string(),
        }),
    }
}

/// Counters kept by the [`Keyer`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KeyerStats {
    pub parsed: u64,
    pub parse_errors: u64,
    pub unkeyable: u64,
}

/// Turns raw records into keyed events, dropping and counting the ones that
/// cannot be keyed.
#[derive(Debug, Default)]
pub struct Keyer {
    stats: KeyerStats,
}

impl Keyer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse and key one record.
    ///
    /// Both rejection kinds are recoverable: the record is counted and the
    /// caller moves on to the next one.
    pub fn key(&mut self, record: &RawRecord) -> Result<Event, Rejected> {
        let event = match parse(&record.value, record.timestamp) {
            Ok(event) => event,
            Err(err) => {
                self.stats.parse_errors += 1;
                tracing::debug!(error = %err, "dropping malformed record");
                return Err(err.into());
            }
        };

        if event.group_key.is_empty() {
            self.stats.unkeyable += 1;
            tracing::debug!(order_id = %event.id, "dropping unkeyable record");
            return Err(Rejected::Unkeyable { order_id: event.id });
        }

        self.stats.parsed += 1;
        tracing::debug!(key = %event.group_key, order_id = %event.id, "consumed record");
        Ok(event)
    }

    pub fn stats(&self) -> KeyerStats {
        self.stats
    }
}

#[cfg(test)]
#[path = "tests/keyer_tests.rs"]
mod tests;
