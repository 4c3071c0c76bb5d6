//! Input line decoding.
//!
//! A line is either a bare order object, passed to the keyer untouched, or an
//! envelope carrying the record timestamp next to the payload:
//!
//! ```text
//! {"timestamp_ms": 1750293120000, "value": "{\"order_id\":\"1\",...}"}
//! {"timestamp_ms": 1750293120000, "value": {"order_id": "1", ...}}
//! ```

use serde_json::Value;
use tallycrab_core::types::{EventTime, RawRecord};

/// Decode one input line. Blank lines yield `None`.
///
/// Anything that is not an envelope is handed through as the raw payload, so
/// malformed lines still reach the keyer and are counted there.
pub fn decode_line(line: &str) -> Option<RawRecord> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }

    match serde_json::from_str::<Value>(line) {
        Ok(Value::Object(mut fields)) if is_envelope(&fields) => {
            let timestamp = fields.get("timestamp_ms").and_then(envelope_timestamp);
            let payload = match fields.remove("value") {
                Some(Value::String(text)) => text.into_bytes(),
                Some(other) => other.to_string().into_bytes(),
                None => Vec::new(),
            };
            Some(RawRecord {
                value: payload,
                timestamp,
            })
        }
        _ => Some(RawRecord::from_text(line, None)),
    }
}

fn is_envelope(fields: &serde_json::Map<String, Value>) -> bool {
    fields.contains_key("value") && !fields.contains_key("order_id")
}

fn envelope_timestamp(value: &Value) -> Option<EventTime> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
#[path = "tests/input_tests.rs"]
mod tests;
