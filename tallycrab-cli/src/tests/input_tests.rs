use super::*;

const ORDER: &str =
    r#"{"order_id":"1","timestamp":"2025-06-19T00:32:00Z","country":"US","amount":"100.50"}"#;

#[test]
fn test_blank_lines_skipped() {
    assert!(decode_line("").is_none());
    assert!(decode_line("   \t").is_none());
}

#[test]
fn test_bare_order_passed_through() {
    let record = decode_line(ORDER).unwrap();
    assert_eq!(record.value, ORDER.as_bytes());
    assert_eq!(record.timestamp, None);
}

#[test]
fn test_envelope_with_string_value() {
    let line = serde_json::json!({ "timestamp_ms": 1_750_293_120_000i64, "value": ORDER }).to_string();
    let record = decode_line(&line).unwrap();
    assert_eq!(record.value, ORDER.as_bytes());
    assert_eq!(record.timestamp, Some(1_750_293_120_000));
}

#[test]
fn test_envelope_with_object_value() {
    let line = r#"{"timestamp_ms":42,"value":{"order_id":"7","country":"DE","amount":1}}"#;
    let record = decode_line(line).unwrap();
    let value: serde_json::Value = serde_json::from_slice(&record.value).unwrap();
    assert_eq!(value["country"], "DE");
    assert_eq!(record.timestamp, Some(42));
}

#[test]
fn test_envelope_without_timestamp() {
    let record = decode_line(r#"{"value":"x"}"#).unwrap();
    assert_eq!(record.value, b"x");
    assert_eq!(record.timestamp, None);
}

#[test]
fn test_malformed_line_reaches_keyer() {
    let record = decode_line("{oops").unwrap();
    assert_eq!(record.value, b"{oops");
}
