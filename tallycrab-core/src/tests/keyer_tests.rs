use super::*;

fn order(country: &str, amount: &str) -> String {
    format!(
        r#"{{"order_id":"1","timestamp":"2025-06-19T00:32:00Z","country":"{country}","amount":{amount}}}"#
    )
}

fn parse_order(payload: &str) -> Result<Event, ParseError> {
    parse(payload.as_bytes(), None)
}

#[test]
fn test_parse_valid_order() {
    let event = parse_order(&order("US", r#""100.50""#)).unwrap();
    assert_eq!(event.id, "1");
    assert_eq!(event.group_key, "US");
    assert_eq!(event.amount, Decimal::new(10050, 2));
    assert_eq!(event.timestamp, 1_750_293_120_000);
}

#[test]
fn test_parse_numeric_amount_is_exact() {
    let event = parse_order(&order("US", "0.1")).unwrap();
    assert_eq!(event.amount, Decimal::new(1, 1));
    assert_eq!(event.amount.to_string(), "0.1");
}

#[test]
fn test_parse_keeps_amount_scale() {
    let event = parse_order(&order("US", r#""199.50""#)).unwrap();
    assert_eq!(event.amount.to_string(), "199.50");
}

#[test]
fn test_parse_negative_and_zero_amounts() {
    let neg = parse_order(&order("US", r#""-12.25""#)).unwrap();
    assert_eq!(neg.amount, Decimal::new(-1225, 2));
    let zero = parse_order(&order("US", "0")).unwrap();
    assert!(zero.amount.is_zero());
}

#[test]
fn test_parse_scientific_amount() {
    let event = parse_order(&order("US", r#""1.5e2""#)).unwrap();
    assert_eq!(event.amount, Decimal::new(150, 0));
}

#[test]
fn test_record_timestamp_takes_precedence() {
    let payload = order("US", "1");
    let event = parse(payload.as_bytes(), Some(42)).unwrap();
    assert_eq!(event.timestamp, 42);
}

#[test]
fn test_record_timestamp_without_payload_timestamp() {
    let payload = br#"{"order_id":"7","country":"DE","amount":"3"}"#;
    let event = parse(payload, Some(1_000)).unwrap();
    assert_eq!(event.timestamp, 1_000);
    assert!(matches!(
        parse(payload, None),
        Err(ParseError::MissingField("timestamp"))
    ));
}

#[test]
fn test_numeric_order_id() {
    let payload = br#"{"order_id":17,"country":"DE","amount":"3"}"#;
    assert_eq!(parse(payload, Some(0)).unwrap().id, "17");
}

#[test]
fn test_unknown_fields_ignored() {
    let payload = br#"{"order_id":"1","country":"FR","amount":"2","currency":"EUR"}"#;
    assert_eq!(parse(payload, Some(0)).unwrap().group_key, "FR");
}

#[test]
fn test_parse_rejects_non_numeric_amount() {
    let err = parse_order(&order("US", r#""abc""#)).unwrap_err();
    assert!(matches!(err, ParseError::InvalidAmount(ref s) if s == "abc"));

    let err = parse_order(&order("US", r#""""#)).unwrap_err();
    assert!(matches!(err, ParseError::InvalidAmount(_)));

    let err = parse_order(&order("US", "true")).unwrap_err();
    assert!(matches!(err, ParseError::InvalidAmount(_)));
}

#[test]
fn test_parse_rejects_missing_fields() {
    let no_country = br#"{"order_id":"1","amount":"1"}"#;
    assert!(matches!(
        parse(no_country, Some(0)),
        Err(ParseError::MissingField("country"))
    ));

    let no_amount = br#"{"order_id":"1","country":"US"}"#;
    assert!(matches!(
        parse(no_amount, Some(0)),
        Err(ParseError::MissingField("amount"))
    ));

    let no_id = br#"{"country":"US","amount":"1"}"#;
    assert!(matches!(
        parse(no_id, Some(0)),
        Err(ParseError::MissingField("order_id"))
    ));
}

#[test]
fn test_parse_rejects_bad_timestamp() {
    let payload = br#"{"order_id":"1","timestamp":"yesterday","country":"US","amount":"1"}"#;
    assert!(matches!(
        parse(payload, None),
        Err(ParseError::InvalidTimestamp { .. })
    ));
    // Also rejected when the transport supplies the event time.
    assert!(parse(payload, Some(0)).is_err());
}

#[test]
fn test_parse_rejects_non_object() {
    assert!(matches!(parse(b"not json", None), Err(ParseError::Malformed(_))));
    assert!(matches!(parse(b"[1,2]", None), Err(ParseError::Malformed(_))));
    assert!(matches!(
        parse(br#"{"order_id":"1","country":5,"amount":"1"}"#, Some(0)),
        Err(ParseError::InvalidType {
            field: "country",
            ..
        })
    ));
}

#[test]
fn test_null_country_parses_to_empty_key() {
    let payload = br#"{"order_id":"1","country":null,"amount":"1"}"#;
    assert_eq!(parse(payload, Some(0)).unwrap().group_key, "");
}

#[test]
fn test_keyer_counts_outcomes() {
    let mut keyer = Keyer::new();

    let good = RawRecord::from_text(order("US", r#""1""#), None);
    let bad = RawRecord::from_text(order("US", r#""one""#), None);
    let empty = RawRecord::from_text(order("", r#""1""#), None);
    let null = RawRecord::from_text(r#"{"order_id":"9","country":null,"amount":"1"}"#, Some(0));

    assert_eq!(keyer.key(&good).unwrap().group_key, "US");
    assert!(matches!(keyer.key(&bad), Err(Rejected::Malformed(_))));
    assert!(matches!(keyer.key(&empty), Err(Rejected::Unkeyable { .. })));
    assert!(matches!(
        keyer.key(&null),
        Err(Rejected::Unkeyable { ref order_id }) if order_id == "9"
    ));

    assert_eq!(
        keyer.stats(),
        KeyerStats {
            parsed: 1,
            parse_errors: 1,
            unkeyable: 2,
        }
    );
}

#[test]
fn test_whitespace_country_is_a_key() {
    let mut keyer = Keyer::new();
    let blank = RawRecord::from_text(order(" ", r#""1""#), None);
    assert_eq!(keyer.key(&blank).unwrap().group_key, " ");
    assert_eq!(keyer.stats().unkeyable, 0);
}
