use super::*;

#[test]
fn test_raw_record_from_text() {
    let rec = RawRecord::from_text("{}", Some(7));
    assert_eq!(rec.value, b"{}".to_vec());
    assert_eq!(rec.timestamp, Some(7));
}

#[test]
fn test_watermark_ordering_and_display() {
    assert!(Watermark::new(1) < Watermark::new(2));
    assert_eq!(Watermark::new(42_000).to_string(), "Watermark(42000ms)");
}
