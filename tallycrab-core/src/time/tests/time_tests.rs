use super::*;

#[test]
fn test_no_watermark_before_first_event() {
    let tracker = WatermarkTracker::new();
    assert_eq!(tracker.watermark("US"), None);
    assert_eq!(tracker.closure_bound("US"), EVENT_TIME_MIN);
    assert!(!tracker.is_closed("US", &TimeWindow::new(EVENT_TIME_MIN, EVENT_TIME_MIN + 1)));
}

#[test]
fn test_first_observation_advances() {
    let mut tracker = WatermarkTracker::new();
    assert_eq!(tracker.observe("US", 1_000), Some(Watermark::new(1_000)));
    assert_eq!(tracker.watermark("US"), Some(Watermark::new(1_000)));
}

#[test]
fn test_watermark_advances_with_max_seen() {
    let mut tracker = WatermarkTracker::new();
    tracker.observe("US", 10_000);
    assert_eq!(tracker.observe("US", 20_000), Some(Watermark::new(20_000)));
    assert_eq!(tracker.watermark("US"), Some(Watermark::new(20_000)));
}

#[test]
fn test_out_of_order_event_does_not_regress_watermark() {
    let mut tracker = WatermarkTracker::new();
    tracker.observe("US", 20_000);
    assert_eq!(tracker.observe("US", 5_000), None); // older than max seen
    assert_eq!(tracker.observe("US", 20_000), None); // equal: unchanged
    assert_eq!(tracker.watermark("US"), Some(Watermark::new(20_000)));
}

#[test]
fn test_watermarks_are_per_key() {
    let mut tracker = WatermarkTracker::new();
    tracker.observe("US", 200_000);
    tracker.observe("DE", 10_000);

    let window = TimeWindow::new(60_000, 120_000);
    assert!(tracker.is_closed("US", &window));
    assert!(!tracker.is_closed("DE", &window));
    assert!(!tracker.is_closed("FR", &window));
    assert_eq!(tracker.key_count(), 2);
}

#[test]
fn test_window_closes_exactly_at_end() {
    let mut tracker = WatermarkTracker::new();
    let window = TimeWindow::new(0, 60_000);

    tracker.observe("US", 59_999);
    assert!(!tracker.is_closed("US", &window));
    tracker.observe("US", 60_000);
    assert!(tracker.is_closed("US", &window));
}

#[test]
fn test_grace_delays_closure() {
    let mut tracker = WatermarkTracker::with_grace(Duration::from_secs(5));
    let window = TimeWindow::new(0, 60_000);

    tracker.observe("US", 64_999);
    assert!(!tracker.is_closed("US", &window));
    assert_eq!(tracker.closure_bound("US"), 59_999);
    tracker.observe("US", 65_000);
    assert!(tracker.is_closed("US", &window));
    assert_eq!(tracker.grace_ms(), 5_000);
}
