use super::*;
use tallycrab_core::sink::CollectingSink;
use tallycrab_core::window::TimeWindow;

fn overflow() -> EngineError {
    EngineError::Accumulation(tallycrab_core::error::AccumulationError::Overflow {
        key: "US".to_string(),
        window: TimeWindow::new(0, 60_000),
        total: Default::default(),
        amount: Default::default(),
    })
}

#[test]
fn test_keep_first_ignores_halted_refusals() {
    let mut slot = None;
    keep_first(&mut slot, Ok(()));
    assert!(slot.is_none());

    keep_first(&mut slot, Err(EngineError::Halted("earlier".to_string())));
    assert!(slot.is_none());

    keep_first(&mut slot, Err(overflow()));
    keep_first(&mut slot, Err(EngineError::Halted("overflow".to_string())));
    assert!(matches!(slot, Some(EngineError::Accumulation(_))));
}

#[test]
fn test_report_health_and_totals() {
    let lane = |index, emitted, error| LaneReport {
        index,
        stats: LaneStats {
            emitted,
            ..LaneStats::default()
        },
        error,
    };
    let mut report = JobReport {
        sink: CollectingSink::new(),
        keyer: KeyerStats::default(),
        lanes: vec![lane(0, 2, None), lane(1, 3, None)],
        sink_error: None,
    };
    assert!(report.is_healthy());
    assert_eq!(report.total_emitted(), 5);
    assert!(report.first_error().is_none());

    report.lanes.push(lane(2, 0, Some(overflow())));
    assert!(!report.is_healthy());
    assert!(report.first_error().is_some());
}

#[test]
fn test_start_rejects_invalid_config() {
    let config = EngineConfig {
        parallelism: 0,
        ..EngineConfig::default()
    };
    assert!(AggregationJob::start(&config, CollectingSink::new()).is_err());
}
