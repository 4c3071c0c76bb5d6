use tallycrab_core::config::EngineConfig;
use tallycrab_core::engine::Pipeline;
use tallycrab_core::sink::CollectingSink;
use tallycrab_core::types::RawRecord;

fn main() -> anyhow::Result<()> {
    let orders = [
        r#"{"order_id":"1","timestamp":"2025-06-19T00:32:00Z","country":"US","amount":"100.50"}"#,
        r#"{"order_id":"2","timestamp":"2025-06-19T00:32:20Z","country":"US","amount":"199.50"}"#,
        r#"{"order_id":"bad","timestamp":"2025-06-19T00:32:30Z","country":"US","amount":"n/a"}"#,
        r#"{"order_id":"3","timestamp":"2025-06-19T00:32:40Z","country":"DE","amount":"12.00"}"#,
        r#"{"order_id":"999","timestamp":"2025-06-19T00:34:00Z","country":"US","amount":"0"}"#,
    ];

    let mut pipeline = Pipeline::new(&EngineConfig::default(), CollectingSink::new())?;
    for order in orders {
        pipeline.process_record(&RawRecord::from_text(order, None))?;
    }
    // DE never saw a later event, so its window only closes on drain.
    pipeline.flush()?;

    let stats = pipeline.stats();
    for record in pipeline.into_sink().into_records() {
        println!("{} => {}", record.key, record.payload_str());
    }
    println!(
        "parsed={} rejected={} late={}",
        stats.keyer.parsed,
        stats.keyer.parse_errors + stats.keyer.unkeyable,
        stats.lane.late_dropped
    );

    Ok(())
}
