//! Four lanes over a synthetic multi-country order stream.

use tallycrab_api::AggregationJob;
use tallycrab_core::config::EngineConfig;
use tallycrab_core::sink::CollectingSink;
use tallycrab_core::types::RawRecord;

const COUNTRIES: [&str; 6] = ["US", "DE", "FR", "JP", "BR", "IN"];

fn lcg_next(state: &mut u64) -> u64 {
    *state = state.wrapping_mul(6364136223846793005).wrapping_add(1);
    *state >> 33
}

fn main() -> anyhow::Result<()> {
    let config = EngineConfig {
        parallelism: 4,
        ..EngineConfig::default()
    };
    let mut job = AggregationJob::start(&config, CollectingSink::new())?;

    // 2025-06-19T00:32:00Z
    let mut ts: i64 = 1_750_293_120_000;
    let mut state = 0xC0FFEE;
    for id in 0..5_000 {
        ts += (lcg_next(&mut state) % 200) as i64;
        let country = COUNTRIES[(lcg_next(&mut state) % COUNTRIES.len() as u64) as usize];
        let cents = lcg_next(&mut state) % 50_000;
        let payload = format!(
            r#"{{"order_id":"{id}","country":"{country}","amount":"{}.{:02}"}}"#,
            cents / 100,
            cents % 100
        );
        job.submit(RawRecord::from_text(payload, Some(ts)))?;
    }

    let report = job.finish(true)?;
    let mut records = report.sink.records().to_vec();
    records.sort_by(|a, b| a.payload.cmp(&b.payload));
    for record in &records {
        println!("{}", record.payload_str());
    }
    for lane in &report.lanes {
        println!(
            "lane {}: accumulated={} emitted={}",
            lane.index, lane.stats.accumulated, lane.stats.emitted
        );
    }
    if let Some(err) = report.first_error() {
        anyhow::bail!("lane halted: {err}");
    }
    Ok(())
}
