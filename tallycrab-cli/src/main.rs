use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use clap::{Args, Parser, Subcommand};
use tallycrab_api::{AggregationJob, JobReport};
use tallycrab_core::config::EngineConfig;
use tallycrab_core::sink::JsonLinesSink;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod input;

#[derive(Parser, Debug)]
#[command(name = "tallycrab")]
#[command(about = "Windowed per-key totals over JSON-lines order streams", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Aggregate an input stream until EOF or Ctrl-C.
    Run(RunArgs),
}

#[derive(Args, Debug)]
struct RunArgs {
    /// Input file, `-` or absent for stdin.
    #[arg(long)]
    input: Option<PathBuf>,
    /// Output file, `-` or absent for stdout.
    #[arg(long)]
    output: Option<PathBuf>,
    /// TOML engine config.
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    window_size_ms: Option<u64>,
    #[arg(long)]
    grace_ms: Option<u64>,
    /// Fixed UTC offset for window labels, e.g. `-05:00`.
    #[arg(long)]
    display_offset: Option<String>,
    #[arg(long)]
    parallelism: Option<usize>,
    /// Discard open windows at shutdown instead of emitting them.
    #[arg(long)]
    no_drain: bool,
}

impl RunArgs {
    fn engine_config(&self) -> anyhow::Result<EngineConfig> {
        let mut config = match &self.config {
            Some(path) => EngineConfig::load(path)
                .with_context(|| format!("failed to load config {}", path.display()))?,
            None => EngineConfig::default(),
        };
        if let Some(window_size_ms) = self.window_size_ms {
            config.window_size_ms = window_size_ms;
        }
        if let Some(grace_ms) = self.grace_ms {
            config.grace_ms = grace_ms;
        }
        if let Some(offset) = &self.display_offset {
            config.display_offset = offset.clone();
        }
        if let Some(parallelism) = self.parallelism {
            config.parallelism = parallelism;
        }
        config.validate().context("invalid engine configuration")?;
        Ok(config)
    }
}

type OutputSink = JsonLinesSink<Box<dyn Write + Send>>;

/// `None` for stdio (`-` or absent), otherwise the file path.
fn file_path(path: Option<&Path>) -> Option<&Path> {
    path.filter(|p| *p != Path::new("-"))
}

fn open_output(path: Option<&Path>) -> anyhow::Result<OutputSink> {
    let writer: Box<dyn Write + Send> = match file_path(path) {
        None => Box::new(BufWriter::new(std::io::stdout())),
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("failed to create output {}", path.display()))?;
            Box::new(BufWriter::new(file))
        }
    };
    Ok(JsonLinesSink::new(writer))
}

async fn open_input(path: Option<&Path>) -> anyhow::Result<Box<dyn AsyncRead + Unpin + Send>> {
    let Some(path) = file_path(path) else {
        return Ok(Box::new(tokio::io::stdin()));
    };
    let file = tokio::fs::File::open(path)
        .await
        .with_context(|| format!("failed to open input {}", path.display()))?;
    Ok(Box::new(file))
}

async fn run(args: RunArgs) -> anyhow::Result<()> {
    let config = args.engine_config()?;
    let sink = open_output(args.output.as_deref())?;
    let reader = open_input(args.input.as_deref()).await?;
    let mut job = AggregationJob::start(&config, sink)?;

    let mut lines = BufReader::new(reader).lines();
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    let mut line_count: u64 = 0;
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.context("failed to read input")? else {
                    tracing::info!(lines = line_count, "end of input");
                    break;
                };
                line_count += 1;
                if let Some(record) = input::decode_line(&line) {
                    // Lane channels are bounded; submit may block under backpressure.
                    tokio::task::block_in_place(|| job.submit(record))?;
                }
            }
            _ = &mut shutdown => {
                tracing::warn!(lines = line_count, "interrupted, shutting down");
                break;
            }
        }
    }

    let drain = !args.no_drain;
    let report = tokio::task::block_in_place(|| job.finish(drain))?;
    summarize(&report)
}

fn summarize<S>(report: &JobReport<S>) -> anyhow::Result<()> {
    for lane in &report.lanes {
        if let Some(err) = &lane.error {
            tracing::error!(lane = lane.index, error = %err, "lane halted");
        }
    }
    if let Some(err) = &report.sink_error {
        tracing::error!(error = %err, "output failed");
    }

    let totals = report.lane_totals();
    tracing::info!(
        parsed = report.keyer.parsed,
        parse_errors = report.keyer.parse_errors,
        unkeyable = report.keyer.unkeyable,
        late_dropped = totals.late_dropped,
        emitted = totals.emitted,
        discarded = totals.discarded,
        lost = totals.lost,
        "run summary"
    );

    if !report.is_healthy() {
        bail!("aggregation stopped on a fatal error");
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Results go to stdout, logs to stderr.
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Run(args) => run(args).await,
    }
}
