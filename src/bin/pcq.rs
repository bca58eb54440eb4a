//! pcq CLI: feeds CSV records or ad-hoc payloads through the dual-lane queue.

use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand};
use pcq::config::Config;
use pcq::handler::{ConsoleSink, Dispatcher, FileSink};
use pcq::input::Record;
use pcq::model::{LaneKind, QueueItem, QueueResponse};
use pcq::pacing::{Pacer, submit_paced};
use pcq::queue::DualLaneQueue;
use pcq::shutdown::ShutdownTimer;
use pcq::telemetry::{TelemetryConfig, TelemetryGuard, init_telemetry};
use tracing::{error, info, warn};

type ItemQueue = DualLaneQueue<QueueItem, QueueResponse>;

#[derive(Parser)]
#[command(name = "pcq", about = "Dual-lane producer/consumer queue")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Load a CSV of `type,payload` records and process them
    Run(RunArgs),
    /// Submit payloads to one lane and print each outcome
    Send {
        /// Lane to submit to (file or console)
        #[arg(long)]
        lane: LaneKind,
        /// File that file-lane items are appended to
        #[arg(long)]
        output: Option<PathBuf>,
        /// Payloads, one item each
        #[arg(required = true)]
        payloads: Vec<String>,
    },
}

#[derive(Args)]
struct RunArgs {
    /// CSV input file (overrides PCQ_INPUT_CSV)
    #[arg(long)]
    input: Option<PathBuf>,
    /// Output file for file-lane items (overrides PCQ_OUTPUT_FILE)
    #[arg(long)]
    output: Option<PathBuf>,
    /// Submissions per second, 0 for unlimited (overrides PCQ_MAX_PER_SECOND)
    #[arg(long)]
    max_per_second: Option<u32>,
    /// Stop after this many seconds, 0 to disable (overrides PCQ_SHUTDOWN_AFTER_SECS)
    #[arg(long)]
    shutdown_after: Option<u64>,
    /// Skip the confirmation prompt
    #[arg(long, short)]
    yes: bool,
}

#[derive(Debug, Default)]
struct Summary {
    resolved: usize,
    failed: usize,
}

enum RunEnd {
    Finished(Summary),
    TimerElapsed,
    Interrupted,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    let mut config = Config::from_env()?;

    match cli.command {
        Command::Run(args) => {
            if let Some(input) = args.input {
                config.input_csv = Some(input);
            }
            if let Some(output) = args.output {
                config.output_file = output;
            }
            if let Some(max) = args.max_per_second {
                config.max_per_second = max;
            }
            if let Some(secs) = args.shutdown_after {
                config.shutdown_after_secs = secs;
            }
            let _guard = telemetry(&config)?;
            cmd_run(config, args.yes).await
        }
        Command::Send {
            lane,
            output,
            payloads,
        } => {
            if let Some(output) = output {
                config.output_file = output;
            }
            let _guard = telemetry(&config)?;
            cmd_send(config, lane, payloads).await
        }
    }
}

fn telemetry(config: &Config) -> anyhow::Result<TelemetryGuard> {
    Ok(init_telemetry(TelemetryConfig {
        endpoint: config.otel_endpoint.clone(),
        service_name: "pcq".to_string(),
        log_level: config.log_level.clone(),
    })?)
}

fn build_queue(config: &Config) -> anyhow::Result<ItemQueue> {
    let dispatcher = Dispatcher::new(FileSink::new(&config.output_file), ConsoleSink::stdout());
    info!(output = %config.output_file.display(), "file lane target");
    Ok(DualLaneQueue::new(move |item: QueueItem| dispatcher.process(item))?)
}

async fn cmd_run(config: Config, yes: bool) -> anyhow::Result<()> {
    let input = config
        .input_csv
        .clone()
        .context("no input CSV: pass --input or set PCQ_INPUT_CSV")?;

    // The timer covers the prompt too, so an unattended run still exits.
    let timer = ShutdownTimer::start(config.shutdown_after_secs);
    if timer.is_enabled() {
        println!(
            "Application will shut down in {} seconds.",
            config.shutdown_after_secs
        );
    }

    let records = pcq::input::read_records(&input)?;
    println!("Total records: {}", records.len());
    if records.is_empty() {
        return Ok(());
    }

    if !yes {
        let answer = tokio::select! {
            answer = timer.guard(pcq::prompt::confirm_stdin()) => answer,
            _ = tokio::signal::ctrl_c() => return finish(None, RunEnd::Interrupted).await,
        };
        match answer {
            None => return finish(None, RunEnd::TimerElapsed).await,
            Some(Ok(true)) => {}
            Some(Ok(false)) => {
                println!("Aborted.");
                return Ok(());
            }
            Some(Err(e)) => return Err(e.into()),
        }
    }

    let queue = build_queue(&config)?;
    let end = {
        let run = submit_and_wait(&queue, records, config.max_per_second);
        tokio::select! {
            summary = timer.guard(run) => match summary {
                Some(summary) => RunEnd::Finished(summary),
                None => RunEnd::TimerElapsed,
            },
            _ = tokio::signal::ctrl_c() => RunEnd::Interrupted,
        }
    };
    finish(Some(queue), end).await
}

async fn finish(queue: Option<ItemQueue>, end: RunEnd) -> anyhow::Result<()> {
    match end {
        RunEnd::Finished(summary) => {
            info!(
                resolved = summary.resolved,
                failed = summary.failed,
                "all records processed"
            );
            if let Some(queue) = queue {
                tokio::task::spawn_blocking(move || queue.shutdown()).await??;
            }
            if summary.failed > 0 {
                anyhow::bail!(
                    "{} of {} records failed",
                    summary.failed,
                    summary.resolved + summary.failed
                );
            }
        }
        RunEnd::TimerElapsed => {
            match &queue {
                Some(queue) => warn!(
                    file_pending = queue.pending(LaneKind::File),
                    console_pending = queue.pending(LaneKind::Console),
                    "shutdown timer elapsed"
                ),
                None => warn!("shutdown timer elapsed before confirmation"),
            }
            println!("Exiting");
        }
        RunEnd::Interrupted => {
            warn!("interrupted");
            println!("Exiting");
        }
    }
    Ok(())
}

/// Pace records into the queue, then wait on every completion.
async fn submit_and_wait(queue: &ItemQueue, records: Vec<Record>, max_per_second: u32) -> Summary {
    let mut pacer = Pacer::per_second(max_per_second);
    let completions = submit_paced(queue, records, &mut pacer).await;

    let mut summary = Summary::default();
    for completion in completions {
        match completion.wait().await {
            Ok(_) => summary.resolved += 1,
            Err(e) => {
                error!(ticket = %completion.id(), error = %e, "record failed");
                summary.failed += 1;
            }
        }
    }
    summary
}

async fn cmd_send(config: Config, lane: LaneKind, payloads: Vec<String>) -> anyhow::Result<()> {
    let queue = build_queue(&config)?;

    let completions: Vec<_> = payloads
        .into_iter()
        .map(|payload| queue.submit(lane, QueueItem::for_lane(lane, payload)))
        .collect();

    let mut failed = 0;
    for completion in completions {
        match completion.wait().await {
            Ok(QueueResponse::File(written)) => {
                eprintln!("{}: appended {} bytes", completion.id(), written.bytes)
            }
            Ok(QueueResponse::Console(_)) => eprintln!("{}: written to console", completion.id()),
            Err(e) => {
                eprintln!("{}: {e}", completion.id());
                failed += 1;
            }
        }
    }

    tokio::task::spawn_blocking(move || queue.shutdown()).await??;
    if failed > 0 {
        anyhow::bail!("{failed} item(s) failed");
    }
    Ok(())
}
