//! Scenario runner
//!
//! Replays a scenario JSON against the traffic-category scheduler and prints
//! what every drive loop dispatched.

use clap::Parser;
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;
use txsched_rs::sim::{Scenario, run_scenario};

#[derive(Debug, Parser)]
#[command(
    name = "txsched-sim",
    about = "Replay a scenario.json against the traffic-category scheduler"
)]
struct Args {
    /// Path to scenario.json
    #[arg(long)]
    scenario: PathBuf,

    /// Write the full report as JSON to this file
    #[arg(long)]
    summary_json: Option<PathBuf>,

    /// Override dispatcher cost: bytes per credit unit (0 = one credit per frame)
    #[arg(long)]
    bytes_per_credit: Option<u32>,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_file(true)
        .with_line_number(true)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let raw = match fs::read_to_string(&args.scenario) {
        Ok(raw) => raw,
        Err(e) => {
            eprintln!("failed to read {}: {e}", args.scenario.display());
            return ExitCode::FAILURE;
        }
    };
    let mut scenario = match Scenario::from_json(&raw) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("invalid scenario: {e}");
            return ExitCode::FAILURE;
        }
    };
    if let Some(n) = args.bytes_per_credit {
        let spec = scenario.dispatcher.get_or_insert_with(Default::default);
        spec.bytes_per_credit = (n > 0).then_some(n);
    }

    let report = match run_scenario(&scenario) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("scenario failed: {e}");
            return ExitCode::FAILURE;
        }
    };

    for run in &report.runs {
        let cats: Vec<String> = run
            .per_category
            .iter()
            .map(|(k, n)| format!("{k}={n}"))
            .collect();
        println!(
            "run step={} credit={} frames={} {}",
            run.step,
            run.credit,
            run.frames,
            cats.join(" ")
        );
    }
    for d in &report.discards {
        println!(
            "discard step={} requested={} discarded={}",
            d.step, d.requested, d.discarded
        );
    }
    println!(
        "pending frames={} dispatched={} discarded={}",
        report.pending_frames, report.stats.dispatched_frames, report.stats.discarded_frames
    );

    if let Some(path) = args.summary_json {
        let out = match serde_json::to_string_pretty(&report) {
            Ok(s) => s,
            Err(e) => {
                eprintln!("failed to encode report: {e}");
                return ExitCode::FAILURE;
            }
        };
        if let Err(e) = fs::write(&path, out) {
            eprintln!("failed to write {}: {e}", path.display());
            return ExitCode::FAILURE;
        }
    }
    ExitCode::SUCCESS
}
