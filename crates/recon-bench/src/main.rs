use std::path::PathBuf;

use clap::Parser;

use recon_bench::config::{BenchConfig, ResolvedOutputs};
use recon_bench::logging::init_logging;
use recon_bench::replay::ReplayRunner;
use recon_core::AppInfo;
use recon_core::belief::TruncationStrategy;

/// Offline replay harness for recorded blind-chess games.
#[derive(Debug, Parser)]
#[command(
    name = "recon-bench",
    author,
    version,
    about = "Replays recorded games through both hypothesis trackers"
)]
struct Cli {
    /// Path to the YAML configuration file.
    #[arg(short, long, value_name = "FILE", default_value = "bench/replay.yaml")]
    config: PathBuf,

    /// Override the run identifier (substitutes {run_id} templates).
    #[arg(long, value_name = "RUN_ID")]
    run_id: Option<String>,

    /// Override the truncation RNG seed.
    #[arg(long, value_name = "SEED")]
    seed: Option<u64>,

    /// Cap each tracker before its opponent expansion.
    #[arg(long, value_name = "COUNT")]
    max_hypotheses: Option<usize>,

    /// Truncation strategy when the cap is exceeded (prefix or random_sample).
    #[arg(long, value_name = "STRATEGY")]
    truncation: Option<TruncationStrategy>,

    /// Record every tracker's EPD list in each frame row.
    #[arg(long)]
    record_epds: bool,

    /// Exit after validating the configuration and loading histories.
    #[arg(long)]
    validate_only: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut config = BenchConfig::from_path(&cli.config)?;

    if let Some(run_id) = cli.run_id {
        config.run_id = run_id;
    }

    if let Some(seed) = cli.seed {
        config.replay.seed = seed;
    }

    if let Some(cap) = cli.max_hypotheses {
        config.replay.max_hypotheses = Some(cap);
    }

    if let Some(strategy) = cli.truncation {
        config.replay.truncation = strategy;
    }

    if cli.record_epds {
        config.replay.record_epds = true;
    }

    config.validate()?;

    let outputs: ResolvedOutputs = config.resolved_outputs();
    let game_count = config.games.len();
    let run_id = config.run_id.clone();

    println!(
        "{} {} ({}): loaded configuration '{run_id}' with {game_count} game{}",
        AppInfo::name(),
        AppInfo::version(),
        AppInfo::codename(),
        if game_count == 1 { "" } else { "s" }
    );

    let logging_guard = init_logging(&config.logging, &outputs)?;
    let runner = ReplayRunner::new(config, outputs)?;

    if cli.validate_only {
        println!("Validation-only mode: replay skipped.");
        return Ok(());
    }

    let summary = runner.run()?;
    println!(
        "Replay complete for '{run_id}': {} games → {} frames at {}",
        summary.games_replayed,
        summary.rows_written,
        summary.jsonl_path.display()
    );
    println!("Summary table: {}", summary.summary_path.display());
    if summary.truth_lost > 0 {
        println!(
            "  {} game(s) lost the true board; see the Truth column",
            summary.truth_lost
        );
    }
    if let Some(guard) = logging_guard.as_ref() {
        println!("Trace log: {}", guard.trace_path.display());
    }

    Ok(())
}
