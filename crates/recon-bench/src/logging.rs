//! Replay trace output.
//!
//! A structured run writes every tracker and replay event (`recon_core::tracker`,
//! `recon_bot::*`, `recon_bench::replay`) as one JSON object per line into
//! `trace.jsonl`, next to the Markdown summary. The per-frame rows in
//! `frames.jsonl` are written separately by the runner.

use std::fs::{self, File};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::Level;
use tracing_appender::non_blocking::{self, WorkerGuard};
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::{EnvFilter, fmt};

use crate::config::{LoggingConfig, ResolvedOutputs};

/// Holds the trace writer open until the last replayed game has been flushed.
pub struct LoggingGuard {
    _guard: WorkerGuard,
    pub trace_path: PathBuf,
}

/// Installs the JSON subscriber for a replay run, or does nothing when structured
/// logging is switched off. `RUST_LOG` overrides the configured level.
pub fn init_logging(
    logging: &LoggingConfig,
    outputs: &ResolvedOutputs,
) -> Result<Option<LoggingGuard>> {
    if !logging.enable_structured {
        return Ok(None);
    }

    let trace_path = trace_path_for(outputs);
    if let Some(dir) = trace_path.parent() {
        fs::create_dir_all(dir)
            .with_context(|| format!("creating trace directory at {}", dir.display()))?;
    }
    let file = File::create(&trace_path)
        .with_context(|| format!("creating trace file at {}", trace_path.display()))?;

    let (writer, guard) = non_blocking::NonBlockingBuilder::default()
        .lossy(false)
        .finish(file);

    let level = logging.level().unwrap_or(Level::INFO);
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_str()));

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(filter)
        .json()
        .with_current_span(false)
        .with_span_events(FmtSpan::NONE)
        .with_writer(writer)
        .finish();

    // A subscriber may already be installed when running under tests.
    let _ = tracing::subscriber::set_global_default(subscriber);

    Ok(Some(LoggingGuard {
        _guard: guard,
        trace_path,
    }))
}

/// `trace.jsonl` in the summary's directory, or in the working directory when the
/// summary path is bare.
pub fn trace_path_for(outputs: &ResolvedOutputs) -> PathBuf {
    outputs
        .summary_md
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."))
        .join("trace.jsonl")
}
