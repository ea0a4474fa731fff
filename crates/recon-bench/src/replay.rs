use std::fmt::Write as _;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

use recon_core::history::{ActionKind, GameRecord, Replay, ReplayFrame, WinReason};
use recon_core::model::color::{Color, ColorExt, by_label};
use serde::Serialize;
use thiserror::Error;
use tracing::{Level, event};

use crate::config::{BenchConfig, GameSourceError, ResolvedOutputs};

/// Replays every configured game and writes per-frame rows plus a summary table.
pub struct ReplayRunner {
    config: BenchConfig,
    outputs: ResolvedOutputs,
    games: Vec<(String, GameRecord)>,
}

/// Summary details returned after a run.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub games_replayed: usize,
    pub rows_written: usize,
    /// Games in which either tracker dropped the true board.
    pub truth_lost: usize,
    pub games: Vec<GameSummary>,
    pub jsonl_path: PathBuf,
    pub summary_path: PathBuf,
}

/// Per-game statistics shown in the Markdown table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GameSummary {
    pub name: String,
    pub actions: usize,
    pub moves: usize,
    pub frames: usize,
    #[serde(with = "by_label")]
    pub winner: Color,
    pub win_reason: WinReason,
    pub final_epd: String,
    /// Largest hypothesis count seen, indexed by [`ColorExt::slot`].
    pub peak_hypotheses: [usize; 2],
    pub mean_hypotheses: [f64; 2],
    /// First frame at which a tracker no longer held the true board.
    pub truth_lost_at: Option<usize>,
    pub elapsed_ms: f64,
}

#[derive(Serialize)]
struct FrameRow<'a> {
    run_id: &'a str,
    game: &'a str,
    #[serde(flatten)]
    frame: &'a ReplayFrame,
}

impl ReplayRunner {
    /// Loads every game's history up front so bad sources fail before any output.
    pub fn new(config: BenchConfig, outputs: ResolvedOutputs) -> Result<Self, RunnerError> {
        let games = config
            .games
            .iter()
            .map(|game| Ok((game.name.clone(), game.load()?)))
            .collect::<Result<Vec<_>, RunnerError>>()?;
        Ok(Self {
            config,
            outputs,
            games,
        })
    }

    pub fn game_count(&self) -> usize {
        self.games.len()
    }

    pub fn run(&self) -> Result<RunSummary, RunnerError> {
        ensure_parent(self.outputs.jsonl.parent())?;
        ensure_parent(self.outputs.summary_md.parent())?;

        let mut writer = BufWriter::new(File::create(&self.outputs.jsonl)?);
        let mut rows_written = 0usize;
        let mut summaries = Vec::with_capacity(self.games.len());

        for (name, record) in &self.games {
            let started = Instant::now();
            let replay = Replay::run(record, self.config.replay.clone());
            let elapsed_ms = started.elapsed().as_secs_f64() * 1_000.0;

            for frame in &replay.frames {
                let row = FrameRow {
                    run_id: &self.config.run_id,
                    game: name,
                    frame,
                };
                serde_json::to_writer(&mut writer, &row)?;
                writer.write_all(b"\n")?;
                rows_written += 1;
            }

            let summary = summarize(name, record, &replay, elapsed_ms);
            event!(
                target: "recon_bench::replay",
                Level::INFO,
                game = name.as_str(),
                frames = summary.frames,
                winner = summary.winner.label(),
                peak_white = summary.peak_hypotheses[Color::White.slot()],
                peak_black = summary.peak_hypotheses[Color::Black.slot()],
                truth_lost_at = summary.truth_lost_at,
                elapsed_ms = summary.elapsed_ms,
                "game replayed"
            );
            if let Some(index) = summary.truth_lost_at {
                tracing::warn!(
                    target: "recon_bench::replay",
                    game = name.as_str(),
                    index,
                    message = "tracker lost the true board"
                );
            }
            summaries.push(summary);
        }

        writer.flush()?;
        write_markdown(&self.outputs.summary_md, &self.config, &summaries)?;

        Ok(RunSummary {
            games_replayed: summaries.len(),
            rows_written,
            truth_lost: summaries
                .iter()
                .filter(|summary| summary.truth_lost_at.is_some())
                .count(),
            games: summaries,
            jsonl_path: self.outputs.jsonl.clone(),
            summary_path: self.outputs.summary_md.clone(),
        })
    }
}

fn ensure_parent(path: Option<&Path>) -> Result<(), RunnerError> {
    if let Some(dir) = path.filter(|dir| !dir.as_os_str().is_empty()) {
        fs::create_dir_all(dir)?;
    }
    Ok(())
}

fn summarize(name: &str, record: &GameRecord, replay: &Replay, elapsed_ms: f64) -> GameSummary {
    let mut peak = [0usize; 2];
    let mut totals = [0usize; 2];
    for frame in &replay.frames {
        for side in 0..2 {
            peak[side] = peak[side].max(frame.hypotheses[side]);
            totals[side] += frame.hypotheses[side];
        }
    }
    let frames = replay.frames.len();
    let mean = |total: usize| {
        if frames == 0 {
            0.0
        } else {
            total as f64 / frames as f64
        }
    };

    GameSummary {
        name: name.to_string(),
        actions: record.num_actions(),
        moves: replay
            .frames
            .iter()
            .filter(|frame| frame.kind == ActionKind::Move)
            .count(),
        frames,
        winner: replay.winner,
        win_reason: replay.win_reason,
        final_epd: replay.final_epd.clone(),
        peak_hypotheses: peak,
        mean_hypotheses: [mean(totals[0]), mean(totals[1])],
        truth_lost_at: replay
            .frames
            .iter()
            .find(|frame| !frame.holds_truth.iter().all(|held| *held))
            .map(|frame| frame.index),
        elapsed_ms,
    }
}

fn write_markdown(
    path: &Path,
    config: &BenchConfig,
    games: &[GameSummary],
) -> Result<(), RunnerError> {
    let mut out = String::new();
    out.push_str("# Replay Summary\n\n");
    let _ = writeln!(out, "Run: `{}`", config.run_id);
    let cap = config
        .replay
        .max_hypotheses
        .map_or_else(|| "none".to_string(), |cap| cap.to_string());
    let _ = writeln!(
        out,
        "Hypothesis cap: {cap} ({}), seed {}\n",
        config.replay.truncation, config.replay.seed
    );
    out.push_str("| Game | Actions | Moves | Winner | Reason | Peak W | Peak B | Mean W | Mean B | Truth | ms |\n");
    out.push_str("|------|---------|-------|--------|--------|--------|--------|--------|--------|-------|----|\n");

    for game in games {
        let truth = match game.truth_lost_at {
            Some(index) => format!("lost @{index}"),
            None => "kept".to_string(),
        };
        let _ = writeln!(
            out,
            "| {name} | {actions} | {moves} | {winner} | {reason} | {pw} | {pb} | {mw:.1} | {mb:.1} | {truth} | {ms:.1} |",
            name = game.name,
            actions = game.actions,
            moves = game.moves,
            winner = game.winner.label(),
            reason = game.win_reason.as_str(),
            pw = game.peak_hypotheses[Color::White.slot()],
            pb = game.peak_hypotheses[Color::Black.slot()],
            mw = game.mean_hypotheses[Color::White.slot()],
            mb = game.mean_hypotheses[Color::Black.slot()],
            ms = game.elapsed_ms,
        );
    }

    fs::write(path, out)?;
    Ok(())
}

#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("io error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
    #[error("failed to serialize frame row: {source}")]
    Serialize {
        #[from]
        source: serde_json::Error,
    },
    #[error(transparent)]
    Game(#[from] GameSourceError),
}
