use super::record::{Action, GameRecord};
use crate::belief::{HypothesisTracker, TruncationStrategy};
use crate::model::board::Board;
use crate::model::color::{Color, ColorExt, by_label};
use crate::simulate::{simulate_move, simulate_sense};
use rand::SeedableRng;
use rand::rngs::SmallRng;
use serde::{Deserialize, Serialize};
use tracing::{Level, event};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    Sense,
    Move,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WinReason {
    KingCapture,
    Timeout,
}

impl WinReason {
    pub const fn as_str(self) -> &'static str {
        match self {
            WinReason::KingCapture => "king capture",
            WinReason::Timeout => "timeout",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReplayOptions {
    /// Cap applied to the expanding side's set before each opponent expansion.
    pub max_hypotheses: Option<usize>,
    pub truncation: TruncationStrategy,
    pub seed: u64,
    /// Keep every tracker's EPD list in each frame.
    pub record_epds: bool,
}

impl Default for ReplayOptions {
    fn default() -> Self {
        Self {
            max_hypotheses: None,
            truncation: TruncationStrategy::Prefix,
            seed: 0,
            record_epds: false,
        }
    }
}

/// Both trackers' view of the game right after one action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplayFrame {
    pub index: usize,
    #[serde(with = "by_label")]
    pub actor: Color,
    pub kind: ActionKind,
    pub token: String,
    pub true_epd: String,
    /// Hypothesis counts indexed by [`ColorExt::slot`].
    pub hypotheses: [usize; 2],
    pub holds_truth: [bool; 2],
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub possible_epds: Option<[Vec<String>; 2]>,
}

/// Result of stepping a recorded game through both trackers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Replay {
    pub frames: Vec<ReplayFrame>,
    pub final_epd: String,
    #[serde(with = "by_label")]
    pub winner: Color,
    pub win_reason: WinReason,
}

impl Replay {
    /// Replays `record` from the starting position.
    ///
    /// The mover's tracker senses and records its own move; the other side's
    /// tracker expands by the capture it observed. Replay stops early once a
    /// king is taken.
    pub fn run(record: &GameRecord, options: ReplayOptions) -> Replay {
        let mut board = Board::starting();
        let mut trackers = [HypothesisTracker::new(), HypothesisTracker::new()];
        let mut rng = SmallRng::seed_from_u64(options.seed);
        let mut frames = Vec::with_capacity(record.num_actions());

        for (index, action) in record.actions().iter().enumerate() {
            let actor = board.turn();
            let (kind, token) = match *action {
                Action::Sense(square) => {
                    let observation = simulate_sense(&board, square);
                    trackers[actor.slot()].sense(square, &observation);
                    (ActionKind::Sense, action.to_string())
                }
                Action::Move(requested) => {
                    let outcome = simulate_move(&board, requested);
                    trackers[actor.slot()].apply_move(requested, outcome.taken, outcome.capture);
                    let watcher = &mut trackers[(!actor).slot()];
                    if let Some(limit) = options.max_hypotheses {
                        watcher.truncate(limit, options.truncation, &mut rng);
                    }
                    watcher.op_move(outcome.capture);
                    board.push(outcome.taken);
                    (ActionKind::Move, action.to_string())
                }
            };

            frames.push(snapshot(index, actor, kind, token, &board, &trackers, &options));

            if board.king(board.turn()).is_none() {
                event!(
                    target: "recon_core::history",
                    Level::DEBUG,
                    index,
                    message = "king captured, replay stops"
                );
                break;
            }
        }

        let loser = board.turn();
        let win_reason = if board.king(loser).is_some() {
            WinReason::Timeout
        } else {
            WinReason::KingCapture
        };
        Replay {
            frames,
            final_epd: board.epd(),
            winner: !loser,
            win_reason,
        }
    }

    pub fn last_frame(&self) -> Option<&ReplayFrame> {
        self.frames.last()
    }
}

fn snapshot(
    index: usize,
    actor: Color,
    kind: ActionKind,
    token: String,
    board: &Board,
    trackers: &[HypothesisTracker; 2],
    options: &ReplayOptions,
) -> ReplayFrame {
    let epds = |tracker: &HypothesisTracker| -> Vec<String> {
        tracker.boards().iter().map(Board::epd).collect()
    };
    ReplayFrame {
        index,
        actor,
        kind,
        token,
        true_epd: board.epd(),
        hypotheses: [trackers[0].len(), trackers[1].len()],
        holds_truth: [trackers[0].contains(board), trackers[1].contains(board)],
        possible_epds: options
            .record_epds
            .then(|| [epds(&trackers[0]), epds(&trackers[1])]),
    }
}
