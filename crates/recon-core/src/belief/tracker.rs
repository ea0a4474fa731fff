use super::plan::{MovePlan, SensePlan};
use super::policy::{ExpansionBudget, ExpansionReport, TruncationStrategy};
use crate::model::board::Board;
use crate::model::chess_move::Move;
use crate::model::square::Square;
use crate::simulate::{
    MoveOutcome, SenseObservation, capture_square_of_move, possible_taken_moves, simulate_move,
    simulate_sense,
};
use rand::Rng;
use rayon::prelude::*;
use std::collections::HashSet;
use tracing::{Level, event};

/// The set of boards consistent with everything one side has observed.
///
/// Boards are owned by the tracker. Speculation results are kept until the next
/// mutation and then thrown away, so a stored plan always describes the current set.
#[derive(Debug, Clone)]
pub struct HypothesisTracker {
    boards: Vec<Board>,
    sense_plan: Option<SensePlan>,
    move_plan: Option<MovePlan>,
}

impl Default for HypothesisTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl HypothesisTracker {
    /// Tracker holding only the starting position.
    pub fn new() -> Self {
        Self::from_boards(vec![Board::starting()])
    }

    pub fn from_boards(boards: Vec<Board>) -> Self {
        Self {
            boards,
            sense_plan: None,
            move_plan: None,
        }
    }

    pub fn reset(&mut self) {
        self.replace(vec![Board::starting()]);
    }

    pub fn boards(&self) -> &[Board] {
        &self.boards
    }

    pub fn len(&self) -> usize {
        self.boards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.boards.is_empty()
    }

    pub fn contains(&self, board: &Board) -> bool {
        self.boards.iter().any(|candidate| candidate == board)
    }

    /// Keeps the boards on which sensing `square` shows `observation`.
    ///
    /// `None` means no sense was made and leaves the set untouched.
    pub fn sense(&mut self, square: Option<Square>, observation: &SenseObservation) {
        let plan = self.sense_plan.take();
        self.move_plan = None;
        let Some(square) = square else {
            return;
        };

        let before = self.boards.len();
        let planned = plan.as_ref().and_then(|plan| plan.partition(square));
        let kept = match planned {
            Some(partition) => {
                let members = partition.members(observation).unwrap_or(&[]);
                take_indices(std::mem::take(&mut self.boards), members)
            }
            None => std::mem::take(&mut self.boards)
                .into_par_iter()
                .filter(|board| simulate_sense(board, Some(square)) == *observation)
                .collect(),
        };
        self.boards = kept;

        event!(
            target: "recon_core::tracker",
            Level::DEBUG,
            op = "sense",
            square = %square,
            planned = planned.is_some(),
            before,
            after = self.boards.len()
        );
    }

    /// Records our own move: keeps boards where `requested` resolves to `taken`
    /// with the given capture, then plays `taken` on each of them.
    pub fn apply_move(&mut self, requested: Move, taken: Move, capture: Option<Square>) {
        let plan = self.move_plan.take();
        self.sense_plan = None;
        let expected = MoveOutcome { taken, capture };
        let before = self.boards.len();

        let planned = plan
            .as_ref()
            .filter(|plan| plan.covers(requested) && plan.board_count() == before);
        let survivors: Vec<Board> = match planned {
            Some(plan) => std::mem::take(&mut self.boards)
                .into_iter()
                .enumerate()
                .filter(|(index, _)| plan.outcome(*index, requested) == Some(expected))
                .map(|(_, board)| board)
                .collect(),
            None => std::mem::take(&mut self.boards)
                .into_par_iter()
                .filter(|board| simulate_move(board, requested) == expected)
                .collect(),
        };

        self.boards = survivors
            .into_par_iter()
            .map(|mut board| {
                board.push(taken);
                board
            })
            .collect();

        event!(
            target: "recon_core::tracker",
            Level::DEBUG,
            op = "move",
            requested = %requested,
            taken = %taken,
            capture = ?capture,
            planned = planned.is_some(),
            before,
            after = self.boards.len()
        );
    }

    /// Expands every board by each opponent move consistent with the capture we
    /// observed, deduplicating by fingerprint in first-seen order.
    pub fn op_move(&mut self, capture: Option<Square>) -> ExpansionReport {
        self.op_move_within(capture, ExpansionBudget::UNBOUNDED)
    }

    /// [`op_move`](Self::op_move) bounded by a deadline and a board cap.
    ///
    /// Sources are expanded in order, a chunk at a time, and the budget is checked
    /// between chunks. The first chunk always runs, so an expired deadline leaves
    /// the expansion of a leading slice of the set rather than nothing. Under a cap
    /// a chunk never holds more sources than there is room left for, and
    /// generation stops as soon as the cap is met.
    pub fn op_move_within(
        &mut self,
        capture: Option<Square>,
        budget: ExpansionBudget,
    ) -> ExpansionReport {
        self.clear_speculation();
        let sources = std::mem::take(&mut self.boards);

        let mut report = ExpansionReport {
            input: sources.len(),
            ..ExpansionReport::default()
        };
        let mut seen = HashSet::new();
        let mut merged = Vec::new();
        let mut next = 0;

        'chunks: while next < sources.len() {
            if report.expanded > 0 && budget.expired() {
                break;
            }
            let room = budget
                .max_boards
                .map_or(EXPANSION_CHUNK, |cap| cap.saturating_sub(merged.len()));
            if room == 0 {
                report.capped = true;
                break;
            }
            let end = sources.len().min(next + room.min(EXPANSION_CHUNK));
            let batches: Vec<Vec<Board>> = sources[next..end]
                .par_iter()
                .map(|board| expand(board, capture))
                .collect();
            next = end;
            report.expanded += batches.len();
            report.generated += batches.iter().map(Vec::len).sum::<usize>();

            for batch in batches {
                for board in batch {
                    if budget.max_boards.is_some_and(|cap| merged.len() >= cap) {
                        report.capped = true;
                        break 'chunks;
                    }
                    if seen.insert(board.fingerprint()) {
                        merged.push(board);
                    }
                }
            }
        }
        report.output = merged.len();
        self.boards = merged;

        if report.is_reduced() {
            tracing::warn!(
                target: "recon_core::tracker",
                input = report.input,
                expanded = report.expanded,
                output = report.output,
                capped = report.capped,
                message = "opponent expansion cut short by budget"
            );
        } else {
            event!(
                target: "recon_core::tracker",
                Level::DEBUG,
                op = "op_move",
                capture = ?capture,
                input = report.input,
                generated = report.generated,
                output = report.output
            );
        }
        report
    }

    /// Partitions the set for each candidate square and stores the result for
    /// the next [`sense`](Self::sense).
    pub fn speculate_sense(&mut self, squares: &[Square]) -> &SensePlan {
        self.sense_plan
            .insert(SensePlan::compute(&self.boards, squares))
    }

    pub fn sense_speculation(&self) -> Option<&SensePlan> {
        self.sense_plan.as_ref()
    }

    /// Resolves each candidate move on each board and stores the result for the
    /// next [`apply_move`](Self::apply_move).
    pub fn speculate_move(&mut self, candidates: &[Move]) -> &MovePlan {
        self.move_plan
            .insert(MovePlan::compute(&self.boards, candidates))
    }

    pub fn move_speculation(&self) -> Option<&MovePlan> {
        self.move_plan.as_ref()
    }

    /// Cuts the set down to `limit` boards.
    pub fn truncate<R: Rng + ?Sized>(
        &mut self,
        limit: usize,
        strategy: TruncationStrategy,
        rng: &mut R,
    ) {
        let before = self.boards.len();
        if before <= limit {
            return;
        }
        let keep = strategy.select(before, limit, rng);
        let boards = take_indices(std::mem::take(&mut self.boards), &keep);
        self.replace(boards);
        event!(
            target: "recon_core::tracker",
            Level::DEBUG,
            op = "truncate",
            strategy = strategy.as_str(),
            before,
            after = self.boards.len()
        );
    }

    fn replace(&mut self, boards: Vec<Board>) {
        self.boards = boards;
        self.clear_speculation();
    }

    fn clear_speculation(&mut self) {
        self.sense_plan = None;
        self.move_plan = None;
    }
}

/// Sources expanded in parallel between two budget checks.
const EXPANSION_CHUNK: usize = 64;

/// Every board reachable from `board` by one opponent move capturing on `capture`.
fn expand(board: &Board, capture: Option<Square>) -> Vec<Board> {
    possible_taken_moves(board)
        .into_iter()
        .filter(|mv| capture_square_of_move(board, *mv) == capture)
        .map(|mv| board.after(mv))
        .collect()
}

/// Moves the boards at `indices` (ascending) out of `boards`.
fn take_indices(boards: Vec<Board>, indices: &[usize]) -> Vec<Board> {
    let mut wanted = indices.iter().copied().peekable();
    let mut kept = Vec::with_capacity(indices.len());
    for (index, board) in boards.into_iter().enumerate() {
        if wanted.peek() == Some(&index) {
            kept.push(board);
            wanted.next();
        }
    }
    kept
}
