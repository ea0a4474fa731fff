use super::tally::run_off;
use crate::engine::{EngineError, ScoringEngine, SearchLimit};
use rand::Rng;
use rand::seq::SliceRandom;
use rayon::prelude::*;
use recon_core::belief::MovePlan;
use recon_core::model::board::Board;
use recon_core::model::chess_move::Move;
use recon_core::simulate::{MoveOutcome, simulate_move};
use serde::Serialize;
use std::time::Instant;
use tracing::{Level, event};

/// One hypothesis' ranking: groups of requested moves, best group first.
///
/// Moves in one group are tied because they resolve to the same taken move.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Ballot {
    groups: Vec<Vec<Move>>,
}

impl Ballot {
    pub fn new(groups: Vec<Vec<Move>>) -> Self {
        Self { groups }
    }

    pub fn groups(&self) -> &[Vec<Move>] {
        &self.groups
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub(crate) fn first_choices(&self) -> &[Move] {
        self.groups.first().map(Vec::as_slice).unwrap_or(&[])
    }

    /// Drops empty groups; `None` if nothing is left.
    pub(crate) fn compacted(mut self) -> Option<Ballot> {
        self.groups.retain(|group| !group.is_empty());
        (!self.groups.is_empty()).then_some(self)
    }

    /// Strikes `mv` everywhere; `None` if nothing is left.
    pub(crate) fn without(mut self, mv: Move) -> Option<Ballot> {
        for group in &mut self.groups {
            group.retain(|candidate| *candidate != mv);
        }
        self.compacted()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VoteParams {
    /// Hypotheses scored per decision, drawn at random.
    pub sample_size: usize,
    pub limit: SearchLimit,
    /// Hypotheses not yet scored at this instant cast no ballot.
    pub deadline: Option<Instant>,
}

impl Default for VoteParams {
    fn default() -> Self {
        Self {
            sample_size: 1200,
            limit: SearchLimit::default(),
            deadline: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct VoteOutcome {
    pub choice: Move,
    pub sampled: usize,
    pub ballots: usize,
    pub king_captures: usize,
    pub engine_failures: usize,
    pub unscored: usize,
    pub rounds: usize,
}

enum Cast {
    KingCapture(Ballot),
    Scored(Ballot),
    Failed(EngineError),
    Skipped,
}

/// Picks a requested move by letting the engine vote on sampled hypotheses.
pub struct MoveVoter<'e, E: ScoringEngine + ?Sized> {
    engine: &'e E,
    params: VoteParams,
}

impl<'e, E: ScoringEngine + ?Sized> MoveVoter<'e, E> {
    pub fn new(engine: &'e E, params: VoteParams) -> Self {
        Self { engine, params }
    }

    /// Votes over `boards`, resolving every candidate on each sampled board.
    pub fn vote<R: Rng + ?Sized>(
        &self,
        candidates: &[Move],
        boards: &[Board],
        rng: &mut R,
    ) -> VoteOutcome {
        let sample = self.sample(boards.len(), rng);
        let casts: Vec<Cast> = sample
            .par_iter()
            .map(|index| {
                let board = &boards[*index];
                let outcomes: Vec<MoveOutcome> = candidates
                    .iter()
                    .map(|mv| simulate_move(board, *mv))
                    .collect();
                self.cast(board, candidates, &outcomes)
            })
            .collect();
        self.finish(candidates, sample.len(), casts)
    }

    /// Votes using outcomes already computed by the tracker's move speculation.
    ///
    /// `plan` must have been computed for `boards`.
    pub fn vote_planned<R: Rng + ?Sized>(
        &self,
        plan: &MovePlan,
        boards: &[Board],
        rng: &mut R,
    ) -> VoteOutcome {
        let candidates = plan.candidates();
        let sample = self.sample(boards.len().min(plan.board_count()), rng);
        let casts: Vec<Cast> = sample
            .par_iter()
            .map(|index| match plan.outcomes_for(*index) {
                Some(outcomes) => self.cast(&boards[*index], candidates, outcomes),
                None => Cast::Skipped,
            })
            .collect();
        self.finish(candidates, sample.len(), casts)
    }

    fn sample<R: Rng + ?Sized>(&self, len: usize, rng: &mut R) -> Vec<usize> {
        let mut indices: Vec<usize> = (0..len).collect();
        indices.shuffle(rng);
        indices.truncate(self.params.sample_size);
        indices
    }

    fn cast(&self, board: &Board, candidates: &[Move], outcomes: &[MoveOutcome]) -> Cast {
        if let Some(king) = board.king(!board.turn())
            && board.king_capturable()
        {
            let winners: Vec<Move> = candidates
                .iter()
                .zip(outcomes)
                .filter(|(_, outcome)| outcome.capture == Some(king))
                .map(|(mv, _)| *mv)
                .collect();
            return Cast::KingCapture(Ballot::new(vec![winners]));
        }

        if self
            .params
            .deadline
            .is_some_and(|deadline| Instant::now() >= deadline)
        {
            return Cast::Skipped;
        }

        match self.engine.analyse(board, &self.params.limit) {
            Ok(analysis) => {
                let groups = analysis
                    .lines
                    .iter()
                    .filter_map(|line| line.first_move())
                    .map(|taken| requests_for(taken, candidates, outcomes))
                    .filter(|group| !group.is_empty())
                    .collect();
                Cast::Scored(Ballot::new(groups))
            }
            Err(err) => Cast::Failed(err),
        }
    }

    fn finish(&self, candidates: &[Move], sampled: usize, casts: Vec<Cast>) -> VoteOutcome {
        let mut outcome = VoteOutcome {
            choice: Move::Pass,
            sampled,
            ballots: 0,
            king_captures: 0,
            engine_failures: 0,
            unscored: 0,
            rounds: 0,
        };
        let mut ballots = Vec::with_capacity(casts.len());
        for cast in casts {
            match cast {
                Cast::KingCapture(ballot) => {
                    outcome.king_captures += 1;
                    ballots.push(ballot);
                }
                Cast::Scored(ballot) => ballots.push(ballot),
                Cast::Failed(err) => {
                    outcome.engine_failures += 1;
                    tracing::warn!(
                        target: "recon_bot::vote",
                        engine = self.engine.name(),
                        error = %err,
                        message = "engine query failed; hypothesis casts no vote"
                    );
                }
                Cast::Skipped => outcome.unscored += 1,
            }
        }
        outcome.ballots = ballots.iter().filter(|ballot| !ballot.is_empty()).count();

        let (choice, rounds) = run_off(ballots, candidates);
        outcome.choice = choice;
        outcome.rounds = rounds;

        event!(
            target: "recon_bot::vote",
            Level::INFO,
            engine = self.engine.name(),
            choice = %choice,
            sampled = outcome.sampled,
            ballots = outcome.ballots,
            king_captures = outcome.king_captures,
            engine_failures = outcome.engine_failures,
            unscored = outcome.unscored,
            rounds
        );
        outcome
    }
}

/// Requested moves that resolve to `taken` on this board.
fn requests_for(taken: Move, candidates: &[Move], outcomes: &[MoveOutcome]) -> Vec<Move> {
    candidates
        .iter()
        .zip(outcomes)
        .filter(|(_, outcome)| outcome.taken == taken)
        .map(|(mv, _)| *mv)
        .collect()
}
