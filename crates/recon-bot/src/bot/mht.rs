use super::{BotParams, Player};
use crate::engine::ScoringEngine;
use crate::strategy::{certain_win, recommend_sense};
use crate::vote::{MoveVoter, VoteOutcome, VoteParams};
use rand::SeedableRng;
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use recon_core::belief::{ExpansionBudget, HypothesisTracker};
use recon_core::history::WinReason;
use recon_core::model::board::Board;
use recon_core::model::chess_move::Move;
use recon_core::model::color::{Color, ColorExt};
use recon_core::model::square::Square;
use recon_core::simulate::SenseObservation;
use std::time::{Duration, Instant};
use tracing::{Level, event};

/// Player that tracks every consistent board and votes over them.
pub struct MhtBot<E: ScoringEngine> {
    tracker: HypothesisTracker,
    engine: E,
    params: BotParams,
    rng: SmallRng,
    color: Option<Color>,
    opponent_results: u32,
    pending_sense: Option<Square>,
    last_vote: Option<VoteOutcome>,
}

impl<E: ScoringEngine> MhtBot<E> {
    pub fn new(engine: E, params: BotParams) -> Self {
        let rng = match params.seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_entropy(),
        };
        Self {
            tracker: HypothesisTracker::new(),
            engine,
            params,
            rng,
            color: None,
            opponent_results: 0,
            pending_sense: None,
            last_vote: None,
        }
    }

    pub fn tracker(&self) -> &HypothesisTracker {
        &self.tracker
    }

    pub fn params(&self) -> &BotParams {
        &self.params
    }

    pub fn color(&self) -> Option<Color> {
        self.color
    }

    /// Tally details of the most recent engine vote.
    pub fn last_vote(&self) -> Option<&VoteOutcome> {
        self.last_vote.as_ref()
    }

    fn turn_deadline(&self, time_left: Duration) -> Option<Instant> {
        let budget = match (self.params.turn_budget, time_left.is_zero()) {
            (Some(budget), false) => Some(budget.min(time_left)),
            (Some(budget), true) => Some(budget),
            (None, false) => Some(time_left),
            (None, true) => None,
        };
        budget.and_then(|budget| Instant::now().checked_add(budget))
    }
}

impl<E: ScoringEngine> Player for MhtBot<E> {
    fn handle_game_start(&mut self, color: Color, _board: &Board, opponent_name: &str) {
        self.color = Some(color);
        self.opponent_results = 0;
        self.pending_sense = None;
        self.last_vote = None;
        self.tracker.reset();
        event!(
            target: "recon_bot::player",
            Level::INFO,
            color = color.label(),
            opponent = opponent_name,
            engine = self.engine.name(),
            "game start"
        );
    }

    fn handle_opponent_move_result(&mut self, _captured_my_piece: bool, capture: Option<Square>) {
        self.opponent_results += 1;
        if self.opponent_results == 1 && self.color == Some(Color::White) {
            return;
        }
        self.tracker.truncate(
            self.params.max_hypotheses,
            self.params.truncation,
            &mut self.rng,
        );
        let budget = self
            .params
            .turn_budget
            .map(ExpansionBudget::within)
            .unwrap_or(ExpansionBudget::UNBOUNDED);
        self.tracker.op_move_within(capture, budget);
    }

    fn choose_sense(
        &mut self,
        sense_actions: &[Square],
        _move_actions: &[Move],
        _time_left: Duration,
    ) -> Option<Square> {
        let choice = recommend_sense(&mut self.tracker)
            .filter(|square| sense_actions.is_empty() || sense_actions.contains(square));
        self.pending_sense = choice;
        choice
    }

    fn handle_sense_result(&mut self, observation: &SenseObservation) {
        let requested = self.pending_sense.take();
        if observation.is_empty() {
            return;
        }
        match requested.or_else(|| observation.center()) {
            Some(square) => self.tracker.sense(Some(square), observation),
            None => tracing::warn!(
                target: "recon_bot::player",
                cells = observation.len(),
                message = "sense result without a known centre; ignored"
            ),
        }
    }

    fn choose_move(&mut self, move_actions: &[Move], time_left: Duration) -> Move {
        if self.tracker.is_empty() {
            tracing::warn!(
                target: "recon_bot::player",
                message = "no hypotheses left; requesting a random move"
            );
            return move_actions
                .choose(&mut self.rng)
                .copied()
                .unwrap_or(Move::Pass);
        }

        if let Some(winning) = certain_win(self.tracker.boards()) {
            event!(
                target: "recon_bot::player",
                Level::INFO,
                choice = %winning,
                hypotheses = self.tracker.len(),
                "king capture on every hypothesis"
            );
            return winning;
        }

        let params = VoteParams {
            sample_size: self.params.vote_sample,
            limit: self.params.search_limit(),
            deadline: self.turn_deadline(time_left),
        };
        self.tracker.speculate_move(move_actions);
        let outcome = match self.tracker.move_speculation() {
            Some(plan) => MoveVoter::new(&self.engine, params).vote_planned(
                plan,
                self.tracker.boards(),
                &mut self.rng,
            ),
            None => MoveVoter::new(&self.engine, params).vote(
                move_actions,
                self.tracker.boards(),
                &mut self.rng,
            ),
        };
        self.last_vote = Some(outcome);
        outcome.choice
    }

    fn handle_move_result(
        &mut self,
        requested: Move,
        taken: Move,
        _captured_opponent_piece: bool,
        capture: Option<Square>,
    ) {
        self.tracker.apply_move(requested, taken, capture);
    }

    fn handle_game_end(&mut self, winner: Option<Color>, reason: Option<WinReason>) {
        event!(
            target: "recon_bot::player",
            Level::INFO,
            color = self.color.map(ColorExt::label),
            winner = winner.map(ColorExt::label),
            reason = reason.map(WinReason::as_str),
            hypotheses = self.tracker.len(),
            "game end"
        );
    }
}
