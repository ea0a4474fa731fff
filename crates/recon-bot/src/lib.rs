pub mod bot;
pub mod engine;
pub mod strategy;
pub mod vote;

pub use bot::{BotParams, MhtBot, Player};
pub use engine::{
    Analysis, EngineError, ExternalEngine, ExternalOptions, GreedyEngine, PrincipalLine, Score,
    ScoringEngine, SearchLimit,
};
pub use strategy::{
    INTERIOR_SQUARES, certain_win, minimax_square, non_dominated_by_own_pieces,
    non_dominated_moves, partition_dominance, recommend_sense,
};
pub use vote::{Ballot, MoveVoter, VoteOutcome, VoteParams, run_off};
