//! Position scoring behind a narrow trait.
//!
//! - `external`: a JSON request/response adapter around a configured process.
//! - `greedy`: an in-process one-ply material scorer usable without any binary.

mod external;
mod greedy;

pub use external::{ExternalEngine, ExternalOptions};
pub use greedy::GreedyEngine;

use recon_core::model::board::Board;
use recon_core::model::chess_move::Move;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Search budget for one query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchLimit {
    pub depth: u32,
    pub multipv: usize,
    #[serde(default)]
    pub timeout: Option<Duration>,
}

impl Default for SearchLimit {
    fn default() -> Self {
        Self {
            depth: 8,
            multipv: 4,
            timeout: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Score {
    Centipawns(i32),
    /// Moves to mate, negative when the side to move is being mated.
    Mate(i32),
}

impl Score {
    /// Single integer ordering where any winning mate beats any material score.
    pub fn sort_key(self) -> i64 {
        const MATE: i64 = 1_000_000;
        match self {
            Score::Centipawns(cp) => i64::from(cp),
            Score::Mate(n) if n > 0 => MATE - i64::from(n),
            Score::Mate(n) => -MATE - i64::from(n),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrincipalLine {
    pub pv: Vec<Move>,
    pub score: Score,
}

impl PrincipalLine {
    pub fn first_move(&self) -> Option<Move> {
        self.pv.first().copied()
    }
}

/// Best lines first. Empty when the side to move has nothing to suggest.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Analysis {
    pub lines: Vec<PrincipalLine>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error("no command configured")]
    NoCommand,
    #[error("failed to spawn process: {0}")]
    Spawn(String),
    #[error("I/O error: {0}")]
    Io(String),
    #[error("protocol error: {0}")]
    Protocol(String),
    #[error("non-zero exit status: {0}")]
    Status(String),
    #[error("no answer within {0:?}")]
    Timeout(Duration),
}

/// Ranks moves on a fully known position.
///
/// Queries are independent and may run concurrently from several threads.
pub trait ScoringEngine: Send + Sync {
    fn analyse(&self, board: &Board, limit: &SearchLimit) -> Result<Analysis, EngineError>;

    fn name(&self) -> &str;
}

impl<E: ScoringEngine + ?Sized> ScoringEngine for Box<E> {
    fn analyse(&self, board: &Board, limit: &SearchLimit) -> Result<Analysis, EngineError> {
        (**self).analyse(board, limit)
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mates_outrank_material() {
        assert!(Score::Mate(3).sort_key() > Score::Centipawns(5_000).sort_key());
        assert!(Score::Mate(1).sort_key() > Score::Mate(3).sort_key());
        assert!(Score::Mate(-1).sort_key() < Score::Mate(-4).sort_key());
        assert!(Score::Mate(-4).sort_key() < Score::Centipawns(-5_000).sort_key());
    }
}
