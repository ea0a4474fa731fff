use super::{Analysis, EngineError, PrincipalLine, Score, ScoringEngine, SearchLimit};
use recon_core::model::board::Board;
use recon_core::model::color::Color;
use recon_core::model::piece::Role;

/// One-ply material scorer.
///
/// Each pseudo-legal move is scored by the material balance after it, less the
/// value of the moved piece when it lands on a square the opponent attacks.
/// Taking the king scores as mate in one. The search depth is ignored.
#[derive(Debug, Clone, Copy, Default)]
pub struct GreedyEngine;

impl GreedyEngine {
    pub const fn new() -> Self {
        Self
    }
}

const fn piece_value(role: Role) -> i32 {
    match role {
        Role::Pawn => 100,
        Role::Knight => 320,
        Role::Bishop => 330,
        Role::Rook => 500,
        Role::Queen => 900,
        Role::King => 0,
    }
}

fn material(board: &Board, color: Color) -> i32 {
    board
        .pieces(color)
        .map(|(_, piece)| piece_value(piece.role))
        .sum()
}

impl ScoringEngine for GreedyEngine {
    fn analyse(&self, board: &Board, limit: &SearchLimit) -> Result<Analysis, EngineError> {
        let mover = board.turn();
        let opponent_king = board.king(!mover);

        let mut scored: Vec<PrincipalLine> = board
            .pseudo_legal_moves()
            .into_iter()
            .map(|mv| {
                if opponent_king.is_some() && board.capture_square_of(mv) == opponent_king {
                    return PrincipalLine {
                        pv: vec![mv],
                        score: Score::Mate(1),
                    };
                }
                let after = board.after(mv);
                let mut cp = material(&after, mover) - material(&after, !mover);
                if let Some(to) = mv.to_square()
                    && after.is_attacked_by(!mover, to)
                    && let Some(piece) = after.piece_at(to)
                {
                    cp -= if piece.role == Role::King {
                        piece_value(Role::Queen) * 10
                    } else {
                        piece_value(piece.role)
                    };
                }
                PrincipalLine {
                    pv: vec![mv],
                    score: Score::Centipawns(cp),
                }
            })
            .collect();

        scored.sort_by_key(|line| std::cmp::Reverse(line.score.sort_key()));
        scored.truncate(limit.multipv.max(1));
        Ok(Analysis { lines: scored })
    }

    fn name(&self) -> &str {
        "greedy"
    }
}
