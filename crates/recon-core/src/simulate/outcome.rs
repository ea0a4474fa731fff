use crate::model::board::Board;
use crate::model::chess_move::Move;
use crate::model::color::ColorExt;
use crate::model::piece::{PROMOTIONS, Role, slides_when_blocked};
use crate::model::square::{Square, SquareExt};
use std::collections::HashSet;

/// What a requested move actually did on a board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MoveOutcome {
    pub taken: Move,
    pub capture: Option<Square>,
}

impl MoveOutcome {
    pub const PASS: MoveOutcome = MoveOutcome {
        taken: Move::Pass,
        capture: None,
    };

    fn of(board: &Board, taken: Move) -> Self {
        Self {
            taken,
            capture: capture_square_of_move(board, taken),
        }
    }
}

/// Square of the piece removed by `mv`, if any.
///
/// En-passant captures report the square of the captured pawn, not the
/// destination of the capturing pawn.
pub fn capture_square_of_move(board: &Board, mv: Move) -> Option<Square> {
    board.capture_square_of(mv)
}

/// Resolves a request made without sight of the opponent's pieces.
///
/// Sliding pieces (pawn pushes included) blocked by a hidden piece stop on the
/// furthest reachable square of the requested line, taking whatever stands
/// there. Blocked castles and blocked jumps become a pass.
pub fn simulate_move(board: &Board, requested: Move) -> MoveOutcome {
    let Move::Normal { from, to, .. } = requested else {
        return MoveOutcome::PASS;
    };
    let Some(piece) = board.piece_at(from).filter(|p| p.color == board.turn()) else {
        return MoveOutcome::PASS;
    };

    if board.is_pseudo_legal(requested) {
        return MoveOutcome::of(board, requested);
    }
    if board.is_castling(requested) {
        return MoveOutcome::PASS;
    }
    if slides_when_blocked(piece.role) {
        return slide(board, requested, from, to);
    }
    MoveOutcome::PASS
}

fn slide(board: &Board, requested: Move, from: Square, to: Square) -> MoveOutcome {
    let mut line = from.line_to(to);
    line.push(to);
    line.sort_by_key(|square| std::cmp::Reverse(square.distance(from)));
    line.into_iter()
        .map(|square| requested.retarget(square))
        .find(|revised| board.is_pseudo_legal(*revised))
        .map_or(MoveOutcome::PASS, |revised| MoveOutcome::of(board, revised))
}

/// Every move the side to move might request while seeing only its own pieces.
///
/// Includes pawn diagonals onto squares not holding a friendly piece (the mover
/// cannot know whether there is something to take) and ends with [`Move::Pass`].
pub fn possible_requested_moves(board: &Board) -> Vec<Move> {
    let own_view = board.without_opponent_pieces();
    let mover = own_view.turn();
    let mut moves = own_view.pseudo_legal_moves();

    for (from, piece) in own_view.pieces(mover) {
        if piece.role != Role::Pawn {
            continue;
        }
        for df in [-1, 1] {
            let Some(target) = from.shift(df, mover.pawn_dir()) else {
                continue;
            };
            if own_view.is_occupied(target) {
                continue;
            }
            if target.rank_index() == 0 || target.rank_index() == 7 {
                moves.extend(
                    PROMOTIONS
                        .iter()
                        .map(|role| Move::with_promotion(from, target, *role)),
                );
            } else {
                moves.push(Move::new(from, target));
            }
        }
    }

    moves.push(Move::Pass);
    dedup_in_order(moves)
}

/// Every move a side with full information could actually play, ending with a pass.
pub fn possible_taken_moves(board: &Board) -> Vec<Move> {
    let mut moves = board.pseudo_legal_moves();
    moves.push(Move::Pass);
    dedup_in_order(moves)
}

fn dedup_in_order(moves: Vec<Move>) -> Vec<Move> {
    let mut seen = HashSet::with_capacity(moves.len());
    moves.into_iter().filter(|mv| seen.insert(*mv)).collect()
}
