use recon_core::model::board::Board;
use recon_core::model::chess_move::Move;
use recon_core::simulate::{possible_requested_moves, simulate_move};

/// A requested move that captures the opponent king on every hypothesis.
///
/// Candidates come from the first board; a candidate is rejected on the first
/// board where it does not land on and capture that board's opponent king.
pub fn certain_win(boards: &[Board]) -> Option<Move> {
    let first = boards.first()?;
    possible_requested_moves(first).into_iter().find(|requested| {
        let Some(to) = requested.to_square() else {
            return false;
        };
        boards.iter().all(|board| {
            let king = board.king(!board.turn());
            king == Some(to) && simulate_move(board, *requested).capture == Some(to)
        })
    })
}

/// Pass plus every move from the first board that is played unrevised on at
/// least one hypothesis.
pub fn non_dominated_moves(boards: &[Board]) -> Vec<Move> {
    let mut choices = vec![Move::Pass];
    let Some(first) = boards.first() else {
        return choices;
    };
    choices.extend(
        possible_requested_moves(first)
            .into_iter()
            .filter(|requested| !requested.is_pass())
            .filter(|requested| {
                boards
                    .iter()
                    .any(|board| simulate_move(board, *requested).taken == *requested)
            }),
    );
    choices
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board(fen: &str) -> Board {
        Board::from_fen(fen).unwrap()
    }

    #[test]
    fn no_boards_no_win() {
        assert_eq!(certain_win(&[]), None);
        assert_eq!(non_dominated_moves(&[]), vec![Move::Pass]);
    }

    #[test]
    fn shared_king_square_wins_everywhere() {
        let boards = [
            board("4k3/8/8/8/8/8/8/4RK2 w - - 0 1"),
            board("4k3/8/8/8/8/8/4p3/4RK2 w - - 0 1"),
        ];
        // The hidden pawn on e2 blocks the rook on the second board.
        assert_eq!(certain_win(&boards[..1]), Some("e1e8".parse().unwrap()));
        assert_eq!(certain_win(&boards), None);
    }

    #[test]
    fn different_king_squares_never_agree() {
        let boards = [
            board("4k3/8/8/8/8/8/8/R3K3 w - - 0 1"),
            board("k7/8/8/8/8/8/8/R3K3 w - - 0 1"),
        ];
        assert_eq!(certain_win(&boards), None);
    }

    #[test]
    fn start_position_moves_are_all_playable() {
        let moves = non_dominated_moves(&[Board::starting()]);
        assert_eq!(moves[0], Move::Pass);
        // Pawn diagonals onto empty squares are revised to a pass.
        assert_eq!(moves.len(), 21);
    }
}
