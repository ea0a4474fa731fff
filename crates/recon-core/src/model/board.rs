//! Board snapshot used by every hypothesis.
//!
//! A [`Board`] wraps a [`shakmaty::Board`] placement with side to move, castling
//! rights and the en-passant square plus move counters. The counters are
//! bookkeeping only: equality, hashing and [`Fingerprint`] ignore them, since two
//! positions differing only in counters allow the same actions and produce the
//! same observations.
//!
//! shakmaty's `Chess` position is not used because it rejects kingless
//! positions and refuses to leave a king en prise, both of which this variant
//! relies on.

use super::chess_move::Move;
use super::color::{BOTH_COLORS, Color, ColorExt};
use super::piece::{Piece, Role};
use super::square::{Square, SquareExt, square_at};
use shakmaty::Bitboard;
use std::hash::{Hash, Hasher};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CastleSide {
    King,
    Queen,
}

impl CastleSide {
    pub const BOTH: [CastleSide; 2] = [CastleSide::King, CastleSide::Queen];

    /// File the rook starts on.
    pub const fn rook_file(self) -> u32 {
        match self {
            CastleSide::King => 7,
            CastleSide::Queen => 0,
        }
    }

    /// File the king lands on.
    pub const fn king_target_file(self) -> u32 {
        match self {
            CastleSide::King => 6,
            CastleSide::Queen => 2,
        }
    }

    /// File the rook lands on.
    pub const fn rook_target_file(self) -> u32 {
        match self {
            CastleSide::King => 5,
            CastleSide::Queen => 3,
        }
    }

    pub fn rook_home(self, color: Color) -> Square {
        square_at(self.rook_file(), color.home_rank())
    }
}

/// Counter-free identity of a position, used for deduplication.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fingerprint {
    layers: [Bitboard; 8],
    turn: Color,
    castling: Bitboard,
    ep_square: Option<Square>,
}

#[derive(Debug, Clone)]
pub struct Board {
    pub(crate) placement: shakmaty::Board,
    pub(crate) turn: Color,
    /// Home squares of the rooks that still carry a castling right.
    pub(crate) castling: Bitboard,
    pub(crate) ep_square: Option<Square>,
    pub(crate) halfmoves: u32,
    pub(crate) fullmoves: u32,
}

impl Board {
    /// A board with no pieces, white to move and no castling rights.
    pub fn empty() -> Self {
        Self {
            placement: shakmaty::Board::empty(),
            turn: Color::White,
            castling: Bitboard(0),
            ep_square: None,
            halfmoves: 0,
            fullmoves: 1,
        }
    }

    /// Standard starting position.
    pub fn starting() -> Self {
        let mut castling = Bitboard(0);
        for color in BOTH_COLORS {
            for side in CastleSide::BOTH {
                castling = castling | Bitboard::from(side.rook_home(color));
            }
        }
        Self {
            placement: shakmaty::Board::new(),
            castling,
            ..Self::empty()
        }
    }

    pub fn turn(&self) -> Color {
        self.turn
    }

    /// Rook home squares with a castling right, as shakmaty's `Setup` stores them.
    pub fn castling_rights(&self) -> Bitboard {
        self.castling
    }

    pub fn has_castling_right(&self, color: Color, side: CastleSide) -> bool {
        self.castling.contains(side.rook_home(color))
    }

    pub fn ep_square(&self) -> Option<Square> {
        self.ep_square
    }

    pub fn halfmove_clock(&self) -> u32 {
        self.halfmoves
    }

    pub fn fullmove_number(&self) -> u32 {
        self.fullmoves
    }

    pub fn placement(&self) -> &shakmaty::Board {
        &self.placement
    }

    pub fn piece_at(&self, square: Square) -> Option<Piece> {
        self.placement.piece_at(square)
    }

    pub fn set_piece_at(&mut self, square: Square, piece: Option<Piece>) {
        match piece {
            Some(piece) => self.placement.set_piece_at(square, piece),
            None => {
                let _ = self.placement.remove_piece_at(square);
            }
        }
    }

    pub fn is_occupied(&self, square: Square) -> bool {
        self.placement.occupied().contains(square)
    }

    /// Whether `square` holds a piece of `color`.
    pub fn is_occupied_by(&self, square: Square, color: Color) -> bool {
        self.placement.by_color(color).contains(square)
    }

    /// Every occupied square holding a piece of `color`, in square order.
    pub fn pieces(&self, color: Color) -> impl Iterator<Item = (Square, Piece)> + '_ {
        self.placement
            .by_color(color)
            .into_iter()
            .filter_map(move |square| self.piece_at(square).map(|piece| (square, piece)))
    }

    /// Square of `color`'s king, `None` once it has been captured.
    pub fn king(&self, color: Color) -> Option<Square> {
        (self.placement.by_color(color) & self.placement.by_role(Role::King)).first()
    }

    pub fn fingerprint(&self) -> Fingerprint {
        let by_role = |role| self.placement.by_role(role);
        Fingerprint {
            layers: [
                self.placement.by_color(Color::White),
                self.placement.by_color(Color::Black),
                by_role(Role::Pawn),
                by_role(Role::Knight),
                by_role(Role::Bishop),
                by_role(Role::Rook),
                by_role(Role::Queen),
                by_role(Role::King),
            ],
            turn: self.turn,
            castling: self.castling,
            ep_square: self.ep_square,
        }
    }

    /// The board as the side to move could reconstruct it from its own pieces alone.
    pub fn without_opponent_pieces(&self) -> Board {
        let mut board = self.clone();
        let opponent = !self.turn;
        for square in self.placement.by_color(opponent) {
            board.set_piece_at(square, None);
        }
        board.strip_rights_of(opponent);
        board
    }

    /// Applies a move that is known to be executable (a taken move).
    ///
    /// A move whose origin is empty is played as a pass.
    pub fn push(&mut self, mv: Move) {
        let mover = self.turn;
        let previous_ep = self.ep_square.take();
        self.halfmoves = self.halfmoves.saturating_add(1);

        if let Move::Normal {
            from,
            to,
            promotion,
        } = mv
            && let Some(piece) = self.piece_at(from)
        {
            let captured = self.piece_at(to);
            if piece.role == Role::Pawn || captured.is_some() {
                self.halfmoves = 0;
            }

            if piece.role == Role::Pawn
                && Some(to) == previous_ep
                && from.file_index() != to.file_index()
                && captured.is_none()
                && let Some(victim) = to.shift(0, -mover.pawn_dir())
            {
                self.set_piece_at(victim, None);
            }

            if piece.role == Role::King && from.file_index().abs_diff(to.file_index()) == 2 {
                let side = if to.file_index() > from.file_index() {
                    CastleSide::King
                } else {
                    CastleSide::Queen
                };
                let rank = from.rank_index();
                let rook_from = square_at(side.rook_file(), rank);
                let rook_to = square_at(side.rook_target_file(), rank);
                let rook = self.piece_at(rook_from);
                self.set_piece_at(rook_from, None);
                self.set_piece_at(rook_to, rook);
            }

            if piece.role == Role::King {
                self.strip_rights_of(mover);
            }
            // Rights live on rook home squares, so touching one drops it.
            self.castling = self.castling & !(Bitboard::from(from) | Bitboard::from(to));

            let placed = match promotion {
                Some(role) if piece.role == Role::Pawn => Piece { color: mover, role },
                _ => piece,
            };
            self.set_piece_at(from, None);
            self.set_piece_at(to, Some(placed));

            if piece.role == Role::Pawn && from.rank_index().abs_diff(to.rank_index()) == 2 {
                self.ep_square = from
                    .shift(0, mover.pawn_dir())
                    .filter(|_| self.ep_capturable(to, !mover));
            }
        }

        if mover == Color::Black {
            self.fullmoves = self.fullmoves.saturating_add(1);
        }
        self.turn = !mover;
    }

    /// Copy of the board with `mv` applied.
    pub fn after(&self, mv: Move) -> Board {
        let mut next = self.clone();
        next.push(mv);
        next
    }

    /// An en-passant square is only recorded when a pawn of `capturer` stands
    /// beside the pawn that just advanced two ranks.
    pub(crate) fn ep_capturable(&self, landed: Square, capturer: Color) -> bool {
        let pawn = Piece {
            color: capturer,
            role: Role::Pawn,
        };
        [-1, 1]
            .iter()
            .filter_map(|df| landed.shift(*df, 0))
            .any(|side| self.piece_at(side) == Some(pawn))
    }

    fn strip_rights_of(&mut self, color: Color) {
        for side in CastleSide::BOTH {
            self.castling = self.castling & !Bitboard::from(side.rook_home(color));
        }
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::starting()
    }
}

impl PartialEq for Board {
    fn eq(&self, other: &Self) -> bool {
        self.fingerprint() == other.fingerprint()
    }
}

impl Eq for Board {}

impl Hash for Board {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.fingerprint().hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sq(name: &str) -> Square {
        name.parse().unwrap()
    }

    fn mv(uci: &str) -> Move {
        uci.parse().unwrap()
    }

    fn piece(color: Color, role: Role) -> Option<Piece> {
        Some(Piece { color, role })
    }

    #[test]
    fn starting_position_layout() {
        let board = Board::starting();
        assert_eq!(board.piece_at(sq("e1")), piece(Color::White, Role::King));
        assert_eq!(board.piece_at(sq("d8")), piece(Color::Black, Role::Queen));
        assert_eq!(board.pieces(Color::White).count(), 16);
        assert_eq!(board.king(Color::Black), Some(sq("e8")));
        for color in BOTH_COLORS {
            for side in CastleSide::BOTH {
                assert!(board.has_castling_right(color, side));
            }
        }
    }

    #[test]
    fn counters_do_not_affect_equality() {
        let mut a = Board::starting();
        a.push(mv("g1f3"));
        a.push(mv("g8f6"));
        a.push(mv("f3g1"));
        a.push(mv("f6g8"));
        let b = Board::starting();
        assert_ne!(a.fullmove_number(), b.fullmove_number());
        assert_eq!(a, b);
        assert_eq!(a.fingerprint(), b.fingerprint());
    }

    #[test]
    fn double_push_records_ep_only_when_capturable() {
        let mut board = Board::starting();
        board.push(mv("e2e4"));
        assert_eq!(board.ep_square(), None);

        let mut board = Board::starting();
        for uci in ["e2e4", "0000", "e4e5", "f7f5"] {
            board.push(mv(uci));
        }
        assert_eq!(board.ep_square(), Some(sq("f6")));
        board.push(mv("e5f6"));
        assert_eq!(board.piece_at(sq("f5")), None);
        assert_eq!(board.piece_at(sq("f6")), piece(Color::White, Role::Pawn));
    }

    #[test]
    fn castling_moves_the_rook_and_clears_rights() {
        let mut board = Board::starting();
        for uci in ["e2e3", "0000", "f1e2", "0000", "g1f3", "0000", "e1g1"] {
            board.push(mv(uci));
        }
        assert_eq!(board.piece_at(sq("f1")), piece(Color::White, Role::Rook));
        assert_eq!(board.piece_at(sq("h1")), None);
        assert!(!board.has_castling_right(Color::White, CastleSide::King));
        assert!(!board.has_castling_right(Color::White, CastleSide::Queen));
        assert!(board.has_castling_right(Color::Black, CastleSide::King));
    }

    #[test]
    fn capturing_a_corner_rook_drops_its_right() {
        let mut board = Board::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1").unwrap();
        board.push(mv("a1a8"));
        assert!(!board.has_castling_right(Color::Black, CastleSide::Queen));
        assert!(!board.has_castling_right(Color::White, CastleSide::Queen));
        assert!(board.has_castling_right(Color::Black, CastleSide::King));
    }

    #[test]
    fn pass_flips_turn_and_clears_ep() {
        let mut board = Board::starting();
        board.push(Move::Pass);
        assert_eq!(board.turn(), Color::Black);
        assert_eq!(board.fullmove_number(), 1);
        board.push(Move::Pass);
        assert_eq!(board.fullmove_number(), 2);
    }

    #[test]
    fn without_opponent_pieces_keeps_own_side() {
        let board = Board::starting().without_opponent_pieces();
        assert_eq!(board.pieces(Color::Black).count(), 0);
        assert_eq!(board.pieces(Color::White).count(), 16);
        assert!(!board.has_castling_right(Color::Black, CastleSide::King));
        assert!(board.has_castling_right(Color::White, CastleSide::King));
    }
}
