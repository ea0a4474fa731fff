//! Pseudo-legal move generation on shakmaty's attack tables.
//!
//! Kings may be left in check or captured, and castling only needs the right and an
//! empty path between king and rook. Attacked squares are not considered.

use super::board::{Board, CastleSide};
use super::chess_move::Move;
use super::color::{Color, ColorExt};
use super::piece::{PROMOTIONS, Piece, Role};
use super::square::{Square, SquareExt, square_at};
use shakmaty::{Bitboard, attacks};

impl Board {
    /// Every pseudo-legal move for the side to move, grouped by origin square.
    pub fn pseudo_legal_moves(&self) -> Vec<Move> {
        let mut out = Vec::with_capacity(48);
        for (from, piece) in self.pieces(self.turn) {
            self.moves_from(from, piece, &mut out);
        }
        out
    }

    pub fn is_pseudo_legal(&self, mv: Move) -> bool {
        let Move::Normal { from, .. } = mv else {
            return false;
        };
        match self.piece_at(from) {
            Some(piece) if piece.color == self.turn => {
                let mut out = Vec::with_capacity(16);
                self.moves_from(from, piece, &mut out);
                out.contains(&mv)
            }
            _ => false,
        }
    }

    /// The own king leaving its home square two files sideways.
    pub fn is_castling(&self, mv: Move) -> bool {
        let Move::Normal { from, to, .. } = mv else {
            return false;
        };
        self.piece_at(from) == Some(Piece { color: self.turn, role: Role::King })
            && from == square_at(4, self.turn.home_rank())
            && to.rank_index() == from.rank_index()
            && from.file_index().abs_diff(to.file_index()) == 2
    }

    pub fn is_en_passant(&self, mv: Move) -> bool {
        let Move::Normal { from, to, .. } = mv else {
            return false;
        };
        self.ep_square == Some(to)
            && self.piece_at(from) == Some(Piece { color: self.turn, role: Role::Pawn })
            && from.file_index() != to.file_index()
            && !self.is_occupied(to)
    }

    /// Square whose opponent piece disappears when `mv` is played, if any.
    pub fn capture_square_of(&self, mv: Move) -> Option<Square> {
        let Move::Normal { to, .. } = mv else {
            return None;
        };
        if self.is_en_passant(mv) {
            return to.shift(0, -self.turn.pawn_dir());
        }
        self.is_occupied_by(to, !self.turn).then_some(to)
    }

    pub fn is_capture(&self, mv: Move) -> bool {
        self.capture_square_of(mv).is_some()
    }

    /// Pieces of `attacker` that attack `target`.
    pub fn attackers_of(&self, attacker: Color, target: Square) -> Bitboard {
        let placement = &self.placement;
        let occupied = placement.occupied();
        let queens = placement.by_role(Role::Queen);
        let reach = (attacks::knight_attacks(target) & placement.by_role(Role::Knight))
            | (attacks::king_attacks(target) & placement.by_role(Role::King))
            | (attacks::pawn_attacks(!attacker, target) & placement.by_role(Role::Pawn))
            | (attacks::rook_attacks(target, occupied) & (placement.by_role(Role::Rook) | queens))
            | (attacks::bishop_attacks(target, occupied)
                & (placement.by_role(Role::Bishop) | queens));
        reach & placement.by_color(attacker)
    }

    pub fn is_attacked_by(&self, attacker: Color, target: Square) -> bool {
        !self.attackers_of(attacker, target).is_empty()
    }

    /// The side to move can take the opponent's king right now.
    pub fn king_capturable(&self) -> bool {
        self.king(!self.turn)
            .is_some_and(|king| self.is_attacked_by(self.turn, king))
    }

    fn moves_from(&self, from: Square, piece: Piece, out: &mut Vec<Move>) {
        let occupied = self.placement.occupied();
        let reach = match piece.role {
            Role::Pawn => return self.pawn_moves(from, piece.color, out),
            Role::Knight => attacks::knight_attacks(from),
            Role::Bishop => attacks::bishop_attacks(from, occupied),
            Role::Rook => attacks::rook_attacks(from, occupied),
            Role::Queen => attacks::queen_attacks(from, occupied),
            Role::King => attacks::king_attacks(from),
        };
        let targets = reach & !self.placement.by_color(piece.color);
        out.extend(targets.into_iter().map(|to| Move::new(from, to)));
        if piece.role == Role::King {
            self.castling_moves(from, piece.color, out);
        }
    }

    fn pawn_moves(&self, from: Square, color: Color, out: &mut Vec<Move>) {
        let forward = color.pawn_dir();
        if let Some(one) = from.shift(0, forward)
            && !self.is_occupied(one)
        {
            push_pawn_move(from, one, out);
            let start_rank = (color.home_rank() as i32 + forward) as u32;
            if from.rank_index() == start_rank
                && let Some(two) = one.shift(0, forward)
                && !self.is_occupied(two)
            {
                out.push(Move::new(from, two));
            }
        }
        let mut takeable = self.placement.by_color(!color);
        if let Some(ep) = self.ep_square.filter(|ep| !self.is_occupied(*ep)) {
            takeable = takeable | Bitboard::from(ep);
        }
        for target in attacks::pawn_attacks(color, from) & takeable {
            push_pawn_move(from, target, out);
        }
    }

    fn castling_moves(&self, from: Square, color: Color, out: &mut Vec<Move>) {
        let rank = color.home_rank();
        if from != square_at(4, rank) {
            return;
        }
        let rook = Piece {
            color,
            role: Role::Rook,
        };
        for side in CastleSide::BOTH {
            let rook_square = side.rook_home(color);
            if !self.has_castling_right(color, side) || self.piece_at(rook_square) != Some(rook) {
                continue;
            }
            if (attacks::between(from, rook_square) & self.placement.occupied()).is_empty() {
                out.push(Move::new(from, square_at(side.king_target_file(), rank)));
            }
        }
    }
}

fn push_pawn_move(from: Square, to: Square, out: &mut Vec<Move>) {
    if to.rank_index() == 0 || to.rank_index() == 7 {
        for role in PROMOTIONS {
            out.push(Move::with_promotion(from, to, role));
        }
    } else {
        out.push(Move::new(from, to));
    }
}
