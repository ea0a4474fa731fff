//! Chess primitives for the hidden-information variant.
//!
//! Squares, pieces, placement, attack tables and FEN text come from `shakmaty`.
//! What lives here is the variant layer on top: passing as a move, kings that can
//! be captured, castling without attack checks and the relaxed en-passant rule.

pub mod board;
pub mod chess_move;
pub mod color;
pub mod fen;
mod movegen;
pub mod piece;
pub mod square;
