//! FEN / EPD reading and writing through [`shakmaty::fen`].

use super::board::{Board, CastleSide};
use super::color::{BOTH_COLORS, Color, ColorExt};
use super::piece::{Piece, Role};
use super::square::{SquareExt, square_at};
use core::num::NonZeroU32;
use core::str::FromStr;
use shakmaty::fen::{Epd, Fen, LossyFenError, ParseFenError};
use shakmaty::{Bitboard, Setup};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FenError {
    #[error("expected 4 to 6 fields, found {0}")]
    FieldCount(usize),
    #[error(transparent)]
    Parse(#[from] ParseFenError),
    #[error("invalid castling field `{0}`")]
    Castling(String),
    #[error("en-passant square `{0}` is not on the pushed pawn's rank")]
    EnPassant(String),
}

impl Board {
    /// Parses a full FEN or a four-field EPD.
    ///
    /// Castling rights without the matching king and rook on their home squares are
    /// dropped, and an en-passant square nobody can capture on is discarded, so that
    /// equal positions always produce equal fingerprints.
    pub fn from_fen(text: &str) -> Result<Board, FenError> {
        let mut fields: Vec<&str> = text.split_whitespace().collect();
        if !(4..=6).contains(&fields.len()) {
            return Err(FenError::FieldCount(fields.len()));
        }
        // shakmaty resolves castling letters against the rooks it finds; rights
        // are read here instead so that stale letters can be dropped quietly.
        let claimed = parse_castling(fields[2])?;
        fields[2] = "-";
        let setup = Fen::from_ascii(fields.join(" ").as_bytes())?.into_setup();

        let mut board = Board {
            placement: setup.board,
            turn: setup.turn,
            castling: Bitboard(0),
            ep_square: None,
            halfmoves: setup.halfmoves,
            fullmoves: setup.fullmoves.get(),
        };
        board.castling = board.cleaned_castling(claimed);

        if let Some(square) = setup.ep_square {
            let pushed_rank = match board.turn {
                Color::White => 5,
                Color::Black => 2,
            };
            if square.rank_index() != pushed_rank {
                return Err(FenError::EnPassant(square.to_string()));
            }
            board.ep_square = square
                .shift(0, -board.turn.pawn_dir())
                .filter(|landed| board.ep_capturable(*landed, board.turn))
                .map(|_| square);
        }
        Ok(board)
    }

    /// Full FEN including both counters.
    pub fn fen(&self) -> String {
        Fen::try_from_setup(self.to_setup()).unwrap_or_else(LossyFenError::ignore).to_string()
    }

    /// Placement, side to move, castling and en-passant square.
    pub fn epd(&self) -> String {
        Epd::try_from_setup(self.to_setup()).unwrap_or_else(LossyFenError::ignore).to_string()
    }

    pub fn to_setup(&self) -> Setup {
        Setup {
            board: self.placement.clone(),
            turn: self.turn,
            castling_rights: self.castling,
            ep_square: self.ep_square,
            halfmoves: self.halfmoves,
            fullmoves: NonZeroU32::new(self.fullmoves).unwrap_or(NonZeroU32::MIN),
            ..Setup::empty()
        }
    }

    /// Keeps only rights backed by a king on the e-file and a rook in its corner.
    fn cleaned_castling(&self, claimed: Bitboard) -> Bitboard {
        let mut rights = Bitboard(0);
        for color in BOTH_COLORS {
            let king = Piece {
                color,
                role: Role::King,
            };
            let rook = Piece {
                color,
                role: Role::Rook,
            };
            if self.piece_at(square_at(4, color.home_rank())) != Some(king) {
                continue;
            }
            for side in CastleSide::BOTH {
                let home = side.rook_home(color);
                if claimed.contains(home) && self.piece_at(home) == Some(rook) {
                    rights = rights | Bitboard::from(home);
                }
            }
        }
        rights
    }
}

fn parse_castling(field: &str) -> Result<Bitboard, FenError> {
    if field == "-" {
        return Ok(Bitboard(0));
    }
    let mut claimed = Bitboard(0);
    for symbol in field.chars() {
        let (color, side) = match symbol {
            'K' => (Color::White, CastleSide::King),
            'Q' => (Color::White, CastleSide::Queen),
            'k' => (Color::Black, CastleSide::King),
            'q' => (Color::Black, CastleSide::Queen),
            _ => return Err(FenError::Castling(field.to_string())),
        };
        claimed = claimed | Bitboard::from(side.rook_home(color));
    }
    Ok(claimed)
}

impl FromStr for Board {
    type Err = FenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Board::from_fen(s)
    }
}
