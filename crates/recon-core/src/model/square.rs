//! Square helpers on top of [`shakmaty::Square`].
//!
//! shakmaty's own `Square::offset` moves by raw index and wraps across files, so
//! the variant code displaces squares through [`SquareExt::shift`] instead.

pub use shakmaty::Square;
use shakmaty::attacks;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid square name '{0}'")]
pub struct SquareParseError(pub String);

/// Parses `e4`-style names, keeping the offending text in the error.
pub fn parse_square(text: &str) -> Result<Square, SquareParseError> {
    text.parse::<Square>()
        .map_err(|_| SquareParseError(text.to_string()))
}

/// Square from zero-based file and rank; both must be below 8.
pub fn square_at(file: u32, rank: u32) -> Square {
    Square::new(rank * 8 + file)
}

/// Every square, `a1` first and `h8` last.
pub fn all_squares() -> impl Iterator<Item = Square> {
    (0..64u32).map(Square::new)
}

pub trait SquareExt: Sized {
    fn slot(self) -> usize;
    fn file_index(self) -> u32;
    fn rank_index(self) -> u32;
    /// Square displaced by `(df, dr)`, or `None` when it falls off the board.
    fn shift(self, df: i32, dr: i32) -> Option<Square>;
    /// Squares strictly between `self` and `other` on a shared line, empty otherwise.
    fn line_to(self, other: Square) -> Vec<Square>;
}

impl SquareExt for Square {
    fn slot(self) -> usize {
        u32::from(self) as usize
    }

    fn file_index(self) -> u32 {
        u32::from(self) % 8
    }

    fn rank_index(self) -> u32 {
        u32::from(self) / 8
    }

    fn shift(self, df: i32, dr: i32) -> Option<Square> {
        let file = self.file_index() as i32 + df;
        let rank = self.rank_index() as i32 + dr;
        if (0..8).contains(&file) && (0..8).contains(&rank) {
            Some(square_at(file as u32, rank as u32))
        } else {
            None
        }
    }

    fn line_to(self, other: Square) -> Vec<Square> {
        attacks::between(self, other).into_iter().collect()
    }
}
