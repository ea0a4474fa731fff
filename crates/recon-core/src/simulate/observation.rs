use crate::model::board::Board;
use crate::model::piece::Piece;
use crate::model::square::{Square, SquareExt};
use thiserror::Error;

const EMPTY_SYMBOL: char = '_';

/// Contents of the sense window, in increasing square order.
///
/// Cells that would fall off the board are dropped rather than padded, so a
/// window centred on an edge square holds fewer than nine cells. No sense at all
/// is the empty observation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct SenseObservation {
    cells: Vec<(Square, Option<Piece>)>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ObservationError {
    #[error("expected {expected} symbols around {center}, found {found}")]
    Length {
        center: Square,
        expected: usize,
        found: usize,
    },
    #[error("invalid piece symbol `{0}`")]
    Symbol(char),
    #[error("square {0} reported twice")]
    DuplicateSquare(Square),
}

impl SenseObservation {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Builds an observation from protocol pairs in any order.
    pub fn from_pairs(
        pairs: impl IntoIterator<Item = (Square, Option<Piece>)>,
    ) -> Result<Self, ObservationError> {
        let mut cells: Vec<_> = pairs.into_iter().collect();
        cells.sort_by_key(|(square, _)| *square);
        if let Some(pair) = cells.windows(2).find(|pair| pair[0].0 == pair[1].0) {
            return Err(ObservationError::DuplicateSquare(pair[0].0));
        }
        Ok(Self { cells })
    }

    pub fn cells(&self) -> &[(Square, Option<Piece>)] {
        &self.cells
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// The sensed square, recoverable only from a full nine-cell window.
    pub fn center(&self) -> Option<Square> {
        (self.cells.len() == 9).then(|| self.cells[4].0)
    }

    /// One symbol per cell, `_` for an empty square.
    pub fn to_compact(&self) -> String {
        self.cells
            .iter()
            .map(|(_, piece)| piece.map_or(EMPTY_SYMBOL, |p| p.char()))
            .collect()
    }

    /// Inverse of [`to_compact`](Self::to_compact) for a window sensed at `center`.
    pub fn from_compact(center: Square, text: &str) -> Result<Self, ObservationError> {
        let squares = window(center);
        let symbols: Vec<char> = text.chars().collect();
        if symbols.len() != squares.len() {
            return Err(ObservationError::Length {
                center,
                expected: squares.len(),
                found: symbols.len(),
            });
        }
        let cells = squares
            .into_iter()
            .zip(symbols)
            .map(|(square, symbol)| {
                if symbol == EMPTY_SYMBOL {
                    Ok((square, None))
                } else {
                    Piece::from_char(symbol)
                        .map(|piece| (square, Some(piece)))
                        .ok_or(ObservationError::Symbol(symbol))
                }
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { cells })
    }
}

/// In-board squares of the 3×3 window around `center`, in increasing order.
fn window(center: Square) -> Vec<Square> {
    let mut squares = Vec::with_capacity(9);
    for dr in -1..=1 {
        for df in -1..=1 {
            if let Some(square) = center.shift(df, dr) {
                squares.push(square);
            }
        }
    }
    squares
}

/// What sensing `square` on `board` would reveal.
pub fn simulate_sense(board: &Board, square: Option<Square>) -> SenseObservation {
    let Some(center) = square else {
        return SenseObservation::empty();
    };
    SenseObservation {
        cells: window(center)
            .into_iter()
            .map(|square| (square, board.piece_at(square)))
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::color::Color;
    use crate::model::piece::Role;

    fn sq(name: &str) -> Square {
        name.parse().unwrap()
    }

    #[test]
    fn corner_window_is_clipped() {
        let observation = simulate_sense(&Board::starting(), Some(Square::A1));
        let squares: Vec<_> = observation.cells().iter().map(|(s, _)| *s).collect();
        assert_eq!(squares, vec![sq("a1"), sq("b1"), sq("a2"), sq("b2")]);
        assert_eq!(observation.center(), None);
    }

    #[test]
    fn no_square_gives_empty_observation() {
        assert!(simulate_sense(&Board::starting(), None).is_empty());
    }

    #[test]
    fn compact_text_round_trips_for_interior_center() {
        let observation = simulate_sense(&Board::starting(), Some(sq("e7")));
        assert_eq!(observation.to_compact(), "___pppqkb");
        let parsed = SenseObservation::from_compact(sq("e7"), &observation.to_compact()).unwrap();
        assert_eq!(parsed, observation);
        assert_eq!(parsed.center(), Some(sq("e7")));
    }

    #[test]
    fn from_pairs_sorts_and_rejects_duplicates() {
        let pawn = Some(Piece {
            color: Color::White,
            role: Role::Pawn,
        });
        let observation =
            SenseObservation::from_pairs([(sq("b2"), pawn), (sq("a1"), None)]).unwrap();
        assert_eq!(observation.cells()[0].0, sq("a1"));
        assert_eq!(
            SenseObservation::from_pairs([(sq("a1"), None), (sq("a1"), pawn)]),
            Err(ObservationError::DuplicateSquare(sq("a1")))
        );
    }

    #[test]
    fn compact_text_rejects_bad_input() {
        assert!(matches!(
            SenseObservation::from_compact(sq("e4"), "___"),
            Err(ObservationError::Length { expected: 9, .. })
        ));
        assert_eq!(
            SenseObservation::from_compact(sq("e4"), "________x"),
            Err(ObservationError::Symbol('x'))
        );
    }
}
