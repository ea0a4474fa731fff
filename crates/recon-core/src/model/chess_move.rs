use super::piece::{PROMOTIONS, Role, role_from_symbol};
use super::square::{Square, SquareParseError, parse_square};
use core::cmp::Ordering;
use core::fmt;
use core::str::FromStr;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A move request or a move actually carried out.
///
/// Requests can be impossible on the true board and passing is a legal action,
/// so this is not shakmaty's `Move`: only the squares and the promotion piece
/// are known when a move is asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum Move {
    Pass,
    Normal {
        from: Square,
        to: Square,
        promotion: Option<Role>,
    },
}

impl Move {
    pub const PASS_UCI: &'static str = "0000";

    pub const fn new(from: Square, to: Square) -> Self {
        Move::Normal {
            from,
            to,
            promotion: None,
        }
    }

    pub const fn with_promotion(from: Square, to: Square, promotion: Role) -> Self {
        Move::Normal {
            from,
            to,
            promotion: Some(promotion),
        }
    }

    pub const fn is_pass(self) -> bool {
        matches!(self, Move::Pass)
    }

    pub const fn from_square(self) -> Option<Square> {
        match self {
            Move::Pass => None,
            Move::Normal { from, .. } => Some(from),
        }
    }

    pub const fn to_square(self) -> Option<Square> {
        match self {
            Move::Pass => None,
            Move::Normal { to, .. } => Some(to),
        }
    }

    pub const fn promotion(self) -> Option<Role> {
        match self {
            Move::Pass => None,
            Move::Normal { promotion, .. } => promotion,
        }
    }

    /// Same origin and promotion, ending on `to` instead.
    pub const fn retarget(self, to: Square) -> Move {
        match self {
            Move::Pass => Move::Pass,
            Move::Normal {
                from, promotion, ..
            } => Move::Normal {
                from,
                to,
                promotion,
            },
        }
    }

    pub fn uci(self) -> String {
        match self {
            Move::Pass => Self::PASS_UCI.to_string(),
            Move::Normal {
                from,
                to,
                promotion,
            } => match promotion {
                Some(role) => format!("{from}{to}{}", role.char()),
                None => format!("{from}{to}"),
            },
        }
    }

    /// Pass first, then by origin, destination and promotion piece.
    fn sort_key(self) -> (u8, u32, u32, u8) {
        match self {
            Move::Pass => (0, 0, 0, 0),
            Move::Normal {
                from,
                to,
                promotion,
            } => (
                1,
                u32::from(from),
                u32::from(to),
                promotion.map_or(0, |role| role as u8),
            ),
        }
    }
}

impl Ord for Move {
    fn cmp(&self, other: &Self) -> Ordering {
        self.sort_key().cmp(&other.sort_key())
    }
}

impl PartialOrd for Move {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.uci())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MoveParseError {
    #[error("move '{0}' must be four or five characters")]
    Length(String),
    #[error("move '{text}' has a bad square: {source}")]
    Square {
        text: String,
        #[source]
        source: SquareParseError,
    },
    #[error("move '{0}' has an invalid promotion piece")]
    Promotion(String),
}

impl FromStr for Move {
    type Err = MoveParseError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        if text == Self::PASS_UCI {
            return Ok(Move::Pass);
        }
        if !text.is_ascii() || !(4..=5).contains(&text.len()) {
            return Err(MoveParseError::Length(text.to_string()));
        }
        let square = |part: &str| {
            parse_square(part).map_err(|source| MoveParseError::Square {
                text: text.to_string(),
                source,
            })
        };
        let from = square(&text[0..2])?;
        let to = square(&text[2..4])?;
        let promotion = match text[4..].chars().next() {
            None => None,
            Some(symbol) => match role_from_symbol(symbol) {
                Some(role) if PROMOTIONS.contains(&role) => Some(role),
                _ => return Err(MoveParseError::Promotion(text.to_string())),
            },
        };
        Ok(Move::Normal {
            from,
            to,
            promotion,
        })
    }
}

impl From<Move> for String {
    fn from(mv: Move) -> Self {
        mv.uci()
    }
}

impl TryFrom<String> for Move {
    type Error = MoveParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}
