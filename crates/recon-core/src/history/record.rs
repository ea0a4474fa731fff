use crate::model::chess_move::{Move, MoveParseError};
use crate::model::square::{Square, SquareParseError, parse_square};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Token recorded when a side chose not to sense.
pub const NO_SENSE_TOKEN: &str = "00";

/// One half-turn step of a recorded game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Sense(Option<Square>),
    Move(Move),
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Sense(None) => f.write_str(NO_SENSE_TOKEN),
            Action::Sense(Some(square)) => write!(f, "{square}"),
            Action::Move(mv) => write!(f, "{mv}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HistoryError {
    #[error("token {index} (`{token}`) is not a sense square: {source}")]
    Sense {
        index: usize,
        token: String,
        source: SquareParseError,
    },
    #[error("token {index} (`{token}`) is not a move: {source}")]
    Move {
        index: usize,
        token: String,
        source: MoveParseError,
    },
}

/// A game as a flat alternation of sense and move tokens, white first.
///
/// `"00 e2e3 f2 f7f5 c7"` means white did not sense and pushed e2e3, black
/// sensed f2 and played f7f5, then white sensed c7.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct GameRecord {
    actions: Vec<Action>,
}

impl GameRecord {
    pub fn parse(text: &str) -> Result<Self, HistoryError> {
        let actions = text
            .split_whitespace()
            .enumerate()
            .map(|(index, token)| parse_token(index, token))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { actions })
    }

    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    pub fn num_actions(&self) -> usize {
        self.actions.len()
    }

    pub fn num_moves(&self) -> usize {
        self.actions.len() / 2
    }

    pub fn num_moves_by_white(&self) -> usize {
        self.num_moves().div_ceil(2)
    }

    pub fn num_moves_by_black(&self) -> usize {
        self.num_moves() / 2
    }
}

fn parse_token(index: usize, token: &str) -> Result<Action, HistoryError> {
    if index % 2 == 0 {
        if token == NO_SENSE_TOKEN {
            return Ok(Action::Sense(None));
        }
        parse_square(token)
            .map(|square| Action::Sense(Some(square)))
            .map_err(|source| HistoryError::Sense {
                index,
                token: token.to_string(),
                source,
            })
    } else {
        token
            .parse::<Move>()
            .map(Action::Move)
            .map_err(|source| HistoryError::Move {
                index,
                token: token.to_string(),
                source,
            })
    }
}

impl FromStr for GameRecord {
    type Err = HistoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        GameRecord::parse(s)
    }
}

impl TryFrom<String> for GameRecord {
    type Error = HistoryError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        GameRecord::parse(&value)
    }
}

impl From<GameRecord> for String {
    fn from(record: GameRecord) -> Self {
        record.to_string()
    }
}

impl fmt::Display for GameRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, action) in self.actions.iter().enumerate() {
            if index > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{action}")?;
        }
        Ok(())
    }
}
