//! Hypothesis-set analysis that does not need a scoring engine.
//!
//! - `sense`: sense-square screening, partition dominance and minimax sizing.
//! - `win`: forced king captures and moves worth considering at all.

mod sense;
mod win;

pub use sense::{
    INTERIOR_SQUARES, minimax_square, non_dominated_by_own_pieces, partition_dominance,
    recommend_sense,
};
pub use win::{certain_win, non_dominated_moves};
