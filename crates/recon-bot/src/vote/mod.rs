//! Ranked-choice aggregation of per-hypothesis engine advice.
//!
//! - `ballot`: turning one hypothesis into ranked groups of requested moves.
//! - `tally`: the run-off over all ballots.

mod ballot;
mod tally;

pub use ballot::{Ballot, MoveVoter, VoteOutcome, VoteParams};
pub use tally::run_off;
