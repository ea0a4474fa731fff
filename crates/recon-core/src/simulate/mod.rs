//! Pure functions describing what an action looks like from behind the fog.
//!
//! - `observation`: the 3×3 sense window and its compact text form.
//! - `outcome`: move revision, capture squares and the move sets a side could
//!   request or actually play.

mod observation;
mod outcome;

pub use observation::{ObservationError, SenseObservation, simulate_sense};
pub use outcome::{
    MoveOutcome, capture_square_of_move, possible_requested_moves, possible_taken_moves,
    simulate_move,
};
