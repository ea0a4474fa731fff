mod mht;
mod params;

pub use mht::MhtBot;
pub use params::BotParams;

use recon_core::history::WinReason;
use recon_core::model::board::Board;
use recon_core::model::chess_move::Move;
use recon_core::model::color::Color;
use recon_core::model::square::Square;
use recon_core::simulate::SenseObservation;
use std::time::Duration;

/// Callbacks a game driver makes on a player, in turn order.
///
/// Each turn is: opponent move result, sense choice, sense result, move choice,
/// move result. White's first opponent move result carries no move.
pub trait Player {
    fn handle_game_start(&mut self, color: Color, board: &Board, opponent_name: &str);

    fn handle_opponent_move_result(&mut self, captured_my_piece: bool, capture: Option<Square>);

    fn choose_sense(
        &mut self,
        sense_actions: &[Square],
        move_actions: &[Move],
        time_left: Duration,
    ) -> Option<Square>;

    fn handle_sense_result(&mut self, observation: &SenseObservation);

    fn choose_move(&mut self, move_actions: &[Move], time_left: Duration) -> Move;

    fn handle_move_result(
        &mut self,
        requested: Move,
        taken: Move,
        captured_opponent_piece: bool,
        capture: Option<Square>,
    );

    fn handle_game_end(&mut self, winner: Option<Color>, reason: Option<WinReason>);
}
