use recon_bot::{BotParams, GreedyEngine, MhtBot, Player};
use recon_core::belief::TruncationStrategy;
use recon_core::model::board::Board;
use recon_core::model::chess_move::Move;
use recon_core::model::color::{Color, ColorExt};
use recon_core::model::square::{Square, all_squares};
use recon_core::simulate::{possible_requested_moves, simulate_move, simulate_sense};
use std::time::Duration;

fn params(seed: u64) -> BotParams {
    BotParams {
        max_hypotheses: 1_000_000,
        truncation: TruncationStrategy::Prefix,
        vote_sample: 32,
        depth: 1,
        multipv: 3,
        turn_budget: None,
        seed: Some(seed),
    }
}

/// Runs `plies` half-moves between two bots, checking after every observation
/// that the acting bot still considers the true board possible.
fn play(plies: usize) -> (Board, Vec<Move>) {
    let mut bots = [
        MhtBot::new(GreedyEngine, params(11)),
        MhtBot::new(GreedyEngine, params(12)),
    ];
    let mut board = Board::starting();
    bots[0].handle_game_start(Color::White, &board, "black-bot");
    bots[1].handle_game_start(Color::Black, &board, "white-bot");

    let sense_actions: Vec<Square> = all_squares().collect();
    let mut last_capture = None;
    let mut taken_moves = Vec::new();

    for _ in 0..plies {
        let bot = &mut bots[board.turn().slot()];
        bot.handle_opponent_move_result(last_capture.is_some(), last_capture);
        assert!(bot.tracker().contains(&board), "lost truth after expansion");

        let move_actions = possible_requested_moves(&board);
        let sense = bot.choose_sense(&sense_actions, &move_actions, Duration::ZERO);
        bot.handle_sense_result(&simulate_sense(&board, sense));
        assert!(bot.tracker().contains(&board), "lost truth after sensing");

        let requested = bot.choose_move(&move_actions, Duration::ZERO);
        let outcome = simulate_move(&board, requested);
        bot.handle_move_result(
            requested,
            outcome.taken,
            outcome.capture.is_some(),
            outcome.capture,
        );
        board.push(outcome.taken);
        assert!(bot.tracker().contains(&board), "lost truth after moving");

        taken_moves.push(outcome.taken);
        last_capture = outcome.capture;
        if board.king(board.turn()).is_none() {
            break;
        }
    }
    (board, taken_moves)
}

#[test]
fn both_bots_keep_the_true_board_through_the_opening() {
    let (_, moves) = play(6);
    assert!(!moves.is_empty());
}

#[test]
fn seeded_bots_replay_identically() {
    assert_eq!(play(4), play(4));
}

#[test]
fn empty_belief_falls_back_to_a_candidate_move() {
    let mut bot = MhtBot::new(GreedyEngine, params(5));
    let board = Board::starting();
    bot.handle_game_start(Color::White, &board, "opponent");
    bot.handle_opponent_move_result(false, None);
    // A pass reported for e2e4 is impossible from the starting position.
    bot.handle_move_result("e2e4".parse().unwrap(), Move::Pass, false, None);
    assert!(bot.tracker().is_empty());

    let actions = possible_requested_moves(&board);
    let choice = bot.choose_move(&actions, Duration::ZERO);
    assert!(actions.contains(&choice));
}

#[test]
fn white_skips_expansion_on_first_turn() {
    let mut bot = MhtBot::new(GreedyEngine, params(6));
    bot.handle_game_start(Color::White, &Board::starting(), "opponent");
    bot.handle_opponent_move_result(false, None);
    assert_eq!(bot.tracker().len(), 1);
    assert_eq!(
        bot.choose_sense(&[], &[], Duration::ZERO),
        None,
        "a single hypothesis needs no sense"
    );
}
