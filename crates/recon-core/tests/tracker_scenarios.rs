use recon_core::belief::{ExpansionBudget, HypothesisTracker};
use recon_core::model::board::Board;
use recon_core::model::chess_move::Move;
use recon_core::model::color::Color;
use recon_core::model::piece::{Piece, Role};
use recon_core::model::square::Square;
use recon_core::simulate::{simulate_move, simulate_sense};
use std::collections::HashSet;
use std::time::Duration;

fn sq(name: &str) -> Square {
    name.parse().unwrap()
}

fn mv(uci: &str) -> Move {
    uci.parse().unwrap()
}

#[test]
fn sensing_c2_on_start_reads_rank_then_file() {
    let observation = simulate_sense(&Board::starting(), Some(sq("c2")));
    let names: Vec<String> = observation
        .cells()
        .iter()
        .map(|(square, _)| square.to_string())
        .collect();
    assert_eq!(
        names,
        ["b1", "c1", "d1", "b2", "c2", "d2", "b3", "c3", "d3"]
    );
    let white = |role| {
        Some(Piece {
            color: Color::White,
            role,
        })
    };
    let pieces: Vec<_> = observation.cells().iter().map(|(_, p)| *p).collect();
    assert_eq!(
        pieces,
        vec![
            white(Role::Knight),
            white(Role::Bishop),
            white(Role::Queen),
            white(Role::Pawn),
            white(Role::Pawn),
            white(Role::Pawn),
            None,
            None,
            None,
        ]
    );
}

/// Plays a short game on both the true board and black's tracker.
#[test]
fn black_tracker_follows_a_knight_raid() {
    let mut truth = Board::starting();
    let mut tracker = HypothesisTracker::new();
    let script = [
        ("g1h3", "c2", "d7d5"),
        ("h3f4", "f2", "e7e5"),
        ("f4h5", "c2", "g8f6"),
    ];

    for (white_move, sense_at, black_move) in script {
        let white_move = mv(white_move);
        let capture = truth.capture_square_of(white_move);
        truth.push(white_move);
        tracker.op_move(capture);
        assert!(tracker.contains(&truth));

        let square = Some(sq(sense_at));
        tracker.sense(square, &simulate_sense(&truth, square));
        assert!(tracker.contains(&truth));

        let requested = mv(black_move);
        let outcome = simulate_move(&truth, requested);
        tracker.apply_move(requested, outcome.taken, outcome.capture);
        truth.push(outcome.taken);
        assert!(tracker.contains(&truth));
    }

    // White's knight now takes on f6; the capture square pins down the raider.
    let raid = mv("h5f6");
    let capture = truth.capture_square_of(raid);
    assert_eq!(capture, Some(sq("f6")));
    truth.push(raid);
    tracker.op_move(capture);
    assert!(tracker.contains(&truth));
    assert!(tracker.boards().iter().all(|board| {
        board
            .piece_at(sq("f6"))
            .is_some_and(|piece| piece.color == Color::White)
    }));
}

#[test]
fn expansion_never_keeps_duplicate_fingerprints() {
    // Two copies of the same position expand to one deduplicated set.
    let mut black_to_move = Board::starting();
    black_to_move.push(Move::Pass);
    let mut single = HypothesisTracker::from_boards(vec![black_to_move.clone()]);
    let mut doubled = HypothesisTracker::from_boards(vec![black_to_move.clone(), black_to_move]);
    single.op_move(None);
    doubled.op_move(None);
    assert_eq!(single.boards(), doubled.boards());

    let fingerprints: HashSet<_> = doubled.boards().iter().map(Board::fingerprint).collect();
    assert_eq!(fingerprints.len(), doubled.len());
}

#[test]
fn capture_observation_narrows_expansion() {
    // White rook can take either the e5 pawn or the h1 knight; black only saw e5 vanish.
    let board = Board::from_fen("4k3/8/8/4p3/8/8/8/4R1Kn w - - 0 1").unwrap();
    let mut tracker = HypothesisTracker::from_boards(vec![board.clone()]);
    tracker.op_move(Some(sq("e5")));
    assert_eq!(tracker.len(), 1);
    assert_eq!(tracker.boards()[0], board.after(mv("e1e5")));

    let mut tracker = HypothesisTracker::from_boards(vec![board.clone()]);
    tracker.op_move(Some(sq("h1")));
    assert_eq!(tracker.boards(), &[board.after(mv("g1h1"))]);
}

#[test]
fn sense_filter_is_sound_against_truth() {
    let mut tracker = HypothesisTracker::new();
    tracker.apply_move(mv("e2e4"), mv("e2e4"), None);
    tracker.op_move(None);
    let candidates = tracker.boards().to_vec();
    for (index, truth) in candidates.iter().enumerate().step_by(4) {
        for square in ["d6", "e6", "f6", "b7"] {
            let mut copy = tracker.clone();
            let square = Some(sq(square));
            copy.sense(square, &simulate_sense(truth, square));
            assert!(copy.contains(truth), "board {index} lost after sensing");
        }
    }
}

/// White's view after passing twice: a few hundred boards with black to move next.
fn wide_tracker() -> HypothesisTracker {
    let mut tracker = HypothesisTracker::new();
    tracker.apply_move(Move::Pass, Move::Pass, None);
    tracker.op_move(None);
    tracker.apply_move(Move::Pass, Move::Pass, None);
    tracker.op_move(None);
    tracker
}

#[test]
fn expired_budget_still_expands_a_leading_slice() {
    let base = wide_tracker();
    assert!(base.len() > 100);

    let mut first = base.clone();
    let report = first.op_move_within(None, ExpansionBudget::within(Duration::ZERO));
    assert!(report.expanded > 0);
    assert!(report.expanded < report.input);
    assert!(report.is_reduced());
    assert!(!first.is_empty());

    let mut second = base.clone();
    second.op_move_within(None, ExpansionBudget::within(Duration::ZERO));
    assert_eq!(first.boards(), second.boards());

    let mut reference =
        HypothesisTracker::from_boards(base.boards()[..report.expanded].to_vec());
    reference.op_move(None);
    assert_eq!(first.boards(), reference.boards());
}

#[test]
fn board_cap_bounds_generation() {
    let base = wide_tracker();
    let mut capped = base.clone();
    let report = capped.op_move_within(None, ExpansionBudget::UNBOUNDED.with_max_boards(1));

    let mut lone = HypothesisTracker::from_boards(vec![base.boards()[0].clone()]);
    let fan_out = lone.op_move(None).generated;

    assert_eq!(capped.len(), 1);
    assert_eq!(report.expanded, 1);
    assert_eq!(report.generated, fan_out);
    assert!(report.capped);
    assert_eq!(capped.boards()[0], lone.boards()[0]);
}
