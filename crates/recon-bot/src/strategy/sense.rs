use recon_core::belief::{HypothesisTracker, SensePlan};
use recon_core::model::board::Board;
use recon_core::model::square::{Square, SquareExt};
use std::collections::HashSet;
use tracing::{Level, event};

/// Sense centres whose 3×3 window stays on the board (files b–g, ranks 2–7).
#[rustfmt::skip]
pub static INTERIOR_SQUARES: [Square; 36] = [
    Square::B2, Square::C2, Square::D2, Square::E2, Square::F2, Square::G2,
    Square::B3, Square::C3, Square::D3, Square::E3, Square::F3, Square::G3,
    Square::B4, Square::C4, Square::D4, Square::E4, Square::F4, Square::G4,
    Square::B5, Square::C5, Square::D5, Square::E5, Square::F5, Square::G5,
    Square::B6, Square::C6, Square::D6, Square::E6, Square::F6, Square::G6,
    Square::B7, Square::C7, Square::D7, Square::E7, Square::F7, Square::G7,
];

const ROW_BELOW: [(i32, i32); 3] = [(-1, -1), (0, -1), (1, -1)];
const ROW_ABOVE: [(i32, i32); 3] = [(-1, 1), (0, 1), (1, 1)];
const COLUMN_LEFT: [(i32, i32); 3] = [(-1, -1), (-1, 0), (-1, 1)];
const COLUMN_RIGHT: [(i32, i32); 3] = [(1, -1), (1, 0), (1, 1)];

/// Interior squares left after discarding windows that would partly re-read
/// friendly pieces while a neighbouring window could look further out.
///
/// A square is skipped when the row below it is all ours and it could move up,
/// when the row above is all ours and the square below was kept, and likewise
/// for the left and right columns.
pub fn non_dominated_by_own_pieces(board: &Board) -> Vec<Square> {
    let mover = board.turn();
    let all_own = |center: Square, cells: &[(i32, i32); 3]| {
        cells.iter().all(|(df, dr)| {
            center
                .shift(*df, *dr)
                .is_some_and(|square| board.is_occupied_by(square, mover))
        })
    };

    let mut kept: Vec<Square> = Vec::with_capacity(INTERIOR_SQUARES.len());
    for square in INTERIOR_SQUARES {
        let kept_at = |df: i32, dr: i32| {
            square
                .shift(df, dr)
                .is_some_and(|neighbour| kept.contains(&neighbour))
        };
        if square.rank_index() < 6 && all_own(square, &ROW_BELOW) {
            continue;
        }
        if square.rank_index() > 1 && kept_at(0, -1) && all_own(square, &ROW_ABOVE) {
            continue;
        }
        if square.file_index() < 6 && all_own(square, &COLUMN_LEFT) {
            continue;
        }
        if square.file_index() > 1 && kept_at(-1, 0) && all_own(square, &COLUMN_RIGHT) {
            continue;
        }
        kept.push(square);
    }
    kept
}

/// Squares of `plan` not dominated by another square.
///
/// A is dominated by B when each group of A's partition contains some group of
/// B's, so sensing A can never separate boards that B leaves together. Squares
/// are examined in plan order and an already dominated square cannot dominate.
pub fn partition_dominance(plan: &SensePlan) -> Vec<Square> {
    let groups: Vec<Vec<HashSet<usize>>> = plan
        .partitions()
        .iter()
        .map(|partition| {
            partition
                .groups()
                .iter()
                .map(|(_, members)| members.iter().copied().collect())
                .collect()
        })
        .collect();

    let mut dominated = vec![false; groups.len()];
    for a in 0..groups.len() {
        for b in 0..groups.len() {
            if a == b || dominated[b] {
                continue;
            }
            let covered = groups[a]
                .iter()
                .all(|group| groups[b].iter().any(|other| group.is_superset(other)));
            if covered {
                dominated[a] = true;
                break;
            }
        }
    }

    plan.partitions()
        .iter()
        .zip(dominated)
        .filter(|(_, dominated)| !dominated)
        .map(|(partition, _)| partition.square())
        .collect()
}

/// Among `squares`, the one whose largest group in `plan` is smallest.
/// Ties go to the earliest square.
pub fn minimax_square(plan: &SensePlan, squares: &[Square]) -> Option<Square> {
    squares
        .iter()
        .filter_map(|square| {
            plan.partition(*square)
                .map(|partition| (*square, partition.largest_group()))
        })
        .min_by_key(|(_, largest)| *largest)
        .map(|(square, _)| square)
}

/// Sense square for the side to move, or `None` when there is nothing to learn.
///
/// Leaves the sense speculation stored on `tracker` for the following sense.
pub fn recommend_sense(tracker: &mut HypothesisTracker) -> Option<Square> {
    if tracker.len() <= 1 {
        return None;
    }
    let screened = non_dominated_by_own_pieces(&tracker.boards()[0]);
    let hypotheses = tracker.len();
    let plan = tracker.speculate_sense(&screened);
    let candidates = partition_dominance(plan);
    let choice = minimax_square(plan, &candidates);

    event!(
        target: "recon_bot::sense",
        Level::DEBUG,
        hypotheses,
        screened = screened.len(),
        non_dominated = candidates.len(),
        choice = ?choice
    );
    choice
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sq(name: &str) -> Square {
        name.parse().unwrap()
    }

    #[test]
    fn interior_table_skips_the_rim() {
        assert_eq!(INTERIOR_SQUARES[0], sq("b2"));
        assert_eq!(INTERIOR_SQUARES[35], sq("g7"));
        assert!(
            INTERIOR_SQUARES
                .iter()
                .all(|s| (1..=6).contains(&s.file_index()) && (1..=6).contains(&s.rank_index()))
        );
    }

    #[test]
    fn opening_screen_drops_squares_backed_by_own_pawns() {
        let kept = non_dominated_by_own_pieces(&Board::starting());
        // Windows centred on ranks 2 and 3 have a full row of our own pieces
        // below them.
        assert!(!kept.contains(&sq("c2")));
        assert!(!kept.contains(&sq("c3")));
        assert!(kept.contains(&sq("c4")));
        assert!(kept.contains(&sq("e7")));
    }

    fn board(fen: &str) -> Board {
        Board::from_fen(fen).unwrap()
    }

    #[test]
    fn full_row_above_skips_a_square_whose_lower_neighbour_was_kept() {
        let kept = non_dominated_by_own_pieces(&board("7k/8/8/2PPP3/8/8/8/7K w - - 0 1"));
        assert!(kept.contains(&sq("d3")));
        assert!(!kept.contains(&sq("d4")));
        assert!(kept.contains(&sq("c4")));
        // d6 goes through the row-below rule instead.
        assert!(!kept.contains(&sq("d6")));
    }

    #[test]
    fn full_row_above_is_ignored_when_the_lower_neighbour_was_dropped() {
        let kept = non_dominated_by_own_pieces(&board("7k/8/8/2PPP3/8/8/2PPP3/7K w - - 0 1"));
        assert!(!kept.contains(&sq("d3")));
        assert!(kept.contains(&sq("d4")));
    }

    #[test]
    fn full_column_right_skips_a_square_whose_left_neighbour_was_kept() {
        let kept = non_dominated_by_own_pieces(&board("7k/8/8/5P2/5P2/5P2/8/7K w - - 0 1"));
        assert!(kept.contains(&sq("d4")));
        assert!(!kept.contains(&sq("e4")));
        assert!(kept.contains(&sq("e3")));
        assert!(kept.contains(&sq("e5")));
    }

    /// Three boards differing only in where a black knight stands on the fifth rank.
    fn knight_on_fifth_rank() -> HypothesisTracker {
        HypothesisTracker::from_boards(vec![
            board("4k3/8/8/4n3/8/8/8/4K3 w - - 0 1"),
            board("4k3/8/8/3n4/8/8/8/4K3 w - - 0 1"),
            board("4k3/8/8/2n5/8/8/8/4K3 w - - 0 1"),
        ])
    }

    #[test]
    fn strictly_coarser_partition_is_dominated() {
        let mut tracker = knight_on_fifth_rank();
        // d4 sees all three knight squares, f4 only tells e5 apart from the rest.
        let plan = tracker.speculate_sense(&[sq("f4"), sq("d4")]).clone();
        assert_eq!(plan.partition(sq("d4")).unwrap().groups().len(), 3);
        assert_eq!(plan.partition(sq("f4")).unwrap().groups().len(), 2);
        assert_eq!(partition_dominance(&plan), vec![sq("d4")]);

        let plan = tracker.speculate_sense(&[sq("d4"), sq("f4")]).clone();
        assert_eq!(partition_dominance(&plan), vec![sq("d4")]);
    }

    #[test]
    fn dominated_square_cannot_dominate() {
        let mut tracker = knight_on_fifth_rank();
        // d4 and d5 split the boards identically; whichever comes first is
        // dominated by the other and then loses the power to dominate it back.
        let plan = tracker.speculate_sense(&[sq("d4"), sq("d5")]).clone();
        assert_eq!(partition_dominance(&plan), vec![sq("d5")]);

        let plan = tracker.speculate_sense(&[sq("d5"), sq("d4")]).clone();
        assert_eq!(partition_dominance(&plan), vec![sq("d4")]);
    }

    #[test]
    fn single_hypothesis_needs_no_sense() {
        let mut tracker = HypothesisTracker::new();
        assert_eq!(recommend_sense(&mut tracker), None);
    }

    #[test]
    fn identical_partitions_keep_exactly_one() {
        let mut tracker = HypothesisTracker::new();
        tracker.apply_move("e2e4".parse().unwrap(), "e2e4".parse().unwrap(), None);
        tracker.op_move(None);
        // Nothing black can have moved near white's second rank, so every window
        // there yields a single group and all but the last are dominated.
        let plan = tracker.speculate_sense(&[sq("b2"), sq("c2"), sq("d2")]).clone();
        assert_eq!(partition_dominance(&plan), vec![sq("d2")]);
        assert_eq!(minimax_square(&plan, &[sq("b2"), sq("c2")]), Some(sq("b2")));
    }

    #[test]
    fn recommendation_splits_black_replies() {
        let mut tracker = HypothesisTracker::new();
        tracker.apply_move("e2e4".parse().unwrap(), "e2e4".parse().unwrap(), None);
        tracker.op_move(None);
        let choice = recommend_sense(&mut tracker).unwrap();
        assert!(choice.rank_index() >= 4, "expected a square on black's side, got {choice}");
        assert!(tracker.sense_speculation().is_some());
    }
}
