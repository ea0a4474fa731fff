use super::Ballot;
use recon_core::model::chess_move::Move;
use std::cmp::Reverse;
use std::collections::HashMap;

/// Iterative run-off over ranked ballots with tied groups.
///
/// Every move in a ballot's first group gets one vote from that ballot. Each
/// round the majority threshold is half the ballots still ranking something,
/// rounded down. The move with most votes wins once it reaches the threshold,
/// ties going to the move listed first in `order`. Otherwise the move with
/// fewest votes is struck from every ballot, ties going to the move listed last.
/// Returns the chosen move and the number of rounds played; no ballots means
/// a pass.
pub fn run_off(ballots: Vec<Ballot>, order: &[Move]) -> (Move, usize) {
    let position: HashMap<Move, usize> = order
        .iter()
        .enumerate()
        .map(|(index, mv)| (*mv, index))
        .collect();
    let rank_of = |mv: &Move| position.get(mv).copied().unwrap_or(usize::MAX);

    let mut ballots: Vec<Ballot> = ballots.into_iter().filter_map(Ballot::compacted).collect();
    let mut rounds = 0;

    loop {
        if ballots.is_empty() {
            return (Move::Pass, rounds);
        }
        rounds += 1;
        let threshold = ballots.len() / 2;

        let mut counts: HashMap<Move, usize> = HashMap::new();
        for ballot in &ballots {
            for mv in ballot.first_choices() {
                *counts.entry(*mv).or_default() += 1;
            }
        }

        let leader = counts
            .iter()
            .max_by_key(|(mv, count)| (**count, Reverse(rank_of(mv)), Reverse(**mv)))
            .map(|(mv, count)| (*mv, *count));
        if let Some((mv, count)) = leader
            && count >= threshold
        {
            return (mv, rounds);
        }

        let Some(loser) = counts
            .iter()
            .min_by_key(|(mv, count)| (**count, Reverse(rank_of(mv)), Reverse(**mv)))
            .map(|(mv, _)| *mv)
        else {
            return (Move::Pass, rounds);
        };
        ballots = ballots
            .into_iter()
            .filter_map(|ballot| ballot.without(loser))
            .collect();
    }
}
