//! Speculative views of the hypothesis set.
//!
//! Plans refer to boards by their index in the live set. The tracker discards its
//! stored plans on every mutation, so an index inside a plan is always valid for
//! the set it was computed from.

use crate::model::board::Board;
use crate::model::chess_move::Move;
use crate::model::square::Square;
use crate::simulate::{MoveOutcome, SenseObservation, simulate_move, simulate_sense};
use rayon::prelude::*;
use std::collections::HashMap;

/// Hypotheses grouped by the observation sensing one square would produce.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SensePartition {
    square: Square,
    groups: Vec<(SenseObservation, Vec<usize>)>,
}

impl SensePartition {
    pub fn square(&self) -> Square {
        self.square
    }

    /// Observation and board indices of every group, in first-seen order.
    pub fn groups(&self) -> &[(SenseObservation, Vec<usize>)] {
        &self.groups
    }

    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    /// Size of the biggest group, zero for an empty set.
    pub fn largest_group(&self) -> usize {
        self.groups
            .iter()
            .map(|(_, members)| members.len())
            .max()
            .unwrap_or(0)
    }

    pub fn members(&self, observation: &SenseObservation) -> Option<&[usize]> {
        self.groups
            .iter()
            .find(|(seen, _)| seen == observation)
            .map(|(_, members)| members.as_slice())
    }
}

/// One partition per candidate square, in the order the squares were given.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SensePlan {
    partitions: Vec<SensePartition>,
}

impl SensePlan {
    pub(crate) fn compute(boards: &[Board], squares: &[Square]) -> Self {
        let observations: Vec<Vec<SenseObservation>> = boards
            .par_iter()
            .map(|board| {
                squares
                    .iter()
                    .map(|square| simulate_sense(board, Some(*square)))
                    .collect()
            })
            .collect();

        let partitions = squares
            .iter()
            .enumerate()
            .map(|(column, square)| {
                let mut slots: HashMap<&SenseObservation, usize> = HashMap::new();
                let mut groups: Vec<(SenseObservation, Vec<usize>)> = Vec::new();
                for (board_index, row) in observations.iter().enumerate() {
                    let observation = &row[column];
                    let slot = *slots.entry(observation).or_insert_with(|| {
                        groups.push((observation.clone(), Vec::new()));
                        groups.len() - 1
                    });
                    groups[slot].1.push(board_index);
                }
                SensePartition {
                    square: *square,
                    groups,
                }
            })
            .collect();

        Self { partitions }
    }

    pub fn partitions(&self) -> &[SensePartition] {
        &self.partitions
    }

    pub fn partition(&self, square: Square) -> Option<&SensePartition> {
        self.partitions.iter().find(|p| p.square == square)
    }

    pub fn squares(&self) -> impl Iterator<Item = Square> + '_ {
        self.partitions.iter().map(|p| p.square)
    }

    pub fn is_empty(&self) -> bool {
        self.partitions.is_empty()
    }
}

/// Outcome of every candidate move on every hypothesis.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MovePlan {
    candidates: Vec<Move>,
    outcomes: Vec<Vec<MoveOutcome>>,
}

impl MovePlan {
    pub(crate) fn compute(boards: &[Board], candidates: &[Move]) -> Self {
        let outcomes = boards
            .par_iter()
            .map(|board| {
                candidates
                    .iter()
                    .map(|mv| simulate_move(board, *mv))
                    .collect()
            })
            .collect();
        Self {
            candidates: candidates.to_vec(),
            outcomes,
        }
    }

    pub fn candidates(&self) -> &[Move] {
        &self.candidates
    }

    pub fn board_count(&self) -> usize {
        self.outcomes.len()
    }

    /// Outcomes for one board, aligned with [`candidates`](Self::candidates).
    pub fn outcomes_for(&self, board_index: usize) -> Option<&[MoveOutcome]> {
        self.outcomes.get(board_index).map(Vec::as_slice)
    }

    pub fn outcome(&self, board_index: usize, requested: Move) -> Option<MoveOutcome> {
        let column = self.candidates.iter().position(|mv| *mv == requested)?;
        self.outcomes.get(board_index).map(|row| row[column])
    }

    pub fn covers(&self, requested: Move) -> bool {
        self.candidates.contains(&requested)
    }
}
