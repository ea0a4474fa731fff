use rand::Rng;
use rand::seq::index;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::{Duration, Instant};
use thiserror::Error;

/// How to cut a hypothesis set down to a size limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TruncationStrategy {
    /// Keep the first `limit` boards.
    #[default]
    Prefix,
    /// Keep a uniform sample of `limit` boards, in their original order.
    RandomSample,
}

impl TruncationStrategy {
    pub const fn as_str(self) -> &'static str {
        match self {
            TruncationStrategy::Prefix => "prefix",
            TruncationStrategy::RandomSample => "random_sample",
        }
    }

    /// Indices of the boards to keep, ascending.
    pub(crate) fn select<R: Rng + ?Sized>(self, len: usize, limit: usize, rng: &mut R) -> Vec<usize> {
        if len <= limit {
            return (0..len).collect();
        }
        match self {
            TruncationStrategy::Prefix => (0..limit).collect(),
            TruncationStrategy::RandomSample => {
                let mut picked = index::sample(rng, len, limit).into_vec();
                picked.sort_unstable();
                picked
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown truncation strategy `{0}` (expected prefix or random_sample)")]
pub struct UnknownStrategy(pub String);

impl FromStr for TruncationStrategy {
    type Err = UnknownStrategy;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "prefix" => Ok(TruncationStrategy::Prefix),
            "random_sample" | "random" | "sample" => Ok(TruncationStrategy::RandomSample),
            other => Err(UnknownStrategy(other.to_string())),
        }
    }
}

impl fmt::Display for TruncationStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Bounds on one opponent-move expansion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ExpansionBudget {
    /// Checked between chunks of sources; sources not reached by then are dropped.
    pub deadline: Option<Instant>,
    /// Stop generating once this many distinct boards exist.
    pub max_boards: Option<usize>,
}

impl ExpansionBudget {
    pub const UNBOUNDED: ExpansionBudget = ExpansionBudget {
        deadline: None,
        max_boards: None,
    };

    pub fn within(timeout: Duration) -> Self {
        Self {
            deadline: Instant::now().checked_add(timeout),
            max_boards: None,
        }
    }

    pub fn with_max_boards(mut self, max_boards: usize) -> Self {
        self.max_boards = Some(max_boards);
        self
    }

    pub(crate) fn expired(&self) -> bool {
        self.deadline
            .is_some_and(|deadline| Instant::now() >= deadline)
    }
}

/// Summary of one expansion, returned so callers can log or react to truncation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct ExpansionReport {
    pub input: usize,
    pub expanded: usize,
    pub generated: usize,
    pub output: usize,
    pub capped: bool,
}

impl ExpansionReport {
    /// Whether the budget cost any hypotheses.
    pub fn is_reduced(&self) -> bool {
        self.expanded < self.input || self.capped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    #[test]
    fn prefix_keeps_leading_indices() {
        let mut rng = SmallRng::seed_from_u64(7);
        assert_eq!(
            TruncationStrategy::Prefix.select(10, 3, &mut rng),
            vec![0, 1, 2]
        );
    }

    #[test]
    fn random_sample_is_sorted_and_sized() {
        let mut rng = SmallRng::seed_from_u64(7);
        let picked = TruncationStrategy::RandomSample.select(50, 10, &mut rng);
        assert_eq!(picked.len(), 10);
        assert!(picked.windows(2).all(|w| w[0] < w[1]));
        assert!(picked.iter().all(|i| *i < 50));
    }

    #[test]
    fn short_sets_are_untouched() {
        let mut rng = SmallRng::seed_from_u64(7);
        assert_eq!(
            TruncationStrategy::RandomSample.select(2, 5, &mut rng),
            vec![0, 1]
        );
    }

    #[test]
    fn strategy_parses_from_text() {
        assert_eq!(
            "Random_Sample".parse::<TruncationStrategy>(),
            Ok(TruncationStrategy::RandomSample)
        );
        assert!("first".parse::<TruncationStrategy>().is_err());
        let json = serde_json::to_string(&TruncationStrategy::RandomSample).unwrap();
        assert_eq!(json, "\"random_sample\"");
    }

    #[test]
    fn zero_timeout_expires_immediately() {
        assert!(ExpansionBudget::within(Duration::ZERO).expired());
        assert!(!ExpansionBudget::UNBOUNDED.expired());
    }
}
