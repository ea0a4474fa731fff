use crate::engine::SearchLimit;
use recon_core::belief::TruncationStrategy;
use std::time::Duration;

/// Tunables for [`MhtBot`](super::MhtBot), read from `RECON_*` variables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BotParams {
    /// Hypotheses kept before expanding by the opponent's move.
    pub max_hypotheses: usize,
    pub truncation: TruncationStrategy,
    pub vote_sample: usize,
    pub depth: u32,
    pub multipv: usize,
    /// Wall-clock bound on expansion and on engine scoring within one turn.
    pub turn_budget: Option<Duration>,
    pub seed: Option<u64>,
}

impl Default for BotParams {
    fn default() -> Self {
        Self {
            max_hypotheses: 3_000,
            truncation: TruncationStrategy::Prefix,
            vote_sample: 1_200,
            depth: 8,
            multipv: 4,
            turn_budget: Some(Duration::from_secs(10)),
            seed: None,
        }
    }
}

impl BotParams {
    pub fn from_env() -> Self {
        Self::from_reader(|key| std::env::var(key).ok())
    }

    pub fn search_limit(&self) -> SearchLimit {
        SearchLimit {
            depth: self.depth,
            multipv: self.multipv,
            timeout: None,
        }
    }

    pub(crate) fn from_reader<F>(mut read: F) -> Self
    where
        F: FnMut(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let max_hypotheses = read("RECON_MAX_HYPOTHESES")
            .and_then(|raw| raw.trim().parse::<usize>().ok())
            .filter(|value| *value > 0)
            .unwrap_or(defaults.max_hypotheses);

        let truncation = read("RECON_TRUNCATION")
            .and_then(|raw| raw.parse::<TruncationStrategy>().ok())
            .unwrap_or(defaults.truncation);

        let vote_sample = read("RECON_VOTE_SAMPLE")
            .and_then(|raw| raw.trim().parse::<usize>().ok())
            .filter(|value| *value > 0)
            .unwrap_or(defaults.vote_sample);

        let depth = read("RECON_ENGINE_DEPTH")
            .and_then(|raw| raw.trim().parse::<u32>().ok())
            .filter(|value| (1..=64).contains(value))
            .unwrap_or(defaults.depth);

        let multipv = read("RECON_ENGINE_MULTIPV")
            .and_then(|raw| raw.trim().parse::<usize>().ok())
            .filter(|value| *value > 0)
            .unwrap_or(defaults.multipv);

        let turn_budget = match read("RECON_TURN_BUDGET_MS") {
            Some(raw) => match raw.trim() {
                "0" | "off" | "none" => None,
                other => other
                    .parse::<u64>()
                    .ok()
                    .map(Duration::from_millis)
                    .or(defaults.turn_budget),
            },
            None => defaults.turn_budget,
        };

        let seed = read("RECON_SEED").and_then(|raw| raw.trim().parse::<u64>().ok());

        Self {
            max_hypotheses,
            truncation,
            vote_sample,
            depth,
            multipv,
            turn_budget,
            seed,
        }
    }
}
