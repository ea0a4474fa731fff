use recon_core::history::{GameRecord, ReplayOptions};
use serde::Deserialize;
use std::collections::HashSet;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::Level;

const RUN_ID_ALLOWED: &str = "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789._-";

/// Root replay configuration loaded from YAML.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct BenchConfig {
    pub run_id: String,
    #[serde(default)]
    pub replay: ReplayOptions,
    pub games: Vec<GameConfig>,
    pub outputs: OutputsConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl BenchConfig {
    /// Load configuration from a YAML file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let path_buf = path.to_path_buf();
        let file = File::open(path).map_err(|source| ConfigError::Read {
            source,
            path: path_buf.clone(),
        })?;
        let reader = BufReader::new(file);
        let mut cfg: BenchConfig =
            serde_yaml::from_reader(reader).map_err(|source| ConfigError::Parse {
                source,
                path: path_buf.clone(),
            })?;
        cfg.validate().map_err(|source| ConfigError::Invalid {
            path: path_buf,
            source,
        })?;
        Ok(cfg)
    }

    /// Validate the configuration without touching the filesystem.
    pub fn validate(&mut self) -> Result<(), ValidationError> {
        validate_run_id(&self.run_id)?;
        validate_replay(&self.replay)?;
        validate_games(&self.games)?;
        self.outputs.validate(&self.run_id)?;
        self.logging.normalize();
        Ok(())
    }

    /// Resolve output templates (e.g., `{run_id}` placeholders) into concrete paths.
    pub fn resolved_outputs(&self) -> ResolvedOutputs {
        ResolvedOutputs {
            jsonl: resolve_template(&self.run_id, &self.outputs.jsonl),
            summary_md: resolve_template(&self.run_id, &self.outputs.summary_md),
        }
    }
}

/// One recorded game, given inline or as a path to a history file.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct GameConfig {
    pub name: String,
    #[serde(default)]
    pub history: Option<String>,
    #[serde(default)]
    pub path: Option<PathBuf>,
}

impl GameConfig {
    /// Reads and parses the game's history.
    pub fn load(&self) -> Result<GameRecord, GameSourceError> {
        match (&self.history, &self.path) {
            (Some(text), None) => GameRecord::parse(text).map_err(|source| GameSourceError::History {
                name: self.name.clone(),
                source,
            }),
            (None, Some(path)) => {
                let text =
                    std::fs::read_to_string(path).map_err(|source| GameSourceError::Read {
                        name: self.name.clone(),
                        path: path.clone(),
                        source,
                    })?;
                GameRecord::parse(&text).map_err(|source| GameSourceError::History {
                    name: self.name.clone(),
                    source,
                })
            }
            _ => Err(GameSourceError::Ambiguous {
                name: self.name.clone(),
            }),
        }
    }
}

/// Output artifact configuration.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct OutputsConfig {
    pub jsonl: String,
    pub summary_md: String,
}

impl OutputsConfig {
    fn validate(&self, run_id: &str) -> Result<(), ValidationError> {
        for (label, value) in [
            ("outputs.jsonl", &self.jsonl),
            ("outputs.summary_md", &self.summary_md),
        ] {
            if value.trim().is_empty() {
                return Err(ValidationError::InvalidField {
                    field: label.to_string(),
                    message: "path must not be empty".to_string(),
                });
            }

            let resolved = resolve_template(run_id, value);
            if resolved.components().count() == 0 {
                return Err(ValidationError::InvalidField {
                    field: label.to_string(),
                    message: "resolved path is invalid".to_string(),
                });
            }
        }

        if self.jsonl == self.summary_md {
            return Err(ValidationError::InvalidField {
                field: "outputs".to_string(),
                message: "jsonl and summary_md must name different files".to_string(),
            });
        }
        Ok(())
    }
}

/// Logging configuration defaults to disabled structured logs.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct LoggingConfig {
    #[serde(default)]
    pub enable_structured: bool,
    #[serde(default = "default_tracing_level")]
    pub tracing_level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enable_structured: false,
            tracing_level: default_tracing_level(),
        }
    }
}

impl LoggingConfig {
    fn normalize(&mut self) {
        if self.tracing_level.trim().is_empty() {
            self.tracing_level = default_tracing_level();
        }
    }

    pub fn level(&self) -> Option<Level> {
        match self.tracing_level.to_ascii_lowercase().as_str() {
            "trace" => Some(Level::TRACE),
            "debug" => Some(Level::DEBUG),
            "info" => Some(Level::INFO),
            "warn" | "warning" => Some(Level::WARN),
            "error" => Some(Level::ERROR),
            _ => None,
        }
    }
}

fn default_tracing_level() -> String {
    "info".to_string()
}

fn validate_run_id(run_id: &str) -> Result<(), ValidationError> {
    if run_id.trim().is_empty() {
        return Err(ValidationError::InvalidField {
            field: "run_id".to_string(),
            message: "run_id must not be empty".to_string(),
        });
    }

    if !run_id.chars().all(|c| RUN_ID_ALLOWED.contains(c)) {
        return Err(ValidationError::InvalidField {
            field: "run_id".to_string(),
            message: "run_id may only contain alphanumeric characters, '.', '_' or '-'".to_string(),
        });
    }

    Ok(())
}

fn validate_replay(replay: &ReplayOptions) -> Result<(), ValidationError> {
    if replay.max_hypotheses == Some(0) {
        return Err(ValidationError::InvalidField {
            field: "replay.max_hypotheses".to_string(),
            message: "cap must be at least 1 when set".to_string(),
        });
    }
    Ok(())
}

fn validate_games(games: &[GameConfig]) -> Result<(), ValidationError> {
    if games.is_empty() {
        return Err(ValidationError::InvalidField {
            field: "games".to_string(),
            message: "at least one game must be specified".to_string(),
        });
    }

    let mut seen = HashSet::new();
    for game in games {
        if game.name.trim().is_empty() {
            return Err(ValidationError::InvalidField {
                field: "games.name".to_string(),
                message: "game name must not be empty".to_string(),
            });
        }

        if !seen.insert(game.name.as_str()) {
            return Err(ValidationError::InvalidField {
                field: "games".to_string(),
                message: format!("game name '{}' defined more than once", game.name),
            });
        }

        match (&game.history, &game.path) {
            (Some(text), None) => {
                GameRecord::parse(text).map_err(|err| ValidationError::InvalidField {
                    field: format!("games[{}].history", game.name),
                    message: err.to_string(),
                })?;
            }
            (None, Some(path)) if !path.as_os_str().is_empty() => {}
            _ => {
                return Err(ValidationError::InvalidField {
                    field: format!("games[{}]", game.name),
                    message: "exactly one of history or path must be given".to_string(),
                });
            }
        }
    }

    Ok(())
}

pub fn resolve_template(run_id: &str, template: &str) -> PathBuf {
    PathBuf::from(template.replace("{run_id}", run_id))
}

/// Fully resolved output paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedOutputs {
    pub jsonl: PathBuf,
    pub summary_md: PathBuf,
}

/// Errors surfaced when loading configuration files.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path:?}: {source}")]
    Read {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },
    #[error("failed to parse config {path:?}: {source}")]
    Parse {
        #[source]
        source: serde_yaml::Error,
        path: PathBuf,
    },
    #[error("invalid configuration in {path:?}: {source}")]
    Invalid {
        path: PathBuf,
        source: ValidationError,
    },
}

impl ConfigError {
    pub fn path(&self) -> &Path {
        match self {
            ConfigError::Read { path, .. }
            | ConfigError::Parse { path, .. }
            | ConfigError::Invalid { path, .. } => path.as_path(),
        }
    }
}

/// Validation failures captured with contextual metadata.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("{field}: {message}")]
    InvalidField { field: String, message: String },
}

#[derive(Debug, Error)]
pub enum GameSourceError {
    #[error("game '{name}': failed to read {path:?}: {source}")]
    Read {
        name: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("game '{name}': {source}")]
    History {
        name: String,
        #[source]
        source: recon_core::history::HistoryError,
    },
    #[error("game '{name}' must give exactly one of history or path")]
    Ambiguous { name: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use recon_core::belief::TruncationStrategy;

    const BASIC_YAML: &str = r#"
run_id: "opening_check"
replay:
  max_hypotheses: 500
  truncation: "random_sample"
  seed: 9
games:
  - name: "quiet"
    history: "00 e2e4 00 e7e5 d7 g1f3 00 b8c6"
  - name: "archived"
    path: "bench/games/archived.txt"
outputs:
  jsonl: "bench/out/{run_id}/frames.jsonl"
  summary_md: "bench/out/{run_id}/summary.md"
logging:
  enable_structured: true
  tracing_level: "debug"
"#;

    #[test]
    fn loads_and_validates_basic_config() {
        let mut cfg: BenchConfig = serde_yaml::from_str(BASIC_YAML).expect("parse yaml");
        cfg.validate().expect("validate");

        assert_eq!(cfg.replay.max_hypotheses, Some(500));
        assert_eq!(cfg.replay.truncation, TruncationStrategy::RandomSample);
        assert!(!cfg.replay.record_epds);
        assert_eq!(cfg.logging.level(), Some(Level::DEBUG));

        let outputs = cfg.resolved_outputs();
        assert_eq!(
            outputs.jsonl,
            PathBuf::from("bench/out/opening_check/frames.jsonl")
        );
    }

    #[test]
    fn replay_block_is_optional() {
        let yaml = BASIC_YAML.replace(
            "replay:\n  max_hypotheses: 500\n  truncation: \"random_sample\"\n  seed: 9\n",
            "",
        );
        let mut cfg: BenchConfig = serde_yaml::from_str(&yaml).expect("parse");
        cfg.validate().expect("valid");
        assert_eq!(cfg.replay, ReplayOptions::default());
    }

    #[test]
    fn rejects_duplicate_games() {
        let yaml = BASIC_YAML.replace("\"archived\"", "\"quiet\"");
        let mut cfg: BenchConfig = serde_yaml::from_str(&yaml).expect("parse");
        let err = cfg.validate().expect_err("duplicate games should fail");
        assert!(matches!(
            err,
            ValidationError::InvalidField { field, .. } if field == "games"
        ));
    }

    #[test]
    fn rejects_malformed_inline_history() {
        let yaml = BASIC_YAML.replace("g1f3", "g1z3");
        let mut cfg: BenchConfig = serde_yaml::from_str(&yaml).expect("parse");
        let err = cfg.validate().expect_err("bad move token");
        assert!(matches!(
            err,
            ValidationError::InvalidField { field, .. } if field == "games[quiet].history"
        ));
    }

    #[test]
    fn rejects_game_with_both_sources() {
        let yaml = BASIC_YAML.replace(
            "    path: \"bench/games/archived.txt\"\n",
            "    path: \"bench/games/archived.txt\"\n    history: \"00 0000\"\n",
        );
        let mut cfg: BenchConfig = serde_yaml::from_str(&yaml).expect("parse");
        let err = cfg.validate().expect_err("two sources");
        assert!(matches!(
            err,
            ValidationError::InvalidField { field, .. } if field == "games[archived]"
        ));
    }

    #[test]
    fn rejects_zero_cap_and_bad_run_id() {
        let yaml = BASIC_YAML.replace("max_hypotheses: 500", "max_hypotheses: 0");
        let mut cfg: BenchConfig = serde_yaml::from_str(&yaml).expect("parse");
        assert!(cfg.validate().is_err());

        let yaml = BASIC_YAML.replace("opening_check", "opening check");
        let mut cfg: BenchConfig = serde_yaml::from_str(&yaml).expect("parse");
        let err = cfg.validate().expect_err("invalid run id");
        assert!(matches!(
            err,
            ValidationError::InvalidField { field, .. } if field == "run_id"
        ));
    }

    #[test]
    fn missing_history_file_surfaces_on_load() {
        let game = GameConfig {
            name: "ghost".to_string(),
            history: None,
            path: Some(PathBuf::from("/nonexistent/recon/ghost.txt")),
        };
        assert!(matches!(game.load(), Err(GameSourceError::Read { .. })));
    }
}
