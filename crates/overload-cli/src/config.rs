//! Runner configuration from environment variables.

use overload_core::{BotDifficulty, PlayerSpec, RuleSet};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

const DEFAULT_SEATS: &str = "You,Bot 1:bot,Bot 2:bot";
const DEFAULT_BOT_DELAY_MS: u64 = 600;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Seat '{0}' must be 'name' or 'name:bot'")]
    InvalidSeat(String),

    #[error("{var} must be a number, got '{value}'")]
    InvalidNumber { var: &'static str, value: String },

    #[error("Unknown bot level '{0}' (expected easy or normal)")]
    UnknownBotLevel(String),

    #[error("Can't read rules file {path}: {source}")]
    RulesFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Bad rules file: {0}")]
    RulesJson(#[from] serde_json::Error),
}

/// Everything needed to run one match
#[derive(Debug, Clone)]
pub struct Config {
    pub seats: Vec<PlayerSpec>,
    /// Match seed; drawn at random when unset
    pub seed: Option<u64>,
    /// Pause before each bot move
    pub bot_delay: Duration,
    pub bot_level: BotDifficulty,
    pub rules: RuleSet,
    /// Print the final snapshot as JSON
    pub dump_state: bool,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from any key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let seats = parse_seats(
            lookup("OVERLOAD_PLAYERS")
                .as_deref()
                .unwrap_or(DEFAULT_SEATS),
        )?;

        let seed = lookup("OVERLOAD_SEED")
            .map(|v| parse_number("OVERLOAD_SEED", &v))
            .transpose()?;

        let delay_ms = lookup("OVERLOAD_BOT_DELAY_MS")
            .map(|v| parse_number("OVERLOAD_BOT_DELAY_MS", &v))
            .transpose()?
            .unwrap_or(DEFAULT_BOT_DELAY_MS);

        let bot_level = match lookup("OVERLOAD_BOT_LEVEL") {
            Some(level) => parse_bot_level(&level)?,
            None => BotDifficulty::Normal,
        };

        let rules = match lookup("OVERLOAD_RULES") {
            Some(path) => load_rules(PathBuf::from(path))?,
            None => RuleSet::default(),
        };

        let dump_state = lookup("OVERLOAD_DUMP_STATE")
            .is_some_and(|v| matches!(v.trim(), "1" | "true" | "yes"));

        Ok(Self {
            seats,
            seed,
            bot_delay: Duration::from_millis(delay_ms),
            bot_level,
            rules,
            dump_state,
        })
    }
}

/// Parse `name` / `name:bot` entries separated by commas
pub fn parse_seats(raw: &str) -> Result<Vec<PlayerSpec>, ConfigError> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|seat| match seat.rsplit_once(':') {
            Some((name, kind)) if kind.trim().eq_ignore_ascii_case("bot") => {
                Ok(PlayerSpec::bot(name.trim()))
            }
            Some((name, kind)) if kind.trim().eq_ignore_ascii_case("human") => {
                Ok(PlayerSpec::human(name.trim()))
            }
            Some(_) => Err(ConfigError::InvalidSeat(seat.to_string())),
            None => Ok(PlayerSpec::human(seat)),
        })
        .collect()
}

fn parse_bot_level(raw: &str) -> Result<BotDifficulty, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "easy" => Ok(BotDifficulty::Easy),
        "normal" => Ok(BotDifficulty::Normal),
        _ => Err(ConfigError::UnknownBotLevel(raw.to_string())),
    }
}

fn parse_number(var: &'static str, raw: &str) -> Result<u64, ConfigError> {
    raw.trim().parse().map_err(|_| ConfigError::InvalidNumber {
        var,
        value: raw.to_string(),
    })
}

fn load_rules(path: PathBuf) -> Result<RuleSet, ConfigError> {
    let text = std::fs::read_to_string(&path)
        .map_err(|source| ConfigError::RulesFile { path, source })?;
    Ok(serde_json::from_str(&text)?)
}
