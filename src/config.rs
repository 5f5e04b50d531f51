use crate::models::RewardTier;
use chrono::{FixedOffset, Offset, Utc};
use serde::Deserialize;
use std::{env, path::PathBuf};
use tokio::fs;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid {name}: {reason}")]
    Invalid { name: &'static str, reason: String },

    #[error("failed to read rewards file {path}: {source}")]
    RewardsIo {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse rewards file {path}: {source}")]
    RewardsParse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, Deserialize)]
pub struct RewardConfig {
    #[serde(default = "default_weekly_rewards")]
    pub weekly: Vec<RewardTier>,
    #[serde(default = "default_monthly_rewards")]
    pub monthly: Vec<RewardTier>,
}

impl Default for RewardConfig {
    fn default() -> Self {
        Self {
            weekly: default_weekly_rewards(),
            monthly: default_monthly_rewards(),
        }
    }
}

fn default_weekly_rewards() -> Vec<RewardTier> {
    vec![
        RewardTier::new(25.0, "🌟 Getting Started!"),
        RewardTier::new(50.0, "🔥 On Fire!"),
        RewardTier::new(75.0, "💎 Diamond Streak!"),
        RewardTier::new(90.0, "👑 Perfect Week Queen!"),
    ]
}

fn default_monthly_rewards() -> Vec<RewardTier> {
    [20.0, 40.0, 60.0, 80.0, 95.0]
        .into_iter()
        .map(|threshold| RewardTier::new(threshold, format!("{threshold}%")))
        .collect()
}

pub const DEFAULT_MAX_BODY_BYTES: usize = 16 * 1024 * 1024;

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub data_dir: PathBuf,
    // Canonical timezone used to decide which date is "today".
    pub utc_offset: FixedOffset,
    pub rewards: RewardConfig,
    // Request body ceiling; gym photos arrive inline as data URIs.
    pub max_body_bytes: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8080,
            data_dir: PathBuf::from("data"),
            utc_offset: utc(),
            rewards: RewardConfig::default(),
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }
}

impl Config {
    pub async fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Ok(value) = env::var("PORT") {
            config.port = value.parse().map_err(|_| ConfigError::Invalid {
                name: "PORT",
                reason: format!("'{value}' is not a port number"),
            })?;
        }
        if let Ok(value) = env::var("APP_DATA_DIR") {
            config.data_dir = PathBuf::from(value);
        }
        if let Ok(value) = env::var("APP_UTC_OFFSET") {
            config.utc_offset = parse_utc_offset(&value)?;
        }
        if let Ok(value) = env::var("APP_REWARDS_PATH") {
            config.rewards = load_rewards(PathBuf::from(value)).await?;
        }
        if let Ok(value) = env::var("APP_MAX_BODY_BYTES") {
            config.max_body_bytes = parse_body_limit(&value)?;
        }

        Ok(config)
    }
}

async fn load_rewards(path: PathBuf) -> Result<RewardConfig, ConfigError> {
    let bytes = match fs::read(&path).await {
        Ok(bytes) => bytes,
        Err(source) => return Err(ConfigError::RewardsIo { path, source }),
    };
    serde_json::from_slice(&bytes).map_err(|source| ConfigError::RewardsParse { path, source })
}

fn utc() -> FixedOffset {
    Utc.fix()
}

pub fn parse_body_limit(value: &str) -> Result<usize, ConfigError> {
    match value.trim().parse::<usize>() {
        Ok(bytes) if bytes > 0 => Ok(bytes),
        _ => Err(ConfigError::Invalid {
            name: "APP_MAX_BODY_BYTES",
            reason: format!("'{value}' is not a positive byte count"),
        }),
    }
}

// Accepts `Z`, `+HH:MM`, `-HH:MM` or `+HH`.
pub fn parse_utc_offset(value: &str) -> Result<FixedOffset, ConfigError> {
    let invalid = |reason: &str| ConfigError::Invalid {
        name: "APP_UTC_OFFSET",
        reason: format!("'{value}' {reason}"),
    };

    let trimmed = value.trim();
    if trimmed.eq_ignore_ascii_case("z") || trimmed.eq_ignore_ascii_case("utc") {
        return Ok(utc());
    }

    let (sign, rest) = match trimmed.split_at_checked(1) {
        Some(("+", rest)) => (1, rest),
        Some(("-", rest)) => (-1, rest),
        _ => return Err(invalid("must start with '+' or '-'")),
    };
    let (hours, minutes) = match rest.split_once(':') {
        Some((hours, minutes)) => (hours, minutes),
        None => (rest, "0"),
    };
    let hours: i32 = hours.parse().map_err(|_| invalid("has non-numeric hours"))?;
    let minutes: i32 = minutes.parse().map_err(|_| invalid("has non-numeric minutes"))?;
    if hours > 14 || minutes > 59 {
        return Err(invalid("is out of range"));
    }

    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
        .ok_or_else(|| invalid("is out of range"))
}
