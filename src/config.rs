// Configuration loading and parsing (config/insight.toml).

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("validation error for field `{field}`: {message}")]
    ValidationError { field: String, message: String },
}

// ---------------------------------------------------------------------------
// insight.toml structs
// ---------------------------------------------------------------------------

/// Raw deserialization target for the entire insight.toml file.
#[derive(Debug, Clone, Deserialize)]
struct InsightFile {
    api: ApiConfig,
    league: LeagueConfig,
    #[serde(default)]
    fanout: FanoutConfig,
    #[serde(default)]
    fixtures: FixturesConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LeagueConfig {
    /// Classic mini-league to build standings and ownership for.
    pub league_id: u32,
    /// The user's own manager entry, used by transfer and chip advice.
    pub entry_id: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FanoutConfig {
    /// Concurrent per-manager/per-player API requests.
    pub concurrency: usize,
}

impl Default for FanoutConfig {
    fn default() -> Self {
        FanoutConfig { concurrency: 5 }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct FixturesConfig {
    /// Gameweeks shown by the fixture ticker.
    pub ticker_window: u32,
}

impl Default for FixturesConfig {
    fn default() -> Self {
        FixturesConfig { ticker_window: 5 }
    }
}

/// The assembled, validated configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub api: ApiConfig,
    pub league: LeagueConfig,
    pub fanout: FanoutConfig,
    pub fixtures: FixturesConfig,
}

// ---------------------------------------------------------------------------
// Loading logic
// ---------------------------------------------------------------------------

/// Load and validate configuration from `config/insight.toml` relative to
/// the given `base_dir`.
pub fn load_config_from(base_dir: &Path) -> Result<Config, ConfigError> {
    let path = base_dir.join("config").join("insight.toml");
    let text = std::fs::read_to_string(&path).map_err(|_| ConfigError::FileNotFound {
        path: path.clone(),
    })?;
    let file: InsightFile = toml::from_str(&text).map_err(|e| ConfigError::ParseError {
        path: path.clone(),
        source: e,
    })?;

    let config = Config {
        api: file.api,
        league: file.league,
        fanout: file.fanout,
        fixtures: file.fixtures,
    };

    validate(&config)?;

    Ok(config)
}

/// Convenience wrapper: loads config relative to the current working
/// directory.
pub fn load_config() -> Result<Config, ConfigError> {
    let cwd = std::env::current_dir().map_err(|_| ConfigError::FileNotFound {
        path: PathBuf::from("."),
    })?;
    load_config_from(&cwd)
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate(config: &Config) -> Result<(), ConfigError> {
    if config.api.base_url.is_empty() {
        return Err(ConfigError::ValidationError {
            field: "api.base_url".into(),
            message: "must not be empty".into(),
        });
    }

    if config.api.timeout_secs == 0 {
        return Err(ConfigError::ValidationError {
            field: "api.timeout_secs".into(),
            message: "must be greater than 0".into(),
        });
    }

    if config.league.league_id == 0 {
        return Err(ConfigError::ValidationError {
            field: "league.league_id".into(),
            message: "must be greater than 0".into(),
        });
    }

    if config.league.entry_id == 0 {
        return Err(ConfigError::ValidationError {
            field: "league.entry_id".into(),
            message: "must be greater than 0".into(),
        });
    }

    let concurrency = config.fanout.concurrency;
    if !(1..=16).contains(&concurrency) {
        return Err(ConfigError::ValidationError {
            field: "fanout.concurrency".into(),
            message: format!("must be between 1 and 16, got {concurrency}"),
        });
    }

    if config.fixtures.ticker_window == 0 {
        return Err(ConfigError::ValidationError {
            field: "fixtures.ticker_window".into(),
            message: "must be greater than 0".into(),
        });
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
