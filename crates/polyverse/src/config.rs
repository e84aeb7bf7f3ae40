//! Service configuration loading from file and environment variables.

use std::path::{Path, PathBuf};

use polyverse_bundles::DEFAULT_BUNDLE_ID;
use polyverse_feed::{Algorithm, DEFAULT_LIMIT, MAX_LIMIT};
use serde::Deserialize;
use thiserror::Error;

/// Top-level service configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ServiceConfig {
    /// Ranking settings.
    #[serde(default)]
    pub feed: FeedConfig,

    /// Moderation settings.
    #[serde(default)]
    pub moderation: ModerationConfig,

    /// Storage settings.
    #[serde(default)]
    pub store: StoreConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Ranking configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct FeedConfig {
    /// Algorithm used when a request names none.
    #[serde(default = "default_algorithm")]
    pub default_algorithm: Algorithm,

    /// Page size used when a request names none.
    #[serde(default = "default_limit")]
    pub default_limit: usize,

    /// Largest page a request may ask for.
    #[serde(default = "max_limit")]
    pub max_limit: usize,

    /// How far back candidate events are fetched, in seconds.
    #[serde(default = "default_candidate_window")]
    pub candidate_window_secs: i64,

    /// Most candidate events fetched per request.
    #[serde(default = "default_candidate_limit")]
    pub candidate_limit: usize,
}

/// Moderation configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ModerationConfig {
    /// Bundle used when a request names none.
    #[serde(default = "default_bundle")]
    pub default_bundle: String,

    /// Extra bundle documents (JSON) loaded at startup.
    #[serde(default)]
    pub bundle_files: Vec<PathBuf>,

    /// Whether bundle author and length filters apply to feeds and labels.
    #[serde(default)]
    pub apply_filters: bool,
}

/// Which event store backs the service.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    #[default]
    Memory,
    Sqlite,
}

/// Storage configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    #[serde(default)]
    pub backend: StoreBackend,

    /// Path to the SQLite database file.
    #[serde(default = "default_db_path")]
    pub path: PathBuf,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "polyverse=debug,info").
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Whether to output logs in JSON format.
    #[serde(default)]
    pub json: bool,
}

fn default_algorithm() -> Algorithm {
    Algorithm::TimeDecayDiversity
}

fn default_limit() -> usize {
    DEFAULT_LIMIT
}

fn max_limit() -> usize {
    MAX_LIMIT
}

fn default_candidate_window() -> i64 {
    7 * 24 * 60 * 60
}

fn default_candidate_limit() -> usize {
    1000
}

fn default_bundle() -> String {
    DEFAULT_BUNDLE_ID.to_string()
}

fn default_db_path() -> PathBuf {
    PathBuf::from("polyverse.db")
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            default_algorithm: default_algorithm(),
            default_limit: default_limit(),
            max_limit: max_limit(),
            candidate_window_secs: default_candidate_window(),
            candidate_limit: default_candidate_limit(),
        }
    }
}

impl Default for ModerationConfig {
    fn default() -> Self {
        Self {
            default_bundle: default_bundle(),
            bundle_files: Vec::new(),
            apply_filters: false,
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::default(),
            path: default_db_path(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

/// Errors that can occur when loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the configuration file.
    #[error("failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    /// Failed to parse the configuration file.
    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    /// Values parse but cannot work together.
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

impl ServiceConfig {
    /// Check cross-field constraints.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let feed = &self.feed;
        if feed.max_limit == 0 {
            return Err(ConfigError::Invalid("feed.max_limit must be at least 1".into()));
        }
        if feed.default_limit == 0 || feed.default_limit > feed.max_limit {
            return Err(ConfigError::Invalid(format!(
                "feed.default_limit {} must be within 1..={}",
                feed.default_limit, feed.max_limit
            )));
        }
        if feed.candidate_window_secs <= 0 {
            return Err(ConfigError::Invalid(
                "feed.candidate_window_secs must be positive".into(),
            ));
        }
        Ok(())
    }

    /// Apply `POLYVERSE_*` overrides read through `var`.
    ///
    /// Unparseable numeric or enum values are ignored.
    pub fn apply_overrides<F>(&mut self, var: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(backend) = var("POLYVERSE_STORE") {
            match backend.as_str() {
                "memory" => self.store.backend = StoreBackend::Memory,
                "sqlite" => self.store.backend = StoreBackend::Sqlite,
                other => tracing::warn!(value = other, "ignoring unknown POLYVERSE_STORE"),
            }
        }
        if let Some(path) = var("POLYVERSE_DB_PATH") {
            self.store.path = PathBuf::from(path);
        }
        if let Some(bundle) = var("POLYVERSE_DEFAULT_BUNDLE") {
            self.moderation.default_bundle = bundle;
        }
        if let Some(algorithm) = var("POLYVERSE_DEFAULT_ALGORITHM") {
            if let Ok(parsed) = algorithm.parse() {
                self.feed.default_algorithm = parsed;
            }
        }
        if let Some(limit) = var("POLYVERSE_DEFAULT_LIMIT") {
            if let Ok(parsed) = limit.parse() {
                self.feed.default_limit = parsed;
            }
        }
        if let Some(limit) = var("POLYVERSE_MAX_LIMIT") {
            if let Ok(parsed) = limit.parse() {
                self.feed.max_limit = parsed;
            }
        }
        if let Some(level) = var("POLYVERSE_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(json) = var("POLYVERSE_LOG_JSON") {
            self.logging.json = json == "true" || json == "1";
        }
    }
}

/// Loads configuration from a TOML file, falling back to defaults.
///
/// Environment variable overrides:
/// - `POLYVERSE_STORE` overrides `store.backend` (`memory` or `sqlite`)
/// - `POLYVERSE_DB_PATH` overrides `store.path`
/// - `POLYVERSE_DEFAULT_BUNDLE` overrides `moderation.default_bundle`
/// - `POLYVERSE_DEFAULT_ALGORITHM` overrides `feed.default_algorithm`
/// - `POLYVERSE_DEFAULT_LIMIT` overrides `feed.default_limit`
/// - `POLYVERSE_MAX_LIMIT` overrides `feed.max_limit`
/// - `POLYVERSE_LOG_LEVEL` overrides `logging.level`
/// - `POLYVERSE_LOG_JSON` overrides `logging.json` (set to "true" to enable)
///
/// # Errors
///
/// Returns `ConfigError` if the file exists but cannot be read or parsed, or
/// if the resulting limits are inconsistent.
pub fn load_config(path: Option<&Path>) -> Result<ServiceConfig, ConfigError> {
    let mut config = match path {
        Some(p) => match std::fs::read_to_string(p) {
            Ok(contents) => toml::from_str(&contents)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(path = %p.display(), "config file not found, using defaults");
                ServiceConfig::default()
            }
            Err(e) => return Err(ConfigError::FileRead(e)),
        },
        None => ServiceConfig::default(),
    };

    config.apply_overrides(|key| std::env::var(key).ok());
    config.validate()?;
    Ok(config)
}
