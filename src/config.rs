//! Configuration loading and management
//!
//! Configuration is loaded from `~/.config/fupboard/config.toml`.
//!
//! The original dashboard revisions read the connection URI and the alias
//! tables as module-level globals at import time; here everything is explicit
//! configuration handed to the pipeline once at startup and read-only
//! thereafter.
//!
//! This module follows the XDG Base Directory Specification:
//! - Config: `$XDG_CONFIG_HOME/fupboard/` (~/.config/fupboard/)
//! - State/Logs: `$XDG_STATE_HOME/fupboard/` (~/.local/state/fupboard/)

use crate::error::{Error, Result};
use serde::Deserialize;
use std::path::PathBuf;

/// Returns a best-effort home directory path.
fn home_dir() -> PathBuf {
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Returns XDG_CONFIG_HOME or ~/.config
fn xdg_config_home() -> PathBuf {
    std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".config"))
}

/// Returns XDG_STATE_HOME or ~/.local/state
fn xdg_state_home() -> PathBuf {
    std::env::var("XDG_STATE_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".local/state"))
}

/// Main configuration struct
#[derive(Debug, Deserialize, Default)]
pub struct Config {
    /// Document-store connection (consumed by the fetch layer, not the core)
    #[serde(default)]
    pub source: SourceConfig,

    /// Extra template patterns appended after the built-ins
    #[serde(default)]
    pub classifier: ClassifierConfig,

    /// Alias table overrides
    #[serde(default)]
    pub aliases: AliasConfig,

    /// Structural filter configuration
    #[serde(default)]
    pub filter: FilterConfig,

    /// Aggregation configuration
    #[serde(default)]
    pub aggregate: AggregateConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Document-store connection settings.
///
/// The core never opens the connection itself; the fetch layer reads these
/// and hands the core a raw event stream. Carried here so the whole
/// deployment is configured in one file.
#[derive(Debug, Deserialize)]
pub struct SourceConfig {
    /// Connection URI
    pub uri: Option<String>,

    /// Database holding the events collection
    #[serde(default = "default_database")]
    pub database: String,

    /// Events collection name
    #[serde(default = "default_collection")]
    pub collection: String,

    /// Seconds between refresh cycles (cache TTL for the fetch layer)
    #[serde(default = "default_refresh_secs")]
    pub refresh_secs: u64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            uri: None,
            database: default_database(),
            collection: default_collection(),
            refresh_secs: default_refresh_secs(),
        }
    }
}

fn default_database() -> String {
    "growth".to_string()
}

fn default_collection() -> String {
    "events".to_string()
}

fn default_refresh_secs() -> u64 {
    600
}

/// Classifier configuration: extra template families.
#[derive(Debug, Deserialize, Default)]
pub struct ClassifierConfig {
    /// Appended after the built-in patterns, in file order (lowest priority)
    #[serde(default)]
    pub patterns: Vec<PatternEntry>,
}

/// One configured template family.
#[derive(Debug, Deserialize)]
pub struct PatternEntry {
    /// Family identifier
    pub name: String,
    /// Regex fragment, compiled case-insensitively
    pub pattern: String,
}

/// Alias table overrides merged over the built-in tables.
///
/// Entries are lists of pairs rather than maps so duplicate keys survive
/// parsing and can be flagged at load time.
#[derive(Debug, Deserialize, Default)]
pub struct AliasConfig {
    /// Legacy event name -> canonical event name
    #[serde(default)]
    pub canonical: Vec<AliasEntry>,

    /// Canonical event name -> display name
    #[serde(default)]
    pub display: Vec<AliasEntry>,
}

/// One alias table entry.
#[derive(Debug, Deserialize, Clone)]
pub struct AliasEntry {
    pub from: String,
    pub to: String,
}

/// Structural filter configuration.
#[derive(Debug, Deserialize)]
pub struct FilterConfig {
    /// Substrings identifying relevant campaign events; empty disables the
    /// relevance check
    #[serde(default = "default_relevance_markers")]
    pub relevance_markers: Vec<String>,

    /// Case-insensitive regexes; names matching any of them are dropped
    /// regardless of the relevance markers
    #[serde(default)]
    pub exclude_markers: Vec<String>,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            relevance_markers: default_relevance_markers(),
            exclude_markers: Vec::new(),
        }
    }
}

fn default_relevance_markers() -> Vec<String> {
    vec!["outbound".to_string(), "ativação".to_string()]
}

/// Aggregation configuration.
#[derive(Debug, Deserialize, Default)]
pub struct AggregateConfig {
    /// Drop time-bucketed rows whose response rate exceeds 100%
    #[serde(default)]
    pub clip_over_100: bool,
}

/// Logging configuration
#[derive(Debug, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    /// Load configuration from the default path
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path();

        if !config_path.exists() {
            tracing::info!("No config file found at {:?}, using defaults", config_path);
            return Ok(Config::default());
        }

        Self::load_from(&config_path)
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &PathBuf) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("failed to read config file {:?}: {}", path, e)))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("failed to parse config: {}", e)))?;

        Ok(config)
    }

    /// Returns the default config file path
    ///
    /// `$XDG_CONFIG_HOME/fupboard/config.toml` (~/.config/fupboard/config.toml)
    pub fn config_path() -> PathBuf {
        xdg_config_home().join("fupboard").join("config.toml")
    }

    /// Returns the state directory path (for logs)
    ///
    /// `$XDG_STATE_HOME/fupboard/` (~/.local/state/fupboard/)
    pub fn state_dir() -> PathBuf {
        xdg_state_home().join("fupboard")
    }

    /// Returns the log file path
    ///
    /// `$XDG_STATE_HOME/fupboard/fupboard.log`
    pub fn log_path() -> PathBuf {
        Self::state_dir().join("fupboard.log")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.source.uri.is_none());
        assert_eq!(config.source.database, "growth");
        assert_eq!(config.source.collection, "events");
        assert_eq!(config.source.refresh_secs, 600);
        assert!(config.classifier.patterns.is_empty());
        assert!(!config.aggregate.clip_over_100);
        assert_eq!(
            config.filter.relevance_markers,
            vec!["outbound".to_string(), "ativação".to_string()]
        );
        assert!(config.filter.exclude_markers.is_empty());
    }

    #[test]
    fn test_parse_config() {
        let toml = r#"
[source]
uri = "mongodb://localhost:27017"
refresh_secs = 300

[[classifier.patterns]]
name = "neg_v2"
pattern = "neg[45]"

[[aliases.display]]
from = "robo_outbound_neg1_envio"
to = "Negotiation 1"

[filter]
relevance_markers = ["outbound"]
exclude_markers = ['\[OUTBOUND\] FLUXO LEAD']

[aggregate]
clip_over_100 = true

[logging]
level = "debug"
"#;
        let config: Config = toml::from_str(toml).unwrap();

        assert_eq!(config.source.uri.as_deref(), Some("mongodb://localhost:27017"));
        assert_eq!(config.source.refresh_secs, 300);
        assert_eq!(config.source.database, "growth");
        assert_eq!(config.classifier.patterns.len(), 1);
        assert_eq!(config.classifier.patterns[0].name, "neg_v2");
        assert_eq!(config.aliases.display.len(), 1);
        assert_eq!(config.filter.relevance_markers, vec!["outbound".to_string()]);
        assert_eq!(
            config.filter.exclude_markers,
            vec![r"\[OUTBOUND\] FLUXO LEAD".to_string()]
        );
        assert!(config.aggregate.clip_over_100);
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_config_paths() {
        assert!(Config::config_path().ends_with("fupboard/config.toml"));
        assert!(Config::log_path().ends_with("fupboard/fupboard.log"));
    }
}
