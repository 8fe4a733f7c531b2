//! Configuration management
//!
//! This module handles loading, validation, and management of the Parley configuration.
//! Configuration is stored in TOML format at ~/.parley/config.toml.
//!
//! # Configuration Sections
//!
//! - **core**: Log level
//! - **identity**: Assistant name and creator shown in identity answers
//! - **router**: Default model and short-prompt threshold
//! - **search**: Result limit and per-provider settings
//! - **memory**: Long-term memory capacity and importance scores
//! - **stream**: Tick interval for incremental output
//!
//! Every field has a default, so an empty file is a valid configuration.
//!
//! # Examples
//!
//! ```no_run
//! use parley_engine::config::Config;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::load_or_create()?;
//! println!("Default model: {}", config.router.default_model);
//! # Ok(())
//! # }
//! ```

use sdk::errors::EngineError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::llm::router::{ModelRouter, AUTO_MODEL_ID};

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Core engine settings
    #[serde(default)]
    pub core: CoreConfig,

    /// Identity narrative overrides
    #[serde(default)]
    pub identity: IdentityConfig,

    /// Model routing settings
    #[serde(default)]
    pub router: RouterConfig,

    /// Search aggregation settings
    #[serde(default)]
    pub search: SearchConfig,

    /// Long-term memory settings
    #[serde(default)]
    pub memory: MemoryConfig,

    /// Streaming output settings
    #[serde(default)]
    pub stream: StreamConfig,
}

/// Core engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoreConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

/// Identity configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityConfig {
    /// Assistant name
    #[serde(default = "default_identity_name")]
    pub name: String,

    /// Who built the assistant
    #[serde(default = "default_identity_creator")]
    pub creator: String,

    /// Where the assistant was built
    #[serde(default = "default_identity_location")]
    pub creator_location: String,
}

/// Model router configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouterConfig {
    /// Model id used when the caller does not choose one
    #[serde(default = "default_model_id")]
    pub default_model: String,

    /// Prompts shorter than this (in characters) route to the fast model
    #[serde(default = "default_short_prompt_threshold")]
    pub short_prompt_threshold: usize,
}

/// Search aggregator configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Maximum number of results returned after deduplication
    #[serde(default = "default_max_results")]
    pub max_results: usize,

    /// DuckDuckGo Instant Answer provider
    #[serde(default = "default_duckduckgo")]
    pub duckduckgo: ProviderConfig,

    /// Wikipedia opensearch provider
    #[serde(default)]
    pub wikipedia: WikipediaConfig,

    /// SearXNG instance (disabled unless a base URL is configured)
    #[serde(default = "default_searxng")]
    pub searxng: ProviderConfig,
}

/// Settings shared by every HTTP search provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Whether the aggregator queries this provider
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Base URL of the provider's API
    #[serde(default)]
    pub base_url: String,

    /// Per-call timeout in seconds
    #[serde(default = "default_provider_timeout_secs")]
    pub timeout_secs: u64,
}

impl ProviderConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Wikipedia provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WikipediaConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default = "default_wikipedia_base_url")]
    pub base_url: String,

    #[serde(default = "default_wikipedia_timeout_secs")]
    pub timeout_secs: u64,

    /// Number of titles requested per query
    #[serde(default = "default_wikipedia_limit")]
    pub limit: usize,
}

/// Long-term memory configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryConfig {
    /// Maximum number of retained entries
    #[serde(default = "default_memory_capacity")]
    pub capacity: usize,

    /// Importance of identity exchanges
    #[serde(default = "default_identity_importance")]
    pub identity_importance: i32,

    /// Importance of generated exchanges
    #[serde(default = "default_importance")]
    pub default_importance: i32,
}

/// Streaming output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamConfig {
    /// Delay between chunks in milliseconds
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,
}

impl StreamConfig {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }
}

// Default value functions
fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

fn default_identity_name() -> String {
    "Parley".to_string()
}

fn default_identity_creator() -> String {
    "the Parley Team".to_string()
}

fn default_identity_location() -> String {
    "an open-source workshop".to_string()
}

fn default_model_id() -> String {
    AUTO_MODEL_ID.to_string()
}

fn default_short_prompt_threshold() -> usize {
    50
}

fn default_max_results() -> usize {
    10
}

fn default_provider_timeout_secs() -> u64 {
    10
}

fn default_duckduckgo() -> ProviderConfig {
    ProviderConfig {
        enabled: true,
        base_url: "https://api.duckduckgo.com".to_string(),
        timeout_secs: 10,
    }
}

fn default_searxng() -> ProviderConfig {
    ProviderConfig {
        enabled: false,
        base_url: "http://localhost:8888".to_string(),
        timeout_secs: 5,
    }
}

fn default_wikipedia_base_url() -> String {
    "https://en.wikipedia.org".to_string()
}

fn default_wikipedia_timeout_secs() -> u64 {
    8
}

fn default_wikipedia_limit() -> usize {
    5
}

fn default_memory_capacity() -> usize {
    100
}

fn default_identity_importance() -> i32 {
    10
}

fn default_importance() -> i32 {
    5
}

fn default_tick_interval_ms() -> u64 {
    50
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            name: default_identity_name(),
            creator: default_identity_creator(),
            creator_location: default_identity_location(),
        }
    }
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            default_model: default_model_id(),
            short_prompt_threshold: default_short_prompt_threshold(),
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_results: default_max_results(),
            duckduckgo: default_duckduckgo(),
            wikipedia: WikipediaConfig::default(),
            searxng: default_searxng(),
        }
    }
}

impl Default for WikipediaConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: default_wikipedia_base_url(),
            timeout_secs: default_wikipedia_timeout_secs(),
            limit: default_wikipedia_limit(),
        }
    }
}

impl WikipediaConfig {
    /// The settings shared with the other HTTP providers
    pub fn provider(&self) -> ProviderConfig {
        ProviderConfig {
            enabled: self.enabled,
            base_url: self.base_url.clone(),
            timeout_secs: self.timeout_secs,
        }
    }
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            capacity: default_memory_capacity(),
            identity_importance: default_identity_importance(),
            default_importance: default_importance(),
        }
    }
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: default_tick_interval_ms(),
        }
    }
}

impl Config {
    /// Load configuration from the default location (~/.parley/config.toml)
    ///
    /// If the configuration file doesn't exist, creates a default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Configuration file cannot be read or written
    /// - TOML parsing fails
    /// - Validation fails
    pub fn load_or_create() -> Result<Self, EngineError> {
        let config_path = Self::default_config_path()?;

        if config_path.exists() {
            Self::load_from_path(&config_path)
        } else {
            Self::create_default(&config_path)
        }
    }

    /// Load configuration from a specific path
    pub fn load_from_path(path: &Path) -> Result<Self, EngineError> {
        let contents = fs::read_to_string(path)
            .map_err(|e| EngineError::Config(format!("Failed to read config file: {}", e)))?;

        Self::from_toml_str(&contents)
    }

    /// Parse and validate configuration from TOML text
    pub fn from_toml_str(contents: &str) -> Result<Self, EngineError> {
        let config: Config = toml::from_str(contents)
            .map_err(|e| EngineError::Config(format!("Failed to parse config: {}", e)))?;

        config.validate()?;

        Ok(config)
    }

    /// Create default configuration and save to path
    fn create_default(path: &Path) -> Result<Self, EngineError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                EngineError::Config(format!("Failed to create config directory: {}", e))
            })?;
        }

        let config = Self::default();
        config.validate()?;

        let toml_string = toml::to_string_pretty(&config)
            .map_err(|e| EngineError::Config(format!("Failed to serialize config: {}", e)))?;

        fs::write(path, toml_string)
            .map_err(|e| EngineError::Config(format!("Failed to write config file: {}", e)))?;

        tracing::info!("Created default configuration at {:?}", path);

        Ok(config)
    }

    /// Get the default configuration file path (~/.parley/config.toml)
    pub fn default_config_path() -> Result<PathBuf, EngineError> {
        let home = dirs::home_dir()
            .ok_or_else(|| EngineError::Config("Could not determine home directory".to_string()))?;

        Ok(home.join(".parley").join("config.toml"))
    }

    /// Validate configuration values
    ///
    /// # Errors
    ///
    /// Returns `EngineError::Config` naming the first offending field.
    pub fn validate(&self) -> Result<(), EngineError> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.core.log_level.as_str()) {
            return Err(EngineError::Config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.core.log_level,
                valid_log_levels.join(", ")
            )));
        }

        if ModelRouter::builtin_model(&self.router.default_model).is_none() {
            let known: Vec<&str> = ModelRouter::builtin_models()
                .iter()
                .map(|m| m.id.as_str())
                .collect();
            return Err(EngineError::Config(format!(
                "Unknown default model '{}'. Must be one of: {}",
                self.router.default_model,
                known.join(", ")
            )));
        }

        if self.search.max_results == 0 {
            return Err(EngineError::Config(
                "search.max_results must be greater than 0".to_string(),
            ));
        }

        for (name, provider) in [
            ("duckduckgo", self.search.duckduckgo.clone()),
            ("wikipedia", self.search.wikipedia.provider()),
            ("searxng", self.search.searxng.clone()),
        ] {
            if !(1..=60).contains(&provider.timeout_secs) {
                return Err(EngineError::Config(format!(
                    "search.{}.timeout_secs must be between 1 and 60",
                    name
                )));
            }
            if provider.enabled && provider.base_url.trim().is_empty() {
                return Err(EngineError::Config(format!(
                    "search.{}.base_url must be set when the provider is enabled",
                    name
                )));
            }
        }

        if self.search.wikipedia.limit == 0 {
            return Err(EngineError::Config(
                "search.wikipedia.limit must be greater than 0".to_string(),
            ));
        }

        if self.memory.capacity == 0 {
            return Err(EngineError::Config(
                "memory.capacity must be greater than 0".to_string(),
            ));
        }

        if self.stream.tick_interval_ms == 0 {
            return Err(EngineError::Config(
                "stream.tick_interval_ms must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_creation() {
        let config = Config::default();

        assert_eq!(config.core.log_level, "info");
        assert_eq!(config.router.default_model, "auto");
        assert_eq!(config.router.short_prompt_threshold, 50);
        assert_eq!(config.search.max_results, 10);
        assert_eq!(config.memory.capacity, 100);
        assert_eq!(config.memory.identity_importance, 10);
        assert_eq!(config.memory.default_importance, 5);
        assert!(config.search.duckduckgo.enabled);
        assert!(config.search.wikipedia.enabled);
        assert!(!config.search.searxng.enabled);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_file_is_valid() {
        let config = Config::from_toml_str("").unwrap();
        assert_eq!(config.stream.tick_interval_ms, 50);
        assert_eq!(config.search.duckduckgo.timeout_secs, 10);
        assert_eq!(config.search.wikipedia.timeout_secs, 8);
        assert_eq!(config.search.searxng.timeout_secs, 5);
    }

    #[test]
    fn test_partial_section_keeps_other_defaults() {
        let config = Config::from_toml_str(
            r#"
[memory]
capacity = 20

[search.searxng]
enabled = true
base_url = "http://searx.local"
timeout_secs = 6
"#,
        )
        .unwrap();

        assert_eq!(config.memory.capacity, 20);
        assert_eq!(config.memory.default_importance, 5);
        assert!(config.search.searxng.enabled);
        assert_eq!(config.search.searxng.timeout(), Duration::from_secs(6));
    }

    #[test]
    fn test_invalid_log_level_rejected() {
        let err = Config::from_toml_str("[core]\nlog_level = \"loud\"\n").unwrap_err();
        assert!(err.to_string().contains("Invalid log level"));
    }

    #[test]
    fn test_unknown_default_model_rejected() {
        let err = Config::from_toml_str("[router]\ndefault_model = \"gpt-9\"\n").unwrap_err();
        assert!(err.to_string().contains("Unknown default model"));
    }

    #[test]
    fn test_zero_capacity_rejected() {
        let mut config = Config::default();
        config.memory.capacity = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_timeout_out_of_range_rejected() {
        let mut config = Config::default();
        config.search.wikipedia.timeout_secs = 0;
        assert!(config.validate().is_err());

        config.search.wikipedia.timeout_secs = 61;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let toml_string = toml::to_string(&config).unwrap();

        let deserialized = Config::from_toml_str(&toml_string).unwrap();
        assert_eq!(config.core.log_level, deserialized.core.log_level);
        assert_eq!(
            config.search.wikipedia.limit,
            deserialized.search.wikipedia.limit
        );
        assert_eq!(
            config.search.duckduckgo.base_url,
            deserialized.search.duckduckgo.base_url
        );
    }
}
