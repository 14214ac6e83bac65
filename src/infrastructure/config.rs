//! Configuration infrastructure
//!
//! Contains configuration loading and management for bot runs.
//!
//! Configuration is an explicit value handed to each `WebBot`; nothing here
//! is process-global. `ConfigManager` persists it as pretty-printed JSON.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tokio::fs;
use tracing::{info, warn};

use crate::infrastructure::http_client::DEFAULT_USER_AGENT;

/// Complete application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Fetch behaviour
    pub bot: BotConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Settings read by every bot run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BotConfig {
    /// Timeout passed to each GET, in seconds
    pub default_timeout_seconds: f64,

    /// Pause between consecutive fetches in seconds, 0 for none
    pub delay_between_fetches_seconds: f64,

    /// Prefix scheme-less URLs with `https://` instead of `http://`.
    ///
    /// An explicit scheme on a URL is never rewritten.
    pub force_https: bool,

    /// Return the raw matched span alongside extracted field values
    pub include_raw_field_values: bool,

    /// Directory used by the storage sink
    pub storage_directory: PathBuf,

    /// User agent string
    pub user_agent: String,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            default_timeout_seconds: defaults::TIMEOUT_SECONDS,
            delay_between_fetches_seconds: defaults::DELAY_BETWEEN_FETCHES_SECONDS,
            force_https: defaults::FORCE_HTTPS,
            include_raw_field_values: defaults::INCLUDE_RAW_FIELD_VALUES,
            storage_directory: PathBuf::from(defaults::STORAGE_DIRECTORY),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: "error", "warn", "info", "debug", "trace"
    pub level: String,

    /// Enable JSON formatted logs
    pub json_format: bool,

    /// Enable console output
    pub console_output: bool,

    /// Enable file output
    pub file_output: bool,

    /// Directory for log files
    pub log_directory: PathBuf,

    /// Module-specific log level filters (e.g., "reqwest": "info")
    pub module_filters: HashMap<String, String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: defaults::LOG_LEVEL.to_string(),
            json_format: defaults::LOG_JSON_FORMAT,
            console_output: defaults::LOG_CONSOLE_OUTPUT,
            file_output: defaults::LOG_FILE_OUTPUT,
            log_directory: PathBuf::from(defaults::LOG_DIRECTORY),
            module_filters: {
                let mut filters = HashMap::new();
                filters.insert("reqwest".to_string(), "info".to_string());
                filters.insert("hyper".to_string(), "warn".to_string());
                filters.insert("h2".to_string(), "warn".to_string());
                filters
            },
        }
    }
}

/// Configuration manager for loading and saving settings
pub struct ConfigManager {
    pub config_path: PathBuf,
}

impl ConfigManager {
    /// Get the application configuration directory
    pub fn get_config_dir() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Failed to get user config directory")?
            .join("webbot");

        Ok(config_dir)
    }

    /// Configuration manager using the per-user config location
    pub fn new() -> Result<Self> {
        let config_path = Self::get_config_dir()?.join(defaults::CONFIG_FILE_NAME);
        Ok(Self { config_path })
    }

    /// Configuration manager for an explicit file
    pub fn with_path(config_path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: config_path.into(),
        }
    }

    /// Load configuration from file, creating default if it doesn't exist
    pub async fn load_config(&self) -> Result<AppConfig> {
        if !fs::try_exists(&self.config_path).await.unwrap_or(false) {
            info!("Configuration file not found, creating default: {:?}", self.config_path);
            let default_config = AppConfig::default();
            self.save_config(&default_config).await?;
            return Ok(default_config);
        }

        let content = fs::read_to_string(&self.config_path)
            .await
            .with_context(|| format!("Failed to read configuration file {:?}", self.config_path))?;

        let config: AppConfig = serde_json::from_str(&content)
            .with_context(|| format!("Invalid configuration file {:?}", self.config_path))?;

        if config.bot.default_timeout_seconds < 0.1 {
            warn!(
                "default_timeout_seconds={} is below 0.1s; requests will use the 60s fallback",
                config.bot.default_timeout_seconds
            );
        }

        info!("Loaded configuration from: {:?}", self.config_path);
        Ok(config)
    }

    /// Save configuration to file
    pub async fn save_config(&self, config: &AppConfig) -> Result<()> {
        if let Some(parent) = self.config_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .await
                .context("Failed to create config directory")?;
        }

        let content =
            serde_json::to_string_pretty(config).context("Failed to serialize configuration")?;

        fs::write(&self.config_path, content)
            .await
            .context("Failed to write configuration file")?;

        info!("Saved configuration to: {:?}", self.config_path);
        Ok(())
    }

    /// Get the configuration file path
    pub fn config_path(&self) -> &Path {
        &self.config_path
    }
}

/// Default configuration values
pub mod defaults {
    /// Default request timeout in seconds
    pub const TIMEOUT_SECONDS: f64 = 30.0;

    /// Default delay between fetches in seconds
    pub const DELAY_BETWEEN_FETCHES_SECONDS: f64 = 0.0;

    pub const FORCE_HTTPS: bool = false;

    pub const INCLUDE_RAW_FIELD_VALUES: bool = false;

    /// Default storage directory for extracted data
    pub const STORAGE_DIRECTORY: &str = "./data/";

    pub const CONFIG_FILE_NAME: &str = "webbot_config.json";

    // Log configuration defaults
    pub const LOG_LEVEL: &str = "info";

    pub const LOG_JSON_FORMAT: bool = false;

    pub const LOG_CONSOLE_OUTPUT: bool = true;

    pub const LOG_FILE_OUTPUT: bool = false;

    pub const LOG_DIRECTORY: &str = "logs";
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_bot_config_defaults() {
        let config = BotConfig::default();
        assert_eq!(config.default_timeout_seconds, 30.0);
        assert_eq!(config.delay_between_fetches_seconds, 0.0);
        assert!(!config.force_https);
        assert!(!config.include_raw_field_values);
        assert_eq!(config.storage_directory, PathBuf::from("./data/"));
        assert_eq!(config.user_agent, DEFAULT_USER_AGENT);
    }

    #[test]
    fn test_logging_config_default() {
        let config = LoggingConfig::default();
        assert!(!config.level.is_empty());
        assert!(config.console_output);
        assert!(!config.file_output);
        assert_eq!(config.module_filters.get("hyper").map(String::as_str), Some("warn"));
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: AppConfig =
            serde_json::from_str(r#"{"bot": {"force_https": true, "delay_between_fetches_seconds": 1.5}}"#)
                .unwrap();
        assert!(config.bot.force_https);
        assert_eq!(config.bot.delay_between_fetches_seconds, 1.5);
        assert_eq!(config.bot.default_timeout_seconds, 30.0);
        assert_eq!(config.logging.level, "info");
    }

    #[tokio::test]
    async fn test_load_creates_default_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("webbot_config.json");
        let manager = ConfigManager::with_path(&path);

        let config = manager.load_config().await.unwrap();

        assert!(path.exists());
        assert_eq!(config.bot.default_timeout_seconds, 30.0);
    }

    #[tokio::test]
    async fn test_save_and_reload() {
        let temp_dir = TempDir::new().unwrap();
        let manager = ConfigManager::with_path(temp_dir.path().join("webbot_config.json"));

        let mut config = AppConfig::default();
        config.bot.force_https = true;
        config.bot.storage_directory = PathBuf::from("/tmp/webbot-data");
        manager.save_config(&config).await.unwrap();

        let loaded = manager.load_config().await.unwrap();
        assert!(loaded.bot.force_https);
        assert_eq!(loaded.bot.storage_directory, PathBuf::from("/tmp/webbot-data"));
    }

    #[tokio::test]
    async fn test_invalid_json_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("webbot_config.json");
        std::fs::write(&path, "{ not json").unwrap();

        let result = ConfigManager::with_path(&path).load_config().await;

        assert!(result.is_err());
    }
}
