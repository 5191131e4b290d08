//! Configuration handling for docsync
//!
//! Configuration is stored in `<data dir>/docsync.toml` (per addon) and
//! `~/.config/docsync/config.toml` (global).

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::key::DEFAULT_KEY_FILE;
use crate::domain::SyntaxCategory;

/// Per-addon config file name
pub const CONFIG_FILE: &str = "docsync.toml";

/// Base URL of the documentation API
pub const DEFAULT_API_URL: &str = "https://docs.skunity.com/api/";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Failed to parse configuration: {0}")]
    Parse(String),
}

/// Settings for the sync pipeline of one addon
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Documentation API endpoint
    pub api_url: String,

    /// Key file name, relative to the data directory
    pub key_file: String,

    /// Delay between a successful download and the upload
    pub upload_delay_ms: u64,

    /// HTTP timeout for every API call
    pub timeout_secs: u64,

    /// Rewrite registration patterns into their readable form
    pub friendly_patterns: bool,

    /// Only publish elements that belong to the addon
    pub owned_only: bool,

    /// Categories extracted from the host
    pub categories: Vec<SyntaxCategory>,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            key_file: DEFAULT_KEY_FILE.to_string(),
            upload_delay_ms: 250,
            timeout_secs: 30,
            friendly_patterns: true,
            owned_only: true,
            categories: SyntaxCategory::ALL.to_vec(),
        }
    }
}

impl SyncConfig {
    /// Checks values that would only fail later at request time
    pub fn validate(&self) -> Result<(), ConfigError> {
        url::Url::parse(&self.api_url)
            .map_err(|e| ConfigError::Invalid(format!("api_url '{}': {}", self.api_url, e)))?;

        if self.key_file.trim().is_empty() {
            return Err(ConfigError::Invalid("key_file must not be empty".to_string()));
        }
        if self.timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "timeout_secs must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    pub fn upload_delay(&self) -> Duration {
        Duration::from_millis(self.upload_delay_ms)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Global user configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct GlobalConfig {
    /// Default output format (text or json)
    pub default_format: OutputFormat,

    /// Overrides `api_url` for every addon
    pub api_url: Option<String>,
}

/// Output format for commands
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Combined configuration (global + addon)
#[derive(Debug, Clone)]
pub struct Config {
    pub sync: SyncConfig,
    pub global: GlobalConfig,
    pub data_dir: PathBuf,
}

impl Config {
    /// Loads configuration for the addon data directory
    pub fn load(data_dir: &Path) -> Result<Self> {
        let global = Self::load_global()?;
        let sync = Self::load_sync(data_dir, &global)?;

        Ok(Self {
            sync,
            global,
            data_dir: data_dir.to_path_buf(),
        })
    }

    /// Returns the global config directory
    pub fn global_config_dir() -> Option<PathBuf> {
        ProjectDirs::from("dev", "docsync", "docsync").map(|dirs| dirs.config_dir().to_path_buf())
    }

    /// Path of the addon config file in `data_dir`
    pub fn config_path(data_dir: &Path) -> PathBuf {
        data_dir.join(CONFIG_FILE)
    }

    /// Path of the key file
    pub fn key_path(&self) -> PathBuf {
        self.data_dir.join(&self.sync.key_file)
    }

    /// Returns true if the data directory has a config file
    pub fn is_initialized(&self) -> bool {
        Self::config_path(&self.data_dir).exists()
    }

    /// Loads global configuration
    fn load_global() -> Result<GlobalConfig> {
        let config_dir = match Self::global_config_dir() {
            Some(dir) => dir,
            None => return Ok(GlobalConfig::default()),
        };

        let config_path = config_dir.join("config.toml");
        if !config_path.exists() {
            return Ok(GlobalConfig::default());
        }

        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read global config: {}", config_path.display()))?;

        toml::from_str(&content)
            .map_err(|e| ConfigError::Parse(e.to_string()))
            .context("Failed to parse global config")
    }

    /// Loads the addon configuration, applying global overrides
    fn load_sync(data_dir: &Path, global: &GlobalConfig) -> Result<SyncConfig> {
        let config_path = Self::config_path(data_dir);

        let mut config = if config_path.exists() {
            let content = fs::read_to_string(&config_path).with_context(|| {
                format!("Failed to read addon config: {}", config_path.display())
            })?;
            Self::parse_sync(&content)?
        } else {
            SyncConfig::default()
        };

        if let Some(api_url) = &global.api_url {
            config.api_url = api_url.clone();
        }

        config.validate().context("Invalid addon config")?;
        Ok(config)
    }

    /// Parses addon configuration from TOML text
    pub fn parse_sync(content: &str) -> Result<SyncConfig> {
        toml::from_str(content)
            .map_err(|e| ConfigError::Parse(e.to_string()))
            .context("Failed to parse addon config")
    }

    /// Saves the addon configuration, creating the data directory if needed
    pub fn save_sync(&self) -> Result<()> {
        fs::create_dir_all(&self.data_dir).with_context(|| {
            format!(
                "Failed to create data directory: {}",
                self.data_dir.display()
            )
        })?;

        let config_path = Self::config_path(&self.data_dir);
        let content =
            toml::to_string_pretty(&self.sync).context("Failed to serialize addon config")?;

        fs::write(&config_path, content)
            .with_context(|| format!("Failed to write addon config: {}", config_path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_config() {
        let config = SyncConfig::default();

        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert_eq!(config.key_file, "addon.key");
        assert_eq!(config.upload_delay(), Duration::from_millis(250));
        assert_eq!(config.timeout(), Duration::from_secs(30));
        assert!(config.friendly_patterns);
        assert!(config.owned_only);
        assert_eq!(config.categories.len(), 5);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn parse_partial_config() {
        let toml = r#"
upload_delay_ms = 1000
owned_only = false
categories = ["effect", "expression"]
"#;

        let config = Config::parse_sync(toml).unwrap();
        assert_eq!(config.upload_delay_ms, 1000);
        assert!(!config.owned_only);
        assert_eq!(
            config.categories,
            vec![SyntaxCategory::Effect, SyntaxCategory::Expression]
        );
        assert_eq!(config.timeout_secs, 30);
    }

    #[test]
    fn parse_global_config() {
        let toml = r#"
default_format = "json"
api_url = "http://localhost:8080/api/"
"#;

        let config: GlobalConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.default_format, OutputFormat::Json);
        assert_eq!(config.api_url.as_deref(), Some("http://localhost:8080/api/"));
    }

    #[test]
    fn invalid_values_are_rejected() {
        let config = SyncConfig {
            api_url: "not a url".to_string(),
            ..SyncConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let config = SyncConfig {
            timeout_secs: 0,
            ..SyncConfig::default()
        };
        assert!(config.validate().is_err());

        let config = SyncConfig {
            key_file: " ".to_string(),
            ..SyncConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn unparsable_config() {
        assert!(Config::parse_sync("upload_delay_ms = \"soon\"").is_err());
    }

    #[test]
    fn save_and_reload() {
        let dir = TempDir::new().unwrap();
        let data_dir = dir.path().join("MyAddon");

        let config = Config {
            sync: SyncConfig {
                friendly_patterns: false,
                ..SyncConfig::default()
            },
            global: GlobalConfig::default(),
            data_dir: data_dir.clone(),
        };
        assert!(!config.is_initialized());

        config.save_sync().unwrap();
        assert!(config.is_initialized());

        let content = fs::read_to_string(Config::config_path(&data_dir)).unwrap();
        let reloaded = Config::parse_sync(&content).unwrap();
        assert_eq!(reloaded, config.sync);
        assert_eq!(config.key_path(), data_dir.join("addon.key"));
    }
}
