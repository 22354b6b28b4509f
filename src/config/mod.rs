//! Configuration management
//!
//! This module provides YAML-based configuration with support for:
//! - Environment variable overrides
//! - Multiple configuration file locations
//! - Default values for all settings
//!
//! The data-access core never reads files or the environment itself. It only
//! needs something implementing [`ConfigSource`], a plain key/value lookup.

use std::collections::HashMap;
use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::utils::{AppError, AppResult};

/// Key/value capability the data source is configured from
pub trait ConfigSource {
    fn get(&self, key: &str) -> Option<String>;
}

impl ConfigSource for HashMap<String, String> {
    fn get(&self, key: &str) -> Option<String> {
        HashMap::get(self, key).cloned()
    }
}

/// Main application configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Database connection parameters
#[derive(Clone, Deserialize, Serialize, PartialEq)]
pub struct DatabaseConfig {
    /// Driver identifier (`sqlite`, `sqlite3` or `org.sqlite.JDBC`)
    #[serde(default = "default_driver")]
    pub driver: String,
    pub url: String,
    /// Default user name; `user` is accepted as an alias
    #[serde(default, alias = "user")]
    pub name: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

fn default_driver() -> String {
    "sqlite".to_string()
}

fn default_database_url() -> String {
    "sqlite://./data/users.db".to_string()
}

impl std::fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("driver", &self.driver)
            .field("url", &self.url)
            .field("name", &self.name)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            driver: default_driver(),
            url: default_database_url(),
            name: None,
            password: None,
        }
    }
}

impl DatabaseConfig {
    /// Read connection parameters from a key/value source.
    ///
    /// `driver` and `url` are required. `user` wins over `name` when both
    /// are present.
    pub fn from_source(source: &dyn ConfigSource) -> AppResult<Self> {
        let driver = non_blank(source.get("driver"))
            .ok_or_else(|| AppError::Config("missing required key: driver".to_string()))?;
        let url = non_blank(source.get("url"))
            .ok_or_else(|| AppError::Config("missing required key: url".to_string()))?;

        Ok(Self {
            driver,
            url,
            name: non_blank(source.get("user")).or_else(|| non_blank(source.get("name"))),
            password: source.get("password"),
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

impl ConfigSource for DatabaseConfig {
    fn get(&self, key: &str) -> Option<String> {
        match key {
            "driver" => Some(self.driver.clone()),
            "url" => Some(self.url.clone()),
            "name" | "user" => self.name.clone(),
            "password" => self.password.clone(),
            _ => None,
        }
    }
}

impl ConfigSource for AppConfig {
    fn get(&self, key: &str) -> Option<String> {
        self.database.get(key)
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: LogFormat,
    /// Log output target (console or file)
    #[serde(default = "default_log_target")]
    pub target: LogTarget,
    /// Directory for log files (used when target is "file")
    #[serde(default = "default_log_dir")]
    pub log_dir: PathBuf,
    /// Log file name prefix
    #[serde(default = "default_log_prefix")]
    pub log_prefix: String,
    /// Enable daily log rotation
    #[serde(default = "default_log_rotation")]
    pub daily_rotation: bool,
}

/// Log output target
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum LogTarget {
    /// Log to console (stdout/stderr)
    #[default]
    Console,
    /// Log to file with optional rotation
    File,
    /// Log to both console and file
    Both,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
    Compact,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> LogFormat {
    LogFormat::Pretty
}

fn default_log_target() -> LogTarget {
    LogTarget::Console
}

fn default_log_dir() -> PathBuf {
    PathBuf::from("./logs")
}

fn default_log_prefix() -> String {
    "user-repository".to_string()
}

fn default_log_rotation() -> bool {
    true
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            target: default_log_target(),
            log_dir: default_log_dir(),
            log_prefix: default_log_prefix(),
            daily_rotation: default_log_rotation(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database: DatabaseConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values
    /// 2. Configuration file (YAML)
    /// 3. Environment variables
    pub fn load() -> Result<Self> {
        // Try to load .env file if it exists
        let _ = dotenvy::dotenv();

        let config_path = std::env::var("USERDB_CONFIG")
            .map(PathBuf::from)
            .ok()
            .or_else(Self::find_config_file);

        let mut config = match config_path {
            Some(ref path) if path.exists() => Self::from_file(path)?,
            _ => AppConfig::default(),
        };

        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;

        Ok(config)
    }

    /// Parse a YAML configuration file
    pub fn from_file(path: &PathBuf) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        serde_norway::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {:?}", path))
    }

    /// Find the configuration file in standard locations
    fn find_config_file() -> Option<PathBuf> {
        let paths = [
            PathBuf::from("config.yaml"),
            PathBuf::from("config/config.yaml"),
            PathBuf::from("/etc/user-repository/config.yaml"),
            dirs::config_dir()
                .map(|p| p.join("user-repository/config.yaml"))
                .unwrap_or_default(),
        ];

        paths.into_iter().find(|p| p.exists())
    }

    /// Apply overrides from an environment-like lookup
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(driver) = lookup("DATABASE_DRIVER") {
            self.database.driver = driver;
        }
        if let Some(url) = lookup("DATABASE_URL") {
            self.database.url = url;
        }
        if let Some(user) = lookup("DATABASE_USER") {
            self.database.name = Some(user);
        }
        if let Some(password) = lookup("DATABASE_PASSWORD") {
            self.database.password = Some(password);
        }

        if let Some(level) = lookup("RUST_LOG") {
            self.logging.level = level;
        }
        if let Some(format) = lookup("USERDB_LOG_FORMAT") {
            self.logging.format = match format.to_lowercase().as_str() {
                "json" => LogFormat::Json,
                "compact" => LogFormat::Compact,
                _ => LogFormat::Pretty,
            };
        }
        if let Some(target) = lookup("USERDB_LOG_TARGET") {
            self.logging.target = match target.to_lowercase().as_str() {
                "file" => LogTarget::File,
                "both" => LogTarget::Both,
                _ => LogTarget::Console,
            };
        }
        if let Some(dir) = lookup("USERDB_LOG_DIR") {
            self.logging.log_dir = PathBuf::from(dir);
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.database.driver.trim().is_empty() {
            anyhow::bail!("Database driver cannot be empty");
        }
        if self.database.url.trim().is_empty() {
            anyhow::bail!("Database URL cannot be empty");
        }
        Ok(())
    }
}
