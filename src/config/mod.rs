//! Configuration management
//!
//! This module handles loading and parsing configuration for Newsdesk.
//! Configuration can be loaded from:
//! - config.yml file
//! - Environment variables (override file settings)
//!
//! Missing optional values are filled with sensible defaults.

use serde::{Deserialize, Serialize};

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,
    /// Database configuration
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Session configuration
    #[serde(default)]
    pub session: SessionConfig,
    /// News feed configuration
    #[serde(default)]
    pub news: NewsConfig,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind to
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// SQLite database path or URL (`:memory:` for an in-memory database)
    #[serde(default = "default_database_url")]
    pub url: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: default_database_url(),
        }
    }
}

fn default_database_url() -> String {
    "data/newsdesk.db".to_string()
}

/// Session configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Lifetime of a login session in days
    #[serde(default = "default_expiration_days")]
    pub expiration_days: i64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            expiration_days: default_expiration_days(),
        }
    }
}

fn default_expiration_days() -> i64 {
    7
}

/// News feed configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewsConfig {
    /// Maximum number of news items on the home page
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    /// Substrings rejected in comment text (matched case-insensitively)
    #[serde(default = "default_banned_words")]
    pub banned_words: Vec<String>,
}

impl Default for NewsConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            banned_words: default_banned_words(),
        }
    }
}

fn default_page_size() -> u32 {
    10
}

fn default_banned_words() -> Vec<String> {
    vec!["редиска".to_string(), "негодяй".to_string()]
}

/// Error type for configuration parsing
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    FileRead {
        path: String,
        source: std::io::Error,
    },
    #[error("Failed to parse config file '{path}': {message}")]
    ParseError {
        path: String,
        message: String,
    },
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

impl Config {
    /// Load configuration from file
    ///
    /// If the file doesn't exist, returns default configuration.
    /// If the file exists but is invalid YAML, returns an error with details.
    pub fn load(path: &std::path::Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
            path: path.display().to_string(),
            source: e,
        })?;

        // Handle empty file - return defaults
        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        let config: Config = serde_yaml::from_str(&content).map_err(|e| {
            ConfigError::ParseError {
                path: path.display().to_string(),
                message: format_yaml_error(&e),
            }
        })?;

        config.validate()?;

        Ok(config)
    }

    /// Load configuration from file with environment variable overrides
    ///
    /// Environment variables follow the pattern:
    /// - NEWSDESK_SERVER_HOST
    /// - NEWSDESK_SERVER_PORT
    /// - NEWSDESK_DATABASE_URL
    /// - NEWSDESK_SESSION_EXPIRATION_DAYS
    /// - NEWSDESK_NEWS_PAGE_SIZE
    /// - NEWSDESK_NEWS_BANNED_WORDS (comma separated)
    pub fn load_with_env(path: &std::path::Path) -> anyhow::Result<Self> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Reject values that would make the application unusable
    fn validate(&self) -> Result<(), ConfigError> {
        if self.news.page_size == 0 {
            return Err(ConfigError::ValidationError(
                "news.page_size must be greater than zero".to_string(),
            ));
        }
        if self.session.expiration_days <= 0 {
            return Err(ConfigError::ValidationError(
                "session.expiration_days must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// Apply environment variable overrides to the configuration
    fn apply_env_overrides(&mut self) {
        if let Ok(host) = std::env::var("NEWSDESK_SERVER_HOST") {
            self.server.host = host;
        }
        if let Ok(port) = std::env::var("NEWSDESK_SERVER_PORT") {
            if let Ok(port) = port.parse::<u16>() {
                self.server.port = port;
            }
        }

        if let Ok(url) = std::env::var("NEWSDESK_DATABASE_URL") {
            self.database.url = url;
        }

        if let Ok(days) = std::env::var("NEWSDESK_SESSION_EXPIRATION_DAYS") {
            match days.parse::<i64>() {
                Ok(days) if days > 0 => self.session.expiration_days = days,
                _ => {} // Ignore invalid values
            }
        }

        if let Ok(size) = std::env::var("NEWSDESK_NEWS_PAGE_SIZE") {
            match size.parse::<u32>() {
                Ok(size) if size > 0 => self.news.page_size = size,
                _ => {}
            }
        }
        if let Ok(words) = std::env::var("NEWSDESK_NEWS_BANNED_WORDS") {
            self.news.banned_words = words
                .split(',')
                .map(|w| w.trim().to_string())
                .filter(|w| !w.is_empty())
                .collect();
        }
    }
}

/// Format YAML parsing error with location and context
fn format_yaml_error(e: &serde_yaml::Error) -> String {
    if let Some(location) = e.location() {
        format!(
            "at line {}, column {}: {}",
            location.line(),
            location.column(),
            e
        )
    } else {
        e.to_string()
    }
}

// Shared mutex for all config tests that modify environment variables.
#[cfg(test)]
static CONFIG_ENV_MUTEX: std::sync::Mutex<()> = std::sync::Mutex::new(());

#[cfg(test)]
const ENV_KEYS: &[&str] = &[
    "NEWSDESK_SERVER_HOST",
    "NEWSDESK_SERVER_PORT",
    "NEWSDESK_DATABASE_URL",
    "NEWSDESK_SESSION_EXPIRATION_DAYS",
    "NEWSDESK_NEWS_PAGE_SIZE",
    "NEWSDESK_NEWS_BANNED_WORDS",
];

#[cfg(test)]
fn clear_env() {
    for key in ENV_KEYS {
        std::env::remove_var(key);
    }
}
