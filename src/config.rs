// Configuration File Support
//
// This module provides configuration file parsing for the optimization MCP server.
// Supports TOML format with environment variable overrides.
// Configuration files are loaded from the XDG config directory:
// ~/.config/optimization-mcp/config.toml

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Prefix shared by all environment overrides
pub const ENV_PREFIX: &str = "OPTIMIZATION_";

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Config {
    /// Optimization service connection
    pub server: ServerConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Optimization service connection settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ServerConfig {
    /// Base URL of the optimization service
    pub url: String,

    /// Credential sent in the X-API-Key header
    pub api_key: Option<String>,

    /// Per-request timeout in milliseconds
    pub timeout_ms: u64,

    /// Retries after the first attempt for transient failures
    pub max_retries: u32,

    /// Delay before the first retry in milliseconds
    pub retry_base_delay_ms: u64,

    /// Log request and response bodies
    pub debug: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:8000".to_string(),
            api_key: None,
            timeout_ms: 30_000,
            max_retries: 3,
            retry_base_delay_ms: 1_000,
            debug: false,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Log format (json, pretty, compact)
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "compact".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from the default XDG config directory
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed.
    /// If the config file does not exist, defaults plus environment overrides are used.
    /// The result is not validated; call [`Config::validate`] once all
    /// overrides have been applied.
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path();
        Self::load_from_path(&config_path)
    }

    /// Load configuration from a specific path
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed.
    /// Validation is left to the caller, see [`Config::load`].
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let config = if path.exists() {
            let content = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file from {:?}", path))?;

            toml::from_str::<Config>(&content)
                .with_context(|| format!("Failed to parse config file from {:?}", path))?
        } else {
            Self::default()
        };

        // Environment variables take precedence over the file
        Ok(config.apply_env_overrides())
    }

    /// Get the default configuration file path
    ///
    /// Returns `~/.config/optimization-mcp/config.toml` on Linux
    pub fn config_path() -> PathBuf {
        if let Some(proj_dirs) =
            directories::ProjectDirs::from("com", "optimization-mcp", "optimization-mcp")
        {
            proj_dirs.config_dir().join("config.toml")
        } else {
            // Fallback if XDG dirs cannot be determined
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
            PathBuf::from(home)
                .join(".config")
                .join("optimization-mcp")
                .join("config.toml")
        }
    }

    /// Apply environment variable overrides to the configuration
    fn apply_env_overrides(self) -> Self {
        self.apply_overrides(|key| std::env::var(format!("{}{}", ENV_PREFIX, key)).ok())
    }

    /// Apply overrides from a key lookup (keys are given without the prefix)
    ///
    /// Recognised keys:
    /// - SERVER_URL
    /// - API_KEY
    /// - TIMEOUT_MS
    /// - MAX_RETRIES
    /// - RETRY_BASE_DELAY_MS
    /// - DEBUG
    /// - LOG_LEVEL
    /// - LOG_FORMAT
    ///
    /// Values that do not parse are ignored, as are zero timeouts and delays.
    pub fn apply_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        // Server overrides
        if let Some(url) = lookup("SERVER_URL") {
            self.server.url = url;
        }
        if let Some(key) = lookup("API_KEY") {
            self.server.api_key = Some(key);
        }
        if let Some(timeout) = lookup("TIMEOUT_MS") {
            if let Ok(timeout) = timeout.parse::<u64>() {
                if timeout > 0 {
                    self.server.timeout_ms = timeout;
                }
            }
        }
        if let Some(retries) = lookup("MAX_RETRIES") {
            if let Ok(retries) = retries.parse::<u32>() {
                self.server.max_retries = retries;
            }
        }
        if let Some(delay) = lookup("RETRY_BASE_DELAY_MS") {
            if let Ok(delay) = delay.parse::<u64>() {
                if delay > 0 {
                    self.server.retry_base_delay_ms = delay;
                }
            }
        }
        if let Some(debug) = lookup("DEBUG") {
            self.server.debug = parse_flag(&debug).unwrap_or(self.server.debug);
        }

        // Logging overrides
        if let Some(level) = lookup("LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = lookup("LOG_FORMAT") {
            self.logging.format = format;
        }

        self
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn validate(&self) -> Result<()> {
        // Validate server configuration
        let url = reqwest::Url::parse(&self.server.url)
            .with_context(|| format!("Invalid server URL: {}", self.server.url))?;
        match url.scheme() {
            "http" | "https" => {}
            other => anyhow::bail!("Invalid server URL scheme: {}. Must be http or https", other),
        }
        if self.server.timeout_ms == 0 {
            anyhow::bail!("Server timeout must be > 0 ms");
        }
        if self.server.retry_base_delay_ms == 0 {
            anyhow::bail!("Retry base delay must be > 0 ms");
        }
        if self.server.max_retries > 10 {
            anyhow::bail!("Max retries must be <= 10");
        }

        // Validate logging level
        match self.logging.level.to_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => anyhow::bail!(
                "Invalid log level: {}. Must be one of: trace, debug, info, warn, error",
                self.logging.level
            ),
        }

        // Validate logging format
        match self.logging.format.to_lowercase().as_str() {
            "json" | "pretty" | "compact" => {}
            _ => anyhow::bail!(
                "Invalid log format: {}. Must be one of: json, pretty, compact",
                self.logging.format
            ),
        }

        Ok(())
    }

    /// Convert log level string to tracing::Level
    pub fn log_level(&self) -> Result<tracing::Level> {
        self.logging
            .level
            .to_lowercase()
            .parse()
            .map_err(|e| anyhow::anyhow!("Failed to parse log level: {}", e))
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
