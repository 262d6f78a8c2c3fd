//! Configuration management for Rougechat
//!
//! This module handles loading, parsing, validating, and managing
//! configuration from files, environment variables, and CLI overrides.

use crate::error::{Result, RougechatError};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::Path;
use url::Url;

/// Main configuration structure for Rougechat
///
/// This structure holds all configuration needed by the client and the
/// relay server. Every field has a default, so an absent or empty config
/// file yields a working setup pointed at a local relay.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Relay client configuration (used by `chat` and `history`)
    #[serde(default)]
    pub relay: RelayConfig,

    /// Relay server configuration (used by `serve`)
    #[serde(default)]
    pub server: ServerConfig,
}

/// Relay client configuration
///
/// Where the chat client finds the relay and how long it waits for a reply.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelayConfig {
    /// Base URL of the relay server
    #[serde(default = "default_relay_url")]
    pub url: Url,

    /// Timeout for a single exchange (seconds)
    #[serde(default = "default_relay_timeout")]
    pub timeout_seconds: u64,
}

fn default_relay_url() -> Url {
    // Hardcoded literal, parse cannot fail.
    Url::parse("http://localhost:3001").expect("default relay URL is valid")
}

fn default_relay_timeout() -> u64 {
    120
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            url: default_relay_url(),
            timeout_seconds: default_relay_timeout(),
        }
    }
}

/// Relay server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Address the relay server binds to
    #[serde(default = "default_listen_addr")]
    pub listen: String,

    /// Upstream completion API settings
    #[serde(default)]
    pub upstream: UpstreamConfig,
}

fn default_listen_addr() -> String {
    "127.0.0.1:3001".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: default_listen_addr(),
            upstream: UpstreamConfig::default(),
        }
    }
}

/// Upstream completion API configuration
///
/// The relay forwards chat messages to an OpenAI-compatible
/// `/chat/completions` endpoint described here. `api_base` can point at a
/// local mock server in tests.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpstreamConfig {
    /// Base URL of the upstream API
    #[serde(default = "default_api_base")]
    pub api_base: String,

    /// Model requested from the upstream API
    #[serde(default = "default_model")]
    pub model: String,

    /// Sampling temperature passed to the upstream API
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Maximum tokens requested per completion
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// API key for the upstream (prefer env var OPENAI_API_KEY)
    #[serde(default)]
    pub api_key: Option<String>,
}

fn default_api_base() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_temperature() -> f32 {
    0.7
}

fn default_max_tokens() -> u32 {
    1000
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
            model: default_model(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            api_key: None,
        }
    }
}

impl Config {
    /// Load configuration from file with environment and CLI overrides
    ///
    /// # Arguments
    ///
    /// * `path` - Path to configuration file
    /// * `cli` - CLI arguments for overrides
    ///
    /// # Returns
    ///
    /// Returns the loaded and merged configuration
    ///
    /// # Errors
    ///
    /// Returns error if file cannot be read or parsed
    pub fn load(path: &str, cli: &crate::cli::Cli) -> Result<Self> {
        let mut config = if Path::new(path).exists() {
            Self::from_file(path)?
        } else {
            tracing::warn!("Config file not found at {}, using defaults", path);
            Self::default_config()
        };

        config.apply_env_vars();
        config.apply_cli_overrides(cli);

        Ok(config)
    }

    fn default_config() -> Self {
        Self {
            relay: RelayConfig::default(),
            server: ServerConfig::default(),
        }
    }

    fn from_file(path: &str) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| RougechatError::Config(format!("Failed to read config file: {}", e)))?;
        serde_yaml::from_str(&contents)
            .map_err(|e| RougechatError::Config(format!("Failed to parse config: {}", e)).into())
    }

    fn apply_env_vars(&mut self) {
        // Relay client overrides
        if let Ok(relay_url) = std::env::var("ROUGECHAT_RELAY_URL") {
            match Url::parse(&relay_url) {
                Ok(url) => self.relay.url = url,
                Err(_) => tracing::warn!("Invalid ROUGECHAT_RELAY_URL: {}", relay_url),
            }
        }

        if let Ok(timeout) = std::env::var("ROUGECHAT_RELAY_TIMEOUT") {
            if let Ok(value) = timeout.parse() {
                self.relay.timeout_seconds = value;
            } else {
                tracing::warn!("Invalid ROUGECHAT_RELAY_TIMEOUT: {}", timeout);
            }
        }

        // Server overrides. ROUGECHAT_LISTEN_ADDR wins over PORT when both are set.
        if let Ok(port) = std::env::var("PORT") {
            if let Ok(value) = port.parse::<u16>() {
                self.server.listen = format!("127.0.0.1:{}", value);
            } else {
                tracing::warn!("Invalid PORT: {}", port);
            }
        }

        if let Ok(listen) = std::env::var("ROUGECHAT_LISTEN_ADDR") {
            self.server.listen = listen;
        }

        if let Ok(model) = std::env::var("ROUGECHAT_MODEL") {
            self.server.upstream.model = model;
        }

        if let Ok(api_base) = std::env::var("OPENAI_BASE_URL") {
            self.server.upstream.api_base = api_base;
        }

        if let Ok(api_key) = std::env::var("OPENAI_API_KEY") {
            self.server.upstream.api_key = Some(api_key);
        }
    }

    fn apply_cli_overrides(&mut self, cli: &crate::cli::Cli) {
        if cli.verbose {
            tracing::debug!("Verbose mode enabled");
        }
    }

    /// Validate the configuration
    ///
    /// Ensures all configuration values are within acceptable ranges
    /// and that required fields are properly set.
    ///
    /// # Returns
    ///
    /// Returns Ok if configuration is valid
    ///
    /// # Errors
    ///
    /// Returns error if any validation check fails
    pub fn validate(&self) -> Result<()> {
        match self.relay.url.scheme() {
            "http" | "https" => {}
            other => {
                return Err(RougechatError::Config(format!(
                    "relay.url must use http or https, got: {}",
                    other
                ))
                .into());
            }
        }

        if self.relay.timeout_seconds == 0 {
            return Err(
                RougechatError::Config("relay.timeout_seconds must be greater than 0".to_string())
                    .into(),
            );
        }

        if self.server.listen.parse::<SocketAddr>().is_err() {
            return Err(RougechatError::Config(format!(
                "server.listen must be an ip:port address, got: {}",
                self.server.listen
            ))
            .into());
        }

        if self.server.upstream.api_base.is_empty() {
            return Err(
                RougechatError::Config("upstream.api_base cannot be empty".to_string()).into(),
            );
        }

        if self.server.upstream.model.is_empty() {
            return Err(
                RougechatError::Config("upstream.model cannot be empty".to_string()).into(),
            );
        }

        if self.server.upstream.max_tokens == 0 {
            return Err(RougechatError::Config(
                "upstream.max_tokens must be greater than 0".to_string(),
            )
            .into());
        }

        if !(0.0..=2.0).contains(&self.server.upstream.temperature) {
            return Err(RougechatError::Config(
                "upstream.temperature must be between 0.0 and 2.0".to_string(),
            )
            .into());
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::default_config()
    }
}
