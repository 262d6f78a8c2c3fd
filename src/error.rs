//! Error types for rougechat
//!
//! This module defines all error types used throughout the application,
//! using `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Main error type for rougechat operations
///
/// This enum encompasses all possible errors that can occur during
/// configuration loading, relay exchanges, conversation storage, and
/// session command handling.
#[derive(Error, Debug)]
pub enum RougechatError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Relay exchange errors (connection, timeout, non-success status)
    ///
    /// Deliberately coarse: the chat surface shows a single fallback
    /// message regardless of the underlying cause, which is only logged.
    #[error("Relay error: {0}")]
    Relay(String),

    /// Conversation storage errors (backend reads and writes)
    #[error("Storage error: {0}")]
    Storage(String),

    /// Session command errors (busy state, invalid edit target)
    #[error("Session error: {0}")]
    Session(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// HTTP request errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Result type alias for rougechat operations
///
/// This is a convenience alias that uses `anyhow::Error` as the error type,
/// allowing for rich error context and easy error propagation.
pub type Result<T> = anyhow::Result<T>;
