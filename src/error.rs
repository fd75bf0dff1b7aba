// src/error.rs

//! Unified error handling for the schedule scraper.

use std::fmt;

use thiserror::Error;

/// Result type alias for scraper operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Unified application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Cache command failed after the connection was established
    #[error("Cache error: {0}")]
    Cache(#[from] redis::RedisError),

    /// Cache could not be reached at startup
    #[error("Cache unavailable at {address}: {message}")]
    CacheUnavailable { address: String, message: String },

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing failed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// URL parsing failed
    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    /// CSS selector parsing failed
    #[error("Invalid selector '{selector}': {message}")]
    Selector { selector: String, message: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Data validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Page structure did not match the expected schedule layout
    #[error("Malformed input in {context}: {message}")]
    MalformedInput { context: String, message: String },
}

impl AppError {
    /// Create a selector parsing error.
    pub fn selector(selector: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Selector {
            selector: selector.into(),
            message: message.to_string(),
        }
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create a malformed-input error with context.
    pub fn malformed(context: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::MalformedInput {
            context: context.into(),
            message: message.to_string(),
        }
    }

    /// Create a cache-unavailable error.
    pub fn cache_unavailable(address: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::CacheUnavailable {
            address: address.into(),
            message: message.to_string(),
        }
    }

    /// Whether a retry has a chance of succeeding.
    ///
    /// Network failures talking to the directory, the cache or the schedule
    /// site are transient. Malformed pages are not: fetching the same page
    /// again yields the same structure.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Http(_) => true,
            Self::Cache(e) => e.is_io_error() || e.is_timeout() || e.is_connection_dropped(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_malformed_is_not_transient() {
        let err = AppError::malformed("tables", "expected 4 tables, found 2");
        assert!(!err.is_transient());
        assert_eq!(
            err.to_string(),
            "Malformed input in tables: expected 4 tables, found 2"
        );
    }

    #[test]
    fn test_config_is_not_transient() {
        assert!(!AppError::config("bad").is_transient());
    }
}
