// src/error.rs

//! Unified error handling for the internship watcher.

use std::fmt;

use thiserror::Error;

/// Result type alias for pipeline operations.
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

    /// Page navigation failed
    #[error("Navigation to {url} failed: {message}")]
    Navigation { url: String, message: String },

    /// An operation exceeded its time budget
    #[error("Timed out after {millis}ms: {operation}")]
    Timeout { operation: String, millis: u128 },

    /// A card could not be turned into a posting
    #[error("Extraction error on {site}: {message}")]
    Extraction { site: String, message: String },

    /// Document store rejected a read or commit
    #[error("Store error: {0}")]
    Store(String),

    /// Push notification delivery failed
    #[error("Push error: {0}")]
    Push(String),

    /// The run was cancelled by a shutdown signal
    #[error("Interrupted before the run completed")]
    Interrupted,
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

    /// Create a navigation error for a URL.
    pub fn navigation(url: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Navigation {
            url: url.into(),
            message: message.to_string(),
        }
    }

    /// Create a timeout error.
    pub fn timeout(operation: impl Into<String>, elapsed: std::time::Duration) -> Self {
        Self::Timeout {
            operation: operation.into(),
            millis: elapsed.as_millis(),
        }
    }

    /// Create a card extraction error for a site.
    pub fn extraction(site: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Extraction {
            site: site.into(),
            message: message.to_string(),
        }
    }

    /// Create a document store error.
    pub fn store(message: impl fmt::Display) -> Self {
        Self::Store(message.to_string())
    }

    /// Create a push delivery error.
    pub fn push(message: impl fmt::Display) -> Self {
        Self::Push(message.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_navigation_message() {
        let err = AppError::navigation("https://jobs.example.com", "503 Service Unavailable");
        assert_eq!(
            err.to_string(),
            "Navigation to https://jobs.example.com failed: 503 Service Unavailable"
        );
    }

    #[test]
    fn test_timeout_message() {
        let err = AppError::timeout("navigate", std::time::Duration::from_millis(1500));
        assert_eq!(err.to_string(), "Timed out after 1500ms: navigate");
    }

    #[test]
    fn test_interrupted_is_not_a_config_error() {
        let err = AppError::Interrupted;
        assert_eq!(err.to_string(), "Interrupted before the run completed");
        assert!(!matches!(err, AppError::Config(_)));
    }
}
