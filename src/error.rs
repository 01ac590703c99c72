//! Error types for client configuration.
//!
//! This module contains the error type returned while building a
//! [`ClientConfig`](crate::ClientConfig) and its validated newtypes.
//!
//! # Error Handling
//!
//! All configuration constructors return `Result<T, ConfigError>` to enable
//! fail-fast validation. Errors raised while talking to a server live in
//! [`clients::ApiError`](crate::clients::ApiError).
//!
//! # Example
//!
//! ```rust
//! use graylog_api::{ApiToken, ConfigError};
//!
//! let result = ApiToken::new("");
//! assert!(matches!(result, Err(ConfigError::EmptyToken)));
//! ```

use thiserror::Error;

/// Errors that can occur while configuring a client.
///
/// Each variant provides a clear, actionable error message.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The base URL was empty.
    #[error("Base URL cannot be empty. Please provide the Graylog server URL (e.g., 'https://graylog.example.com').")]
    EmptyBaseUrl,

    /// The base URL is not an absolute http(s) URL.
    #[error("Invalid base URL '{url}'. Expected an absolute URL with an http or https scheme.")]
    InvalidBaseUrl {
        /// The invalid URL that was provided.
        url: String,
    },

    /// The API token was empty.
    #[error("API token cannot be empty. Please provide a Basic auth token or username/password credentials.")]
    EmptyToken,

    /// The API generation string could not be parsed.
    #[error("Invalid API generation '{value}'. Expected one of: 5, 6, 7.")]
    InvalidApiGeneration {
        /// The value that was provided.
        value: String,
    },

    /// The retry settings are inconsistent.
    #[error("Invalid retry settings: {reason}")]
    InvalidRetrySettings {
        /// Why the settings were rejected.
        reason: String,
    },

    /// A required field is missing.
    #[error("Missing required field: '{field}'. This field must be set before building the configuration.")]
    MissingRequiredField {
        /// The name of the missing field.
        field: &'static str,
    },
}
