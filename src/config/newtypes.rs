//! Validated newtype wrappers for configuration values.
//!
//! This module provides type-safe wrappers around string values that validate
//! their contents on construction. Invalid values are rejected with clear error messages.

use crate::error::ConfigError;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use std::fmt;

/// A validated, normalised Graylog server URL.
///
/// Graylog users configure the server either as `https://host:9000` or as
/// `https://host:9000/api`. The client stores the URL without the trailing
/// slash and without the `/api` suffix; version-appropriate prefixes are
/// added per request path.
///
/// # Example
///
/// ```rust
/// use graylog_api::BaseUrl;
///
/// let url = BaseUrl::new("https://graylog.example.com/api/").unwrap();
/// assert_eq!(url.as_ref(), "https://graylog.example.com");
/// assert!(url.had_api_suffix());
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BaseUrl {
    normalized: String,
    had_api_suffix: bool,
}

impl BaseUrl {
    /// Creates a new validated base URL.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::EmptyBaseUrl`] for an empty string and
    /// [`ConfigError::InvalidBaseUrl`] when the scheme is not `http` or
    /// `https` or the host is missing.
    pub fn new(url: impl Into<String>) -> Result<Self, ConfigError> {
        let url = url.into();
        let trimmed = url.trim();
        if trimmed.is_empty() {
            return Err(ConfigError::EmptyBaseUrl);
        }

        let rest = trimmed
            .strip_prefix("https://")
            .or_else(|| trimmed.strip_prefix("http://"));
        match rest {
            Some(host) if !host.is_empty() && !host.starts_with('/') => {}
            _ => return Err(ConfigError::InvalidBaseUrl { url }),
        }

        let without_slash = trimmed.trim_end_matches('/');
        let (normalized, had_api_suffix) = without_slash
            .strip_suffix("/api")
            .map_or((without_slash, false), |stripped| (stripped, true));

        Ok(Self {
            normalized: normalized.trim_end_matches('/').to_string(),
            had_api_suffix,
        })
    }

    /// Returns `true` if the configured URL ended in `/api`.
    #[must_use]
    pub const fn had_api_suffix(&self) -> bool {
        self.had_api_suffix
    }

    /// Returns the base URL variants worth probing, normalised form first.
    ///
    /// When the user configured an `/api` suffix, the suffixed form is kept
    /// as a second variant.
    #[must_use]
    pub fn variants(&self) -> Vec<String> {
        let mut variants = vec![self.normalized.clone()];
        if self.had_api_suffix {
            variants.push(format!("{}/api", self.normalized));
        }
        variants
    }

    /// Joins a request path (starting with `/`) onto the base URL.
    #[must_use]
    pub fn join(&self, path: &str) -> String {
        format!("{}{}", self.normalized, path)
    }
}

impl AsRef<str> for BaseUrl {
    fn as_ref(&self) -> &str {
        &self.normalized
    }
}

impl fmt::Display for BaseUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.normalized)
    }
}

/// A validated Graylog API token used for HTTP Basic authentication.
///
/// The token is the base64 payload of the `Authorization: Basic` header.
/// Graylog access tokens are typically encoded as `<token>:token`; plain
/// username/password pairs work as well.
///
/// # Security
///
/// The `Debug` implementation masks the value, displaying only
/// `ApiToken(*****)`.
///
/// # Example
///
/// ```rust
/// use graylog_api::ApiToken;
///
/// let token = ApiToken::from_credentials("admin", "secret").unwrap();
/// assert_eq!(token.as_ref(), "YWRtaW46c2VjcmV0");
/// assert_eq!(token.authorization_header(), "Basic YWRtaW46c2VjcmV0");
/// assert_eq!(format!("{:?}", token), "ApiToken(*****)");
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct ApiToken(String);

impl ApiToken {
    /// Creates a token from an already-encoded Basic auth payload.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::EmptyToken`] if the token is empty.
    pub fn new(token: impl Into<String>) -> Result<Self, ConfigError> {
        let token = token.into();
        if token.trim().is_empty() {
            return Err(ConfigError::EmptyToken);
        }
        Ok(Self(token))
    }

    /// Encodes `username:password` into a Basic auth token.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::EmptyToken`] if the username is empty.
    pub fn from_credentials(username: &str, password: &str) -> Result<Self, ConfigError> {
        if username.is_empty() {
            return Err(ConfigError::EmptyToken);
        }
        Ok(Self(STANDARD.encode(format!("{username}:{password}"))))
    }

    /// Encodes a Graylog access token using the `<token>:token` convention.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::EmptyToken`] if the access token is empty.
    pub fn from_access_token(access_token: &str) -> Result<Self, ConfigError> {
        Self::from_credentials(access_token, "token")
    }

    /// Returns the value of the `Authorization` header for this token.
    #[must_use]
    pub fn authorization_header(&self) -> String {
        format!("Basic {}", self.0)
    }
}

impl AsRef<str> for ApiToken {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiToken(*****)")
    }
}
