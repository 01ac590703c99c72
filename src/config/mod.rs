//! Configuration types for the Graylog API client.
//!
//! This module provides the configuration used to construct a
//! [`GraylogClient`](crate::GraylogClient).
//!
//! # Overview
//!
//! The main types in this module are:
//!
//! - [`ClientConfig`]: The immutable client configuration
//! - [`ClientConfigBuilder`]: A builder for constructing [`ClientConfig`] instances
//! - [`BaseUrl`]: A validated, normalised server URL
//! - [`ApiToken`]: A validated Basic auth token with masked debug output
//! - [`ApiGeneration`]: The Graylog server generation (v5, v6 or v7)
//!
//! # Example
//!
//! ```rust
//! use graylog_api::{ApiToken, BaseUrl, ClientConfig};
//! use std::time::Duration;
//!
//! let config = ClientConfig::builder()
//!     .base_url(BaseUrl::new("https://graylog.example.com/api").unwrap())
//!     .token(ApiToken::from_credentials("admin", "admin").unwrap())
//!     .max_retries(5)
//!     .retry_wait(Duration::from_millis(500))
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(config.base_url().as_ref(), "https://graylog.example.com");
//! ```

mod newtypes;
mod version;

pub use newtypes::{ApiToken, BaseUrl};
pub use version::ApiGeneration;

use std::time::Duration;

use crate::error::ConfigError;

/// Default number of retries after the first attempt.
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Default base wait between retries; doubled after every failed attempt.
pub const DEFAULT_RETRY_WAIT: Duration = Duration::from_secs(1);

/// Default per-request timeout applied by the built-in transport.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Environment variable that enables request body echoing in
/// [`ClientConfigBuilder::debug_http_from_env`].
pub const DEBUG_HTTP_ENV: &str = "DEBUG_HTTP";

/// Configuration for a Graylog API client.
///
/// A `ClientConfig` is immutable once built. The server generation is not
/// part of the configuration unless forced with
/// [`ClientConfigBuilder::api_generation`]; otherwise it is resolved once by
/// the client during construction.
///
/// # Thread Safety
///
/// `ClientConfig` is `Clone`, `Send`, and `Sync`.
#[derive(Clone, Debug)]
pub struct ClientConfig {
    base_url: BaseUrl,
    token: ApiToken,
    max_retries: u32,
    retry_wait: Duration,
    max_retry_wait: Option<Duration>,
    timeout: Duration,
    user_agent_prefix: Option<String>,
    debug_http: bool,
    api_generation: Option<ApiGeneration>,
}

impl ClientConfig {
    /// Creates a new builder for constructing a `ClientConfig`.
    #[must_use]
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::new()
    }

    /// Returns the normalised base URL.
    #[must_use]
    pub const fn base_url(&self) -> &BaseUrl {
        &self.base_url
    }

    /// Returns the API token.
    #[must_use]
    pub const fn token(&self) -> &ApiToken {
        &self.token
    }

    /// Returns the number of retries after the first attempt.
    #[must_use]
    pub const fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// Returns the base retry wait.
    #[must_use]
    pub const fn retry_wait(&self) -> Duration {
        self.retry_wait
    }

    /// Returns the optional upper bound for a single backoff sleep.
    #[must_use]
    pub const fn max_retry_wait(&self) -> Option<Duration> {
        self.max_retry_wait
    }

    /// Returns the per-request timeout used by the built-in transport.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Returns the user agent prefix, if configured.
    #[must_use]
    pub fn user_agent_prefix(&self) -> Option<&str> {
        self.user_agent_prefix.as_deref()
    }

    /// Returns whether outgoing request bodies are echoed to the log.
    #[must_use]
    pub const fn debug_http(&self) -> bool {
        self.debug_http
    }

    /// Returns the forced API generation, if any.
    ///
    /// When set, the client skips version probing.
    #[must_use]
    pub const fn api_generation(&self) -> Option<ApiGeneration> {
        self.api_generation
    }
}

// Verify ClientConfig is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<ClientConfig>();
};

/// Builder for constructing [`ClientConfig`] instances.
///
/// Required fields are `base_url` and `token`.
///
/// # Defaults
///
/// - `max_retries`: 3
/// - `retry_wait`: 1 second
/// - `max_retry_wait`: `None` (no cap)
/// - `timeout`: 30 seconds
/// - `debug_http`: `false`
/// - `api_generation`: `None` (detected at connect time)
#[derive(Debug, Default)]
pub struct ClientConfigBuilder {
    base_url: Option<BaseUrl>,
    token: Option<ApiToken>,
    max_retries: Option<u32>,
    retry_wait: Option<Duration>,
    max_retry_wait: Option<Duration>,
    timeout: Option<Duration>,
    user_agent_prefix: Option<String>,
    debug_http: bool,
    api_generation: Option<ApiGeneration>,
}

impl ClientConfigBuilder {
    /// Creates a new builder with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the server URL (required).
    #[must_use]
    pub fn base_url(mut self, url: BaseUrl) -> Self {
        self.base_url = Some(url);
        self
    }

    /// Sets the API token (required).
    #[must_use]
    pub fn token(mut self, token: ApiToken) -> Self {
        self.token = Some(token);
        self
    }

    /// Sets the number of retries after the first attempt.
    #[must_use]
    pub const fn max_retries(mut self, retries: u32) -> Self {
        self.max_retries = Some(retries);
        self
    }

    /// Sets the base wait between retries.
    #[must_use]
    pub const fn retry_wait(mut self, wait: Duration) -> Self {
        self.retry_wait = Some(wait);
        self
    }

    /// Caps a single backoff sleep. The doubling law still applies below the cap.
    #[must_use]
    pub const fn max_retry_wait(mut self, wait: Duration) -> Self {
        self.max_retry_wait = Some(wait);
        self
    }

    /// Sets the per-request timeout for the built-in transport.
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Sets the user agent prefix for HTTP requests.
    #[must_use]
    pub fn user_agent_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.user_agent_prefix = Some(prefix.into());
        self
    }

    /// Enables echoing of outgoing request bodies at debug level.
    #[must_use]
    pub const fn debug_http(mut self, enabled: bool) -> Self {
        self.debug_http = enabled;
        self
    }

    /// Enables body echoing when `DEBUG_HTTP=1` is set in the environment.
    ///
    /// The variable is read once, here; the resulting flag is part of the
    /// immutable configuration.
    #[must_use]
    pub fn debug_http_from_env(self) -> Self {
        let enabled = std::env::var(DEBUG_HTTP_ENV).is_ok_and(|value| value == "1");
        self.debug_http(enabled)
    }

    /// Forces a server generation and disables version probing.
    #[must_use]
    pub const fn api_generation(mut self, generation: ApiGeneration) -> Self {
        self.api_generation = Some(generation);
        self
    }

    /// Builds the [`ClientConfig`], validating that required fields are set.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingRequiredField`] if `base_url` or `token`
    /// are not set, and [`ConfigError::InvalidRetrySettings`] if the backoff
    /// cap is smaller than the base wait.
    pub fn build(self) -> Result<ClientConfig, ConfigError> {
        let base_url = self
            .base_url
            .ok_or(ConfigError::MissingRequiredField { field: "base_url" })?;
        let token = self
            .token
            .ok_or(ConfigError::MissingRequiredField { field: "token" })?;

        let retry_wait = self.retry_wait.unwrap_or(DEFAULT_RETRY_WAIT);
        if let Some(cap) = self.max_retry_wait {
            if cap < retry_wait {
                return Err(ConfigError::InvalidRetrySettings {
                    reason: format!(
                        "max_retry_wait ({cap:?}) is smaller than retry_wait ({retry_wait:?})"
                    ),
                });
            }
        }

        Ok(ClientConfig {
            base_url,
            token,
            max_retries: self.max_retries.unwrap_or(DEFAULT_MAX_RETRIES),
            retry_wait,
            max_retry_wait: self.max_retry_wait,
            timeout: self.timeout.unwrap_or(DEFAULT_TIMEOUT),
            user_agent_prefix: self.user_agent_prefix,
            debug_http: self.debug_http,
            api_generation: self.api_generation,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url() -> BaseUrl {
        BaseUrl::new("http://127.0.0.1:9000").unwrap()
    }

    fn token() -> ApiToken {
        ApiToken::new("dG9rZW46dG9rZW4=").unwrap()
    }

    #[test]
    fn test_builder_requires_base_url() {
        let result = ClientConfigBuilder::new().token(token()).build();
        assert!(matches!(
            result,
            Err(ConfigError::MissingRequiredField { field: "base_url" })
        ));
    }

    #[test]
    fn test_builder_requires_token() {
        let result = ClientConfigBuilder::new().base_url(url()).build();
        assert!(matches!(
            result,
            Err(ConfigError::MissingRequiredField { field: "token" })
        ));
    }

    #[test]
    fn test_builder_provides_sensible_defaults() {
        let config = ClientConfig::builder()
            .base_url(url())
            .token(token())
            .build()
            .unwrap();

        assert_eq!(config.max_retries(), 3);
        assert_eq!(config.retry_wait(), Duration::from_secs(1));
        assert_eq!(config.max_retry_wait(), None);
        assert_eq!(config.timeout(), Duration::from_secs(30));
        assert!(!config.debug_http());
        assert!(config.api_generation().is_none());
        assert!(config.user_agent_prefix().is_none());
    }

    #[test]
    fn test_builder_with_all_optional_fields() {
        let config = ClientConfig::builder()
            .base_url(url())
            .token(token())
            .max_retries(0)
            .retry_wait(Duration::from_millis(10))
            .max_retry_wait(Duration::from_millis(40))
            .timeout(Duration::from_secs(5))
            .user_agent_prefix("terraform-provider-graylog")
            .debug_http(true)
            .api_generation(ApiGeneration::Gen7)
            .build()
            .unwrap();

        assert_eq!(config.max_retries(), 0);
        assert_eq!(config.retry_wait(), Duration::from_millis(10));
        assert_eq!(config.max_retry_wait(), Some(Duration::from_millis(40)));
        assert_eq!(config.timeout(), Duration::from_secs(5));
        assert_eq!(config.user_agent_prefix(), Some("terraform-provider-graylog"));
        assert!(config.debug_http());
        assert_eq!(config.api_generation(), Some(ApiGeneration::Gen7));
    }

    #[test]
    fn test_builder_rejects_cap_below_base_wait() {
        let result = ClientConfig::builder()
            .base_url(url())
            .token(token())
            .retry_wait(Duration::from_secs(2))
            .max_retry_wait(Duration::from_secs(1))
            .build();
        assert!(matches!(
            result,
            Err(ConfigError::InvalidRetrySettings { .. })
        ));
    }

    #[test]
    fn test_config_debug_masks_token() {
        let config = ClientConfig::builder()
            .base_url(url())
            .token(token())
            .build()
            .unwrap();
        let debug = format!("{config:?}");
        assert!(debug.contains("ClientConfig"));
        assert!(!debug.contains("dG9rZW46dG9rZW4="));
    }

    #[test]
    fn test_config_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ClientConfig>();
    }
}
