//! HTTP request types for the Graylog API client.
//!
//! This module provides the [`HttpRequest`] type and its builder for
//! describing one logical call, and [`RequestAttempt`], the concrete request
//! handed to a [`Transport`](crate::clients::Transport) for a single try.

use std::collections::BTreeMap;
use std::fmt;

use crate::clients::errors::InvalidHttpRequestError;

/// HTTP methods used by the Graylog REST API.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    /// HTTP GET method for retrieving resources.
    Get,
    /// HTTP POST method for creating resources and triggering actions.
    Post,
    /// HTTP PUT method for updating resources.
    Put,
    /// HTTP DELETE method for removing resources.
    Delete,
}

impl HttpMethod {
    /// Returns the upper-case method name used on the wire.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One logical request to the Graylog API.
///
/// The body is kept as a JSON value and serialized exactly once per logical
/// call by the [`HttpClient`](crate::clients::HttpClient), so every retry
/// sends byte-identical payloads.
///
/// # Example
///
/// ```rust
/// use graylog_api::clients::{HttpMethod, HttpRequest};
/// use serde_json::json;
///
/// let request = HttpRequest::builder(HttpMethod::Post, "/api/streams")
///     .body(json!({"title": "errors"}))
///     .build()
///     .unwrap();
///
/// assert_eq!(request.path, "/api/streams");
/// assert!(request.body.is_some());
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct HttpRequest {
    /// The HTTP method for this request.
    pub http_method: HttpMethod,
    /// The absolute path (relative to the base URL), starting with `/`.
    pub path: String,
    /// The request body, if any.
    pub body: Option<serde_json::Value>,
    /// Additional headers to include in the request.
    pub extra_headers: Option<BTreeMap<String, String>>,
}

impl HttpRequest {
    /// Creates a new builder for constructing an `HttpRequest`.
    #[must_use]
    pub fn builder(method: HttpMethod, path: impl Into<String>) -> HttpRequestBuilder {
        HttpRequestBuilder::new(method, path)
    }

    /// Shorthand for a request without a body.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidHttpRequestError`] if the path is invalid.
    pub fn without_body(
        method: HttpMethod,
        path: impl Into<String>,
    ) -> Result<Self, InvalidHttpRequestError> {
        Self::builder(method, path).build()
    }

    /// Shorthand for a request carrying a JSON body.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidHttpRequestError`] if the path is invalid.
    pub fn with_body(
        method: HttpMethod,
        path: impl Into<String>,
        body: serde_json::Value,
    ) -> Result<Self, InvalidHttpRequestError> {
        Self::builder(method, path).body(body).build()
    }

    /// Validates the request.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidHttpRequestError::InvalidPath`] if the path is empty,
    /// does not start with `/`, or contains a scheme.
    pub fn verify(&self) -> Result<(), InvalidHttpRequestError> {
        if self.path.is_empty() || !self.path.starts_with('/') || self.path.contains("://") {
            return Err(InvalidHttpRequestError::InvalidPath {
                path: self.path.clone(),
            });
        }
        Ok(())
    }
}

/// Checks that `body` carries every key in `keys` before it is sent.
///
/// Keys may be dotted to reach into nested objects (`"config.type"`). A key
/// holding `null` or an empty string counts as missing.
///
/// # Errors
///
/// Returns [`InvalidHttpRequestError::MissingRequiredKey`] naming the first
/// missing key.
///
/// # Example
///
/// ```rust
/// use graylog_api::clients::require_keys;
/// use serde_json::json;
///
/// let body = json!({"title": "mail", "config": {"type": "email-notification-v1"}});
/// assert!(require_keys("create event notification", &body, &["title", "config.type"]).is_ok());
/// assert!(require_keys("create event notification", &json!({"config": {}}), &["config.type"]).is_err());
/// ```
pub fn require_keys(
    operation: &'static str,
    body: &serde_json::Value,
    keys: &[&str],
) -> Result<(), InvalidHttpRequestError> {
    for key in keys {
        let value = key
            .split('.')
            .try_fold(body, |current, segment| current.get(segment));
        let present = match value {
            None | Some(serde_json::Value::Null) => false,
            Some(serde_json::Value::String(s)) => !s.trim().is_empty(),
            Some(_) => true,
        };
        if !present {
            return Err(InvalidHttpRequestError::MissingRequiredKey {
                operation,
                key: (*key).to_string(),
            });
        }
    }
    Ok(())
}

/// Builder for constructing [`HttpRequest`] instances.
#[derive(Debug)]
pub struct HttpRequestBuilder {
    http_method: HttpMethod,
    path: String,
    body: Option<serde_json::Value>,
    extra_headers: Option<BTreeMap<String, String>>,
}

impl HttpRequestBuilder {
    fn new(method: HttpMethod, path: impl Into<String>) -> Self {
        Self {
            http_method: method,
            path: path.into(),
            body: None,
            extra_headers: None,
        }
    }

    /// Sets the JSON request body.
    #[must_use]
    pub fn body(mut self, body: impl Into<serde_json::Value>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Adds a single extra header.
    #[must_use]
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra_headers
            .get_or_insert_with(BTreeMap::new)
            .insert(key.into(), value.into());
        self
    }

    /// Builds the [`HttpRequest`], validating it in the process.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidHttpRequestError`] if the request fails validation.
    pub fn build(self) -> Result<HttpRequest, InvalidHttpRequestError> {
        let request = HttpRequest {
            http_method: self.http_method,
            path: self.path,
            body: self.body,
            extra_headers: self.extra_headers,
        };
        request.verify()?;
        Ok(request)
    }
}

/// A single concrete try of a logical request.
///
/// Attempts are ephemeral: a fresh one is built for every try, carrying the
/// same pre-serialized body bytes, and dropped once the transport answers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RequestAttempt {
    /// The HTTP method.
    pub method: HttpMethod,
    /// The fully-qualified URL.
    pub url: String,
    /// Headers to send, in a stable order.
    pub headers: Vec<(String, String)>,
    /// The serialized body, identical across attempts of one logical call.
    pub body: Option<Vec<u8>>,
    /// Zero-based attempt index.
    pub attempt: u32,
}

impl RequestAttempt {
    /// Returns the value of a header (case-insensitive), if present.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}
