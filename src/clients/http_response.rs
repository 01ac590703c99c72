//! HTTP response types for the Graylog API client.
//!
//! This module provides the [`HttpResponse`] type returned by a
//! [`Transport`](crate::clients::Transport) and by the
//! [`HttpClient`](crate::clients::HttpClient).

use std::collections::HashMap;

use serde::de::DeserializeOwned;

use crate::clients::errors::ApiError;

/// Response header carrying the Graylog server version.
pub const VERSION_HEADER: &str = "x-graylog-version";

/// A raw response from the Graylog API.
///
/// Header names are stored lower-cased. The body is kept as raw bytes so
/// that callers can decode it into whichever shape the server generation
/// produces.
///
/// # Example
///
/// ```rust
/// use graylog_api::clients::HttpResponse;
/// use std::collections::HashMap;
///
/// let mut headers = HashMap::new();
/// headers.insert("x-graylog-version".to_string(), vec!["6.1.4".to_string()]);
///
/// let response = HttpResponse::new(200, headers, br#"{"id":"abc"}"#.to_vec());
/// assert!(response.is_ok());
/// assert_eq!(response.version(), Some("6.1.4"));
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HttpResponse {
    /// The HTTP status code.
    pub status: u16,
    /// Response headers, keyed by lower-cased name.
    pub headers: HashMap<String, Vec<String>>,
    /// The raw response body.
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// Creates a new response.
    ///
    /// Header names are lower-cased on construction.
    #[must_use]
    pub fn new(status: u16, headers: HashMap<String, Vec<String>>, body: Vec<u8>) -> Self {
        let headers = headers
            .into_iter()
            .map(|(key, value)| (key.to_ascii_lowercase(), value))
            .collect();
        Self {
            status,
            headers,
            body,
        }
    }

    /// Returns `true` for statuses below 400.
    #[must_use]
    pub const fn is_ok(&self) -> bool {
        self.status < 400
    }

    /// Returns the first value of a header (case-insensitive).
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    /// Returns the non-empty server version header, if present.
    #[must_use]
    pub fn version(&self) -> Option<&str> {
        self.header(VERSION_HEADER).filter(|value| !value.trim().is_empty())
    }

    /// Returns the body as text, replacing invalid UTF-8.
    #[must_use]
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Returns `true` if the body is empty or whitespace.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.body.iter().all(u8::is_ascii_whitespace)
    }

    /// Decodes the body into `T`.
    ///
    /// # Errors
    ///
    /// Returns the `serde_json` error if the body does not match `T`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }

    /// Decodes the body into `T`, reporting failures as
    /// [`ApiError::UnexpectedResponse`].
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::UnexpectedResponse`] naming `context` if the body
    /// does not match `T`.
    pub fn decode<T: DeserializeOwned>(&self, context: &'static str) -> Result<T, ApiError> {
        self.json().map_err(|e| {
            tracing::debug!("Failed to decode {context}: {e}");
            ApiError::UnexpectedResponse {
                context,
                body: self.text(),
            }
        })
    }

    /// Decodes the body as a JSON value, or `None` if it is not JSON.
    #[must_use]
    pub fn json_value(&self) -> Option<serde_json::Value> {
        serde_json::from_slice(&self.body).ok()
    }
}
