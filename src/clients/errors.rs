//! Error types for the Graylog API client.
//!
//! This module contains the structured error produced for every failed call,
//! and the classifier that turns a raw `(status, body)` pair into it.
//!
//! # Error Handling
//!
//! Failures are grouped into a small taxonomy, exposed through
//! [`ApiError::class`]:
//!
//! - [`ErrorClass::NotFound`]: HTTP 404; never retried
//! - [`ErrorClass::Retryable`]: 429/500/502/503/504 returned without any
//!   retry having been made (`max_retries = 0`); the caller may try again
//! - [`ErrorClass::Validation`]: 4xx responses carrying a per-field error map
//! - [`ErrorClass::Fatal`]: any other terminal failure, including exhausted
//!   retries and exhausted payload negotiation
//! - [`ErrorClass::Network`]: transport failures with no HTTP status
//! - [`ErrorClass::Cancelled`]: the caller's cancellation token fired
//!
//! # Example
//!
//! ```rust,ignore
//! use graylog_api::clients::{ApiError, ErrorClass};
//!
//! match client.streams().get("5e4f...").await {
//!     Ok(stream) => println!("Found: {}", stream.title),
//!     Err(e) if e.is_not_found() => println!("gone"),
//!     Err(ApiError::Validation(e)) => {
//!         for (field, messages) in &e.errors {
//!             println!("{field}: {}", messages.join(", "));
//!         }
//!     }
//!     Err(e) => println!("{:?}: {e}", e.class()),
//! }
//! ```

use std::collections::BTreeMap;

use serde_json::Value;
use thiserror::Error;

use crate::clients::retry::is_retryable_status;

/// A structured error response from the Graylog API.
///
/// Built by [`ResponseError::classify`]. Graylog's error payloads differ
/// between server generations, so every field except `status` and
/// `raw_body` is best-effort.
///
/// # Example
///
/// ```rust
/// use graylog_api::clients::ResponseError;
///
/// let error = ResponseError::classify(
///     400,
///     br#"{"type":"ApiError","message":"bad request"}"#,
/// );
/// assert_eq!(error.status, 400);
/// assert_eq!(error.message, "bad request");
/// assert_eq!(error.kind.as_deref(), Some("ApiError"));
/// ```
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("Graylog API error (status {status}): {message}{}", render_field_errors(.errors))]
pub struct ResponseError {
    /// The HTTP status code of the response.
    pub status: u16,
    /// Human-readable message: `message`, else `error`, else the raw body.
    pub message: String,
    /// The error-kind tag from the `type` field, if any.
    pub kind: Option<String>,
    /// Per-field validation messages from the `errors` object.
    pub errors: BTreeMap<String, Vec<String>>,
    /// The raw response body.
    pub raw_body: String,
}

impl ResponseError {
    /// Parses a raw error response.
    ///
    /// A JSON object body contributes `message` (or `error`) as the message,
    /// `type` as the kind tag and `errors` as the field map, where each
    /// field may hold a single string or a list of strings. Any other body
    /// is used verbatim as the message.
    #[must_use]
    pub fn classify(status: u16, body: &[u8]) -> Self {
        let raw_body = String::from_utf8_lossy(body).into_owned();

        let Ok(Value::Object(object)) = serde_json::from_slice::<Value>(body) else {
            return Self {
                status,
                message: raw_body.clone(),
                kind: None,
                errors: BTreeMap::new(),
                raw_body,
            };
        };

        let message = object
            .get("message")
            .and_then(Value::as_str)
            .or_else(|| object.get("error").and_then(Value::as_str))
            .map_or_else(|| raw_body.clone(), str::to_string);

        let kind = object
            .get("type")
            .and_then(Value::as_str)
            .map(str::to_string);

        let errors = object
            .get("errors")
            .and_then(Value::as_object)
            .map(|fields| {
                fields
                    .iter()
                    .filter_map(|(field, value)| {
                        field_messages(value).map(|messages| (field.clone(), messages))
                    })
                    .collect()
            })
            .unwrap_or_default();

        Self {
            status,
            message,
            kind,
            errors,
            raw_body,
        }
    }

    /// Returns `true` for 4xx responses that carry per-field messages.
    #[must_use]
    pub fn is_validation(&self) -> bool {
        (400..500).contains(&self.status) && !self.errors.is_empty()
    }

    /// Returns `true` if the status is one of the transient statuses.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        is_retryable_status(self.status)
    }
}

fn field_messages(value: &Value) -> Option<Vec<String>> {
    match value {
        Value::String(message) => Some(vec![message.clone()]),
        Value::Array(items) => items
            .iter()
            .map(|item| item.as_str().map(str::to_string))
            .collect(),
        _ => None,
    }
}

fn render_field_errors(errors: &BTreeMap<String, Vec<String>>) -> String {
    errors
        .iter()
        .map(|(field, messages)| format!("; {field}: {}", messages.join(", ")))
        .collect()
}

/// Error returned when retries are exhausted on a transient status.
///
/// Carries the last response the server produced so an operator can judge
/// whether the failure is a platform hiccup or a persistent problem.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("Exceeded maximum retry count after {tries} tries. Last response: {last}")]
pub struct MaxRetriesExceededError {
    /// The number of tries that were made.
    pub tries: u32,
    /// The classified last response.
    pub last: ResponseError,
}

/// Error returned when every payload candidate was tried without producing
/// an identifier.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error(
    "{operation}: none of {attempts} payload candidates yielded an identifier \
     (last status {last_status}): {last_body}"
)]
pub struct NegotiationError {
    /// The logical operation, e.g. `"create stream"`.
    pub operation: String,
    /// The number of candidates that were tried.
    pub attempts: usize,
    /// Status of the last response received.
    pub last_status: u16,
    /// Raw body of the last response received.
    pub last_body: String,
}

/// Error returned when a request fails validation before it is sent.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InvalidHttpRequestError {
    /// The path is not an absolute path on the server.
    #[error("Invalid request path '{path}'. Paths must start with '/'.")]
    InvalidPath {
        /// The invalid path.
        path: String,
    },

    /// A payload is missing a key the server requires.
    #[error("Payload for {operation} is missing required key '{key}'.")]
    MissingRequiredKey {
        /// The logical operation.
        operation: &'static str,
        /// The missing key, dotted for nested objects.
        key: String,
    },

    /// Payload negotiation was started with no candidates.
    #[error("Payload negotiation for {operation} requires at least one candidate.")]
    NoCandidates {
        /// The logical operation.
        operation: String,
    },
}

/// A failure below HTTP: connection refused, DNS, TLS, timeout.
#[derive(Debug, Error)]
pub enum TransportError {
    /// An error from the reqwest transport.
    #[error(transparent)]
    Http(#[from] reqwest::Error),

    /// An error from a custom transport.
    #[error("{0}")]
    Other(String),
}

impl TransportError {
    /// Creates a transport error from a message.
    #[must_use]
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other(message.into())
    }

    /// Returns `true` if the failure was a timeout.
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        match self {
            Self::Http(e) => e.is_timeout(),
            Self::Other(_) => false,
        }
    }
}

/// Coarse classification of an [`ApiError`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorClass {
    /// The resource does not exist.
    NotFound,
    /// A transient status that may succeed on retry.
    Retryable,
    /// A terminal failure.
    Fatal,
    /// A 4xx response with per-field messages.
    Validation,
    /// A transport failure with no HTTP status.
    Network,
    /// The caller cancelled the operation.
    Cancelled,
}

/// Unified error type for all Graylog API operations.
///
/// [`ApiError::NotFound`] is the not-found sentinel; check it with
/// [`ApiError::is_not_found`] or by pattern matching.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The server answered 404.
    #[error("resource not found")]
    NotFound,

    /// A 4xx response carrying per-field validation messages.
    #[error(transparent)]
    Validation(ResponseError),

    /// Any other terminal error response.
    #[error(transparent)]
    Response(ResponseError),

    /// Retries were exhausted on a transient status.
    #[error(transparent)]
    MaxRetries(#[from] MaxRetriesExceededError),

    /// The transport failed on every attempt.
    #[error("request failed after {attempts} attempts: {source}")]
    Network {
        /// The number of attempts that were made.
        attempts: u32,
        /// The last transport failure.
        source: TransportError,
    },

    /// Payload negotiation ran out of candidates.
    #[error(transparent)]
    NegotiationExhausted(#[from] NegotiationError),

    /// The caller's cancellation token fired.
    #[error("request cancelled")]
    Cancelled,

    /// The request failed validation before it was sent.
    #[error(transparent)]
    InvalidRequest(#[from] InvalidHttpRequestError),

    /// The request body could not be serialized.
    #[error("failed to serialize request body: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A successful response could not be decoded.
    #[error("unexpected response for {context}: {body}")]
    UnexpectedResponse {
        /// What was being decoded.
        context: &'static str,
        /// The raw response body.
        body: String,
    },
}

impl ApiError {
    /// Wraps a classified response, picking validation or plain response.
    #[must_use]
    pub fn from_response(error: ResponseError) -> Self {
        if error.is_validation() {
            Self::Validation(error)
        } else {
            Self::Response(error)
        }
    }

    /// Returns `true` for the not-found sentinel.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound)
    }

    /// Returns the taxonomy class of this error.
    #[must_use]
    pub const fn class(&self) -> ErrorClass {
        match self {
            Self::NotFound => ErrorClass::NotFound,
            Self::Validation(_) => ErrorClass::Validation,
            Self::Network { .. } => ErrorClass::Network,
            Self::Cancelled => ErrorClass::Cancelled,
            Self::Response(e) if e.is_retryable() => ErrorClass::Retryable,
            Self::Response(_)
            | Self::MaxRetries(_)
            | Self::NegotiationExhausted(_)
            | Self::InvalidRequest(_)
            | Self::Serialization(_)
            | Self::UnexpectedResponse { .. } => ErrorClass::Fatal,
        }
    }

    /// Returns the HTTP status associated with this error, if any.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::NotFound => Some(404),
            Self::Validation(e) | Self::Response(e) => Some(e.status),
            Self::MaxRetries(e) => Some(e.last.status),
            Self::NegotiationExhausted(e) => Some(e.last_status),
            _ => None,
        }
    }

    /// Returns the classified response behind this error, if any.
    #[must_use]
    pub const fn response(&self) -> Option<&ResponseError> {
        match self {
            Self::Validation(e) | Self::Response(e) => Some(e),
            Self::MaxRetries(e) => Some(&e.last),
            _ => None,
        }
    }

    /// Returns the per-field validation messages, if any.
    #[must_use]
    pub fn field_errors(&self) -> Option<&BTreeMap<String, Vec<String>>> {
        self.response()
            .map(|e| &e.errors)
            .filter(|errors| !errors.is_empty())
    }
}
