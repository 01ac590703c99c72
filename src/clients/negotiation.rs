//! Payload negotiation across server generations.
//!
//! Some create operations accept different request bodies on different
//! Graylog releases (a modern `{"entity": {...}}` envelope versus a legacy
//! flat body), and answer with the new identifier in different places. The
//! [`PayloadNegotiator`] tries an ordered list of [`CandidateRequest`]s until
//! one yields an identifier.
//!
//! # Overview
//!
//! - [`CreateStrategy`]: Chooses the candidate order once per client
//! - [`IdExtractor`]: Describes where a response may carry the identifier
//! - [`CandidateRequest`]: One request shape plus its extractor
//! - [`ListFallback`]: Recovers the identifier by listing and matching
//! - [`PayloadNegotiator`]: Drives the candidates through the executor
//!
//! # Example
//!
//! ```rust,ignore
//! use graylog_api::clients::{CandidateRequest, IdExtractor};
//! use serde_json::json;
//!
//! let extractor = IdExtractor::new().flat("stream_id").wrapped("stream");
//! let candidates = client.create_strategy().order(
//!     CandidateRequest::post("entity envelope", "/api/streams", json!({"entity": entity.clone()}), extractor.clone())?,
//!     CandidateRequest::post("flat body", "/api/streams", entity, extractor)?,
//! );
//!
//! let id = client
//!     .negotiator()
//!     .create_with_negotiation("create stream", candidates, None)
//!     .await?;
//! ```

use serde_json::{Map, Value};
use tokio_util::sync::CancellationToken;

use crate::clients::errors::{ApiError, InvalidHttpRequestError, NegotiationError};
use crate::clients::http_client::HttpClient;
use crate::clients::http_request::{HttpMethod, HttpRequest};
use crate::clients::http_response::HttpResponse;
use crate::config::ApiGeneration;

/// Order in which modern and legacy request shapes are tried.
///
/// Selected once from the resolved [`ApiGeneration`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CreateStrategy {
    /// Entity envelope first, legacy flat body second (Graylog 7).
    ModernFirst,
    /// Legacy flat body first, entity envelope second (Graylog 5 and 6).
    LegacyFirst,
}

impl CreateStrategy {
    /// Returns the strategy for a server generation.
    #[must_use]
    pub const fn for_generation(generation: ApiGeneration) -> Self {
        if generation.is_legacy() {
            Self::LegacyFirst
        } else {
            Self::ModernFirst
        }
    }

    /// Orders a modern and a legacy variant according to the strategy.
    #[must_use]
    pub fn order<T>(self, modern: T, legacy: T) -> Vec<T> {
        match self {
            Self::ModernFirst => vec![modern, legacy],
            Self::LegacyFirst => vec![legacy, modern],
        }
    }
}

/// Describes where a create response may carry the new identifier.
///
/// Shapes are tried in a fixed priority: each flat key in order, then each
/// single-level wrapper (`{"<key>": {"id": ...}}`) in order, then a
/// top-level `id`. Only non-empty strings count.
///
/// # Example
///
/// ```rust
/// use graylog_api::clients::IdExtractor;
///
/// let extractor = IdExtractor::new().flat("stream_id").wrapped("stream");
/// assert_eq!(extractor.extract(br#"{"stream_id":"a1"}"#), Some("a1".to_string()));
/// assert_eq!(extractor.extract(br#"{"stream":{"id":"b2"}}"#), Some("b2".to_string()));
/// assert_eq!(extractor.extract(br#"{"id":"c3"}"#), Some("c3".to_string()));
/// assert_eq!(extractor.extract(b""), None);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct IdExtractor {
    flat_keys: Vec<&'static str>,
    wrapper_keys: Vec<&'static str>,
}

impl IdExtractor {
    /// Creates an extractor that only looks at a top-level `id`.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            flat_keys: Vec::new(),
            wrapper_keys: Vec::new(),
        }
    }

    /// Adds a top-level key holding the identifier.
    #[must_use]
    pub fn flat(mut self, key: &'static str) -> Self {
        self.flat_keys.push(key);
        self
    }

    /// Adds a wrapper key whose object holds the identifier under `id`.
    #[must_use]
    pub fn wrapped(mut self, key: &'static str) -> Self {
        self.wrapper_keys.push(key);
        self
    }

    /// Extracts the identifier from a response body.
    #[must_use]
    pub fn extract(&self, body: &[u8]) -> Option<String> {
        let value: Value = serde_json::from_slice(body).ok()?;
        self.extract_value(&value)
    }

    /// Extracts the identifier from a decoded response body.
    #[must_use]
    pub fn extract_value(&self, value: &Value) -> Option<String> {
        let object = value.as_object()?;

        self.flat_keys
            .iter()
            .find_map(|key| non_empty_str(object.get(*key)))
            .or_else(|| {
                self.wrapper_keys.iter().find_map(|key| {
                    object
                        .get(*key)
                        .and_then(Value::as_object)
                        .and_then(|inner| non_empty_str(inner.get("id")))
                })
            })
            .or_else(|| non_empty_str(object.get("id")))
    }
}

fn non_empty_str(value: Option<&Value>) -> Option<String> {
    value
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// One request shape tried during negotiation.
#[derive(Clone, Debug)]
pub struct CandidateRequest {
    /// Short description used in logs, e.g. `"entity envelope"`.
    pub label: &'static str,
    /// The request to send.
    pub request: HttpRequest,
    /// Where the response carries the identifier.
    pub extractor: IdExtractor,
}

impl CandidateRequest {
    /// Creates a candidate from a prepared request.
    #[must_use]
    pub const fn new(label: &'static str, request: HttpRequest, extractor: IdExtractor) -> Self {
        Self {
            label,
            request,
            extractor,
        }
    }

    /// Creates a POST candidate.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidHttpRequestError`] if the path is invalid.
    pub fn post(
        label: &'static str,
        path: impl Into<String>,
        body: Value,
        extractor: IdExtractor,
    ) -> Result<Self, InvalidHttpRequestError> {
        Ok(Self::new(
            label,
            HttpRequest::with_body(HttpMethod::Post, path, body)?,
            extractor,
        ))
    }
}

/// Finds a freshly created object by listing and matching field values.
///
/// Used when a server reports success but the response carries no
/// recognisable identifier. An item matches when every expected field is
/// equal; an expected `false` or `null` also matches an absent field.
///
/// # Example
///
/// ```rust
/// use graylog_api::clients::ListFallback;
/// use serde_json::json;
///
/// let fallback = ListFallback::new(
///     "/api/streams/s1/rules",
///     json!({"field": "source", "type": 1, "value": "web", "inverted": false}),
/// )
/// .collection_key("stream_rules");
///
/// let listing = br#"{"stream_rules":[
///     {"id":"r1","field":"source","type":1,"value":"db"},
///     {"id":"r2","field":"source","type":1,"value":"web"}
/// ]}"#;
/// assert_eq!(fallback.find(listing), Some("r2".to_string()));
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct ListFallback {
    path: String,
    collection_keys: Vec<&'static str>,
    expected: Map<String, Value>,
}

impl ListFallback {
    /// Creates a fallback listing `path` and matching the fields of `expected`.
    ///
    /// Non-object `expected` values match nothing.
    #[must_use]
    pub fn new(path: impl Into<String>, expected: Value) -> Self {
        let expected = match expected {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        Self {
            path: path.into(),
            collection_keys: Vec::new(),
            expected,
        }
    }

    /// Adds a wrapper key holding the listed items. Bare arrays are always
    /// accepted.
    #[must_use]
    pub fn collection_key(mut self, key: &'static str) -> Self {
        self.collection_keys.push(key);
        self
    }

    /// Returns the listing path.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Finds the identifier of the first matching item in a listing body.
    #[must_use]
    pub fn find(&self, body: &[u8]) -> Option<String> {
        if self.expected.is_empty() {
            return None;
        }
        let listing: Value = serde_json::from_slice(body).ok()?;
        let items = match &listing {
            Value::Array(items) => items,
            Value::Object(object) => self
                .collection_keys
                .iter()
                .find_map(|key| object.get(*key).and_then(Value::as_array))?,
            _ => return None,
        };

        items
            .iter()
            .filter_map(Value::as_object)
            .find(|item| {
                self.expected
                    .iter()
                    .all(|(key, expected)| field_matches(expected, item.get(key)))
            })
            .and_then(|item| non_empty_str(item.get("id")))
    }
}

fn field_matches(expected: &Value, actual: Option<&Value>) -> bool {
    match actual {
        Some(actual) => actual == expected,
        None => matches!(expected, Value::Null | Value::Bool(false)),
    }
}

/// Drives candidate requests through the executor until one yields an id.
///
/// Candidates are tried strictly in order. A candidate that fails moves on
/// to the next; if it was the last one, its error is returned. A candidate
/// that succeeds without a recognisable identifier triggers the
/// [`ListFallback`], if any, before moving on. No identifier is ever
/// invented: running out of candidates after a success without an id yields
/// [`ApiError::NegotiationExhausted`] with the last response.
#[derive(Clone, Debug)]
pub struct PayloadNegotiator {
    http: HttpClient,
}

impl PayloadNegotiator {
    /// Creates a negotiator on top of an executor.
    #[must_use]
    pub const fn new(http: HttpClient) -> Self {
        Self { http }
    }

    /// Tries `candidates` in order and returns the first identifier found.
    ///
    /// # Errors
    ///
    /// Returns the last candidate's error if it failed,
    /// [`ApiError::NegotiationExhausted`] if it succeeded without an
    /// identifier, and [`ApiError::InvalidRequest`] for an empty list.
    pub async fn create_with_negotiation(
        &self,
        operation: &str,
        candidates: Vec<CandidateRequest>,
        fallback: Option<&ListFallback>,
    ) -> Result<String, ApiError> {
        self.create_with_negotiation_cancel(
            operation,
            candidates,
            fallback,
            &CancellationToken::new(),
        )
        .await
    }

    /// As [`create_with_negotiation`](Self::create_with_negotiation), aborting
    /// as soon as `cancel` fires.
    ///
    /// # Errors
    ///
    /// As [`create_with_negotiation`](Self::create_with_negotiation), plus
    /// [`ApiError::Cancelled`].
    pub async fn create_with_negotiation_cancel(
        &self,
        operation: &str,
        candidates: Vec<CandidateRequest>,
        fallback: Option<&ListFallback>,
        cancel: &CancellationToken,
    ) -> Result<String, ApiError> {
        if candidates.is_empty() {
            return Err(InvalidHttpRequestError::NoCandidates {
                operation: operation.to_string(),
            }
            .into());
        }

        let total = candidates.len();
        let mut last_response: Option<HttpResponse> = None;

        for (index, candidate) in candidates.into_iter().enumerate() {
            let is_last = index + 1 == total;

            let response = match self
                .http
                .request_with_cancel(candidate.request, cancel)
                .await
            {
                Ok(response) => response,
                Err(ApiError::Cancelled) => return Err(ApiError::Cancelled),
                Err(e) if is_last => return Err(e),
                Err(e) => {
                    tracing::debug!(
                        "{operation}: candidate {} ({}) failed, trying next: {e}",
                        index + 1,
                        candidate.label
                    );
                    continue;
                }
            };

            if let Some(id) = candidate.extractor.extract(&response.body) {
                tracing::debug!(
                    "{operation}: candidate {} ({}) returned id {id}",
                    index + 1,
                    candidate.label
                );
                return Ok(id);
            }

            if let Some(fallback) = fallback {
                if let Some(id) = self.find_listed(operation, fallback, cancel).await? {
                    return Ok(id);
                }
            }

            tracing::debug!(
                "{operation}: candidate {} ({}) succeeded without an identifier",
                index + 1,
                candidate.label
            );
            last_response = Some(response);
        }

        let last = last_response.unwrap_or_default();
        tracing::warn!(
            "{operation}: no identifier after {total} candidates (last status {})",
            last.status
        );
        Err(NegotiationError {
            operation: operation.to_string(),
            attempts: total,
            last_status: last.status,
            last_body: last.text(),
        }
        .into())
    }

    async fn find_listed(
        &self,
        operation: &str,
        fallback: &ListFallback,
        cancel: &CancellationToken,
    ) -> Result<Option<String>, ApiError> {
        let request = HttpRequest::without_body(HttpMethod::Get, fallback.path())?;
        match self.http.request_with_cancel(request, cancel).await {
            Ok(listing) => {
                let found = fallback.find(&listing.body);
                if found.is_none() {
                    tracing::debug!("{operation}: no listed item matches the request");
                }
                Ok(found)
            }
            Err(ApiError::Cancelled) => Err(ApiError::Cancelled),
            Err(e) => {
                tracing::debug!("{operation}: list fallback failed: {e}");
                Ok(None)
            }
        }
    }
}
