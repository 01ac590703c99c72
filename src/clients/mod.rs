//! HTTP layer for Graylog API communication.
//!
//! This module provides the adaptive core of the client: server generation
//! detection, request execution with retry and backoff, error
//! classification, and payload negotiation.
//!
//! # Overview
//!
//! The main types in this module are:
//!
//! - [`HttpClient`]: The request executor
//! - [`HttpRequest`]: A logical request to be sent to the API
//! - [`HttpResponse`]: A raw response from the API
//! - [`HttpMethod`]: Supported HTTP methods (GET, POST, PUT, DELETE)
//! - [`Transport`]: The raw HTTP seam, with [`ReqwestTransport`] as default
//! - [`VersionProbe`]: One-shot server generation detection
//! - [`PayloadNegotiator`]: Ordered trial of request shapes for creates
//! - [`ApiError`] and [`ResponseError`]: Structured errors
//!
//! # Example
//!
//! ```rust,ignore
//! use graylog_api::clients::{HttpClient, HttpMethod, HttpRequest, ReqwestTransport};
//! use std::sync::Arc;
//!
//! let client = HttpClient::new(&config, Arc::new(ReqwestTransport::new(config.timeout())));
//!
//! let request = HttpRequest::builder(HttpMethod::Get, "/api/streams")
//!     .build()
//!     .unwrap();
//!
//! let response = client.request(request).await?;
//! ```
//!
//! # Retry Behavior
//!
//! Every logical call makes at most `max_retries + 1` attempts:
//!
//! - **404**: Returns [`ApiError::NotFound`] immediately
//! - **429, 500, 502, 503, 504**: Retried after `retry_wait * 2^attempt`
//! - **Transport failures**: Retried with the same backoff
//! - **Other errors (4xx/5xx)**: Returned immediately after classification
//!
//! There is no jitter, and `Retry-After` is not consulted.

mod errors;
mod http_client;
mod http_request;
mod http_response;
mod negotiation;
mod probe;
mod retry;
mod transport;

pub use errors::{
    ApiError, ErrorClass, InvalidHttpRequestError, MaxRetriesExceededError, NegotiationError,
    ResponseError, TransportError,
};
pub use http_client::{HttpClient, CLIENT_IDENTIFIER, HTTP_LOG_TARGET, SDK_VERSION};
pub use http_request::{require_keys, HttpMethod, HttpRequest, HttpRequestBuilder, RequestAttempt};
pub use http_response::{HttpResponse, VERSION_HEADER};
pub use negotiation::{
    CandidateRequest, CreateStrategy, IdExtractor, ListFallback, PayloadNegotiator,
};
pub use probe::{VersionProbe, PROBE_PATHS};
pub use retry::{is_retryable_status, RetryPolicy, RETRYABLE_STATUSES};
pub use transport::{ReqwestTransport, Transport};
