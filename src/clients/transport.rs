//! The raw HTTP transport seam.
//!
//! The executor and the version probe talk to the network only through the
//! [`Transport`] trait. [`ReqwestTransport`] is the production
//! implementation; tests substitute scripted transports.

use std::collections::HashMap;
use std::fmt::Debug;
use std::time::Duration;

use async_trait::async_trait;

use crate::clients::errors::TransportError;
use crate::clients::http_request::{HttpMethod, RequestAttempt};
use crate::clients::http_response::HttpResponse;

/// Sends a single request attempt and returns the raw response.
///
/// Implementations must be safe for concurrent use; connection pooling is
/// their responsibility. Any HTTP status, including 4xx and 5xx, is a
/// successful send; only failures below HTTP are errors.
#[async_trait]
pub trait Transport: Send + Sync + Debug {
    /// Sends `attempt` and returns the response.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] if no HTTP response was received.
    async fn send(&self, attempt: &RequestAttempt) -> Result<HttpResponse, TransportError>;
}

/// [`Transport`] backed by a pooled [`reqwest::Client`].
#[derive(Clone, Debug)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

// Verify ReqwestTransport is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<ReqwestTransport>();
};

impl ReqwestTransport {
    /// Creates a transport with the given per-request timeout.
    ///
    /// # Panics
    ///
    /// Panics if the underlying reqwest client cannot be created. This should
    /// only happen in extremely unusual circumstances (e.g., TLS initialization failure).
    #[must_use]
    pub fn new(timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .use_rustls_tls()
            .timeout(timeout)
            .build()
            .expect("Failed to create HTTP client");
        Self { client }
    }

    /// Wraps an existing reqwest client.
    #[must_use]
    pub const fn from_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    fn parse_response_headers(
        headers: &reqwest::header::HeaderMap,
    ) -> HashMap<String, Vec<String>> {
        let mut result: HashMap<String, Vec<String>> = HashMap::new();
        for (name, value) in headers {
            let value = value.to_str().unwrap_or_default().to_string();
            result.entry(name.as_str().to_string()).or_default().push(value);
        }
        result
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, attempt: &RequestAttempt) -> Result<HttpResponse, TransportError> {
        let mut builder = match attempt.method {
            HttpMethod::Get => self.client.get(&attempt.url),
            HttpMethod::Post => self.client.post(&attempt.url),
            HttpMethod::Put => self.client.put(&attempt.url),
            HttpMethod::Delete => self.client.delete(&attempt.url),
        };

        for (key, value) in &attempt.headers {
            builder = builder.header(key, value);
        }

        if let Some(body) = &attempt.body {
            builder = builder.body(body.clone());
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let headers = Self::parse_response_headers(response.headers());
        let body = response.bytes().await?.to_vec();

        Ok(HttpResponse::new(status, headers, body))
    }
}
