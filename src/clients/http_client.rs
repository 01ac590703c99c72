//! Request executor for Graylog API communication.
//!
//! This module provides the [`HttpClient`] type, which sends one logical
//! request with retry, backoff and error classification.

use std::collections::BTreeMap;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::clients::errors::{ApiError, MaxRetriesExceededError, ResponseError};
use crate::clients::http_request::{HttpMethod, HttpRequest, RequestAttempt};
use crate::clients::http_response::HttpResponse;
use crate::clients::retry::RetryPolicy;
use crate::clients::transport::Transport;
use crate::config::{ApiToken, BaseUrl, ClientConfig};

/// Crate version from Cargo.toml.
pub const SDK_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Value of the `X-Requested-By` client identification header.
pub const CLIENT_IDENTIFIER: &str = "graylog-api-rust";

/// Tracing target used for request body echoing.
pub const HTTP_LOG_TARGET: &str = "graylog_api::http";

/// Builds the headers sent with every request, in a stable order.
pub(crate) fn standard_headers(
    token: &ApiToken,
    user_agent_prefix: Option<&str>,
) -> Vec<(String, String)> {
    let user_agent_prefix =
        user_agent_prefix.map_or(String::new(), |prefix| format!("{prefix} | "));
    let user_agent = format!("{user_agent_prefix}{CLIENT_IDENTIFIER} v{SDK_VERSION}");

    vec![
        ("Accept".to_string(), "application/json".to_string()),
        ("Content-Type".to_string(), "application/json".to_string()),
        ("X-Requested-By".to_string(), CLIENT_IDENTIFIER.to_string()),
        ("User-Agent".to_string(), user_agent),
        ("Authorization".to_string(), token.authorization_header()),
    ]
}

/// Executes requests against the Graylog API.
///
/// The client handles:
/// - URL construction from the normalised base URL
/// - Default headers including authorization and client identification
/// - Single serialization of the request body per logical call
/// - Retry with exponential backoff for 429/500/502/503/504 and transport failures
/// - Error classification of terminal responses
/// - Cancellation of both in-flight attempts and backoff sleeps
///
/// The executor knows nothing about server generations; callers pass
/// version-appropriate paths.
///
/// # Thread Safety
///
/// `HttpClient` is `Send + Sync` and cheap to clone. All state is immutable
/// after construction.
///
/// # Example
///
/// ```rust,ignore
/// use graylog_api::clients::{HttpClient, HttpMethod, HttpRequest, ReqwestTransport};
/// use std::sync::Arc;
///
/// let transport = Arc::new(ReqwestTransport::new(config.timeout()));
/// let client = HttpClient::new(&config, transport);
///
/// let response = client.get("/api/streams").await?;
/// println!("{}", response.text());
/// ```
#[derive(Clone, Debug)]
pub struct HttpClient {
    transport: Arc<dyn Transport>,
    base_url: BaseUrl,
    default_headers: Vec<(String, String)>,
    retry: RetryPolicy,
    debug_http: bool,
}

// Verify HttpClient is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<HttpClient>();
};

impl HttpClient {
    /// Creates an executor for the given configuration and transport.
    #[must_use]
    pub fn new(config: &ClientConfig, transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            base_url: config.base_url().clone(),
            default_headers: standard_headers(config.token(), config.user_agent_prefix()),
            retry: RetryPolicy::from_config(config),
            debug_http: config.debug_http(),
        }
    }

    /// Returns the base URL requests are sent to.
    #[must_use]
    pub const fn base_url(&self) -> &BaseUrl {
        &self.base_url
    }

    /// Returns the headers sent with every request.
    #[must_use]
    pub fn default_headers(&self) -> &[(String, String)] {
        &self.default_headers
    }

    /// Returns the retry policy.
    #[must_use]
    pub const fn retry_policy(&self) -> &RetryPolicy {
        &self.retry
    }

    /// Returns the underlying transport.
    #[must_use]
    pub fn transport(&self) -> Arc<dyn Transport> {
        Arc::clone(&self.transport)
    }

    /// Sends a request, retrying transient failures.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] if:
    /// - Request validation fails (`InvalidRequest`)
    /// - The body cannot be serialized (`Serialization`)
    /// - The server answers 404 (`NotFound`, never retried)
    /// - A terminal error status is received (`Response` or `Validation`)
    /// - Retries are exhausted on a transient status (`MaxRetries`)
    /// - The transport fails on every attempt (`Network`)
    pub async fn request(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        self.request_with_cancel(request, &CancellationToken::new())
            .await
    }

    /// Sends a request, aborting as soon as `cancel` fires.
    ///
    /// Cancellation interrupts both the in-flight attempt and any pending
    /// backoff sleep.
    ///
    /// # Errors
    ///
    /// As [`request`](Self::request), plus [`ApiError::Cancelled`].
    pub async fn request_with_cancel(
        &self,
        request: HttpRequest,
        cancel: &CancellationToken,
    ) -> Result<HttpResponse, ApiError> {
        request.verify()?;

        let url = self.base_url.join(&request.path);
        let body = request.body.as_ref().map(serde_json::to_vec).transpose()?;

        if self.debug_http {
            if let Some(bytes) = &body {
                tracing::debug!(
                    target: HTTP_LOG_TARGET,
                    method = %request.http_method,
                    url = %url,
                    body = %String::from_utf8_lossy(bytes),
                    "Outgoing request body"
                );
            }
        }

        let headers = self.merge_headers(request.extra_headers.as_ref());

        let mut attempt: u32 = 0;
        loop {
            let try_request = RequestAttempt {
                method: request.http_method,
                url: url.clone(),
                headers: headers.clone(),
                body: body.clone(),
                attempt,
            };

            let outcome = tokio::select! {
                biased;
                () = cancel.cancelled() => return Err(ApiError::Cancelled),
                outcome = self.transport.send(&try_request) => outcome,
            };

            match outcome {
                Ok(response) => {
                    if response.is_ok() {
                        return Ok(response);
                    }
                    if response.status == 404 {
                        return Err(ApiError::NotFound);
                    }

                    let error = ResponseError::classify(response.status, &response.body);
                    if !error.is_retryable() {
                        return Err(ApiError::from_response(error));
                    }

                    if !self.retry.has_retry_after(attempt) {
                        tracing::warn!(
                            "{} {} still failing with status {} after {} tries",
                            request.http_method,
                            request.path,
                            error.status,
                            attempt + 1
                        );
                        if attempt == 0 {
                            return Err(ApiError::from_response(error));
                        }
                        return Err(ApiError::MaxRetries(MaxRetriesExceededError {
                            tries: attempt + 1,
                            last: error,
                        }));
                    }

                    tracing::debug!(
                        status = error.status,
                        attempt,
                        "Retryable status from {} {}",
                        request.http_method,
                        request.path
                    );
                }
                Err(source) => {
                    if !self.retry.has_retry_after(attempt) {
                        tracing::warn!(
                            "{} {} failed after {} tries: {}",
                            request.http_method,
                            request.path,
                            attempt + 1,
                            source
                        );
                        return Err(ApiError::Network {
                            attempts: attempt + 1,
                            source,
                        });
                    }

                    tracing::debug!(
                        attempt,
                        "Transport failure on {} {}: {}",
                        request.http_method,
                        request.path,
                        source
                    );
                }
            }

            let delay = self.retry.delay_for(attempt);
            tokio::select! {
                biased;
                () = cancel.cancelled() => return Err(ApiError::Cancelled),
                () = tokio::time::sleep(delay) => {}
            }
            attempt += 1;
        }
    }

    /// Sends a GET request.
    ///
    /// # Errors
    ///
    /// See [`request`](Self::request).
    pub async fn get(&self, path: impl Into<String>) -> Result<HttpResponse, ApiError> {
        self.request(HttpRequest::without_body(HttpMethod::Get, path)?)
            .await
    }

    /// Sends a POST request with a JSON body.
    ///
    /// # Errors
    ///
    /// See [`request`](Self::request).
    pub async fn post(
        &self,
        path: impl Into<String>,
        body: serde_json::Value,
    ) -> Result<HttpResponse, ApiError> {
        self.request(HttpRequest::with_body(HttpMethod::Post, path, body)?)
            .await
    }

    /// Sends a POST request without a body.
    ///
    /// # Errors
    ///
    /// See [`request`](Self::request).
    pub async fn post_empty(&self, path: impl Into<String>) -> Result<HttpResponse, ApiError> {
        self.request(HttpRequest::without_body(HttpMethod::Post, path)?)
            .await
    }

    /// Sends a PUT request with a JSON body.
    ///
    /// # Errors
    ///
    /// See [`request`](Self::request).
    pub async fn put(
        &self,
        path: impl Into<String>,
        body: serde_json::Value,
    ) -> Result<HttpResponse, ApiError> {
        self.request(HttpRequest::with_body(HttpMethod::Put, path, body)?)
            .await
    }

    /// Sends a DELETE request.
    ///
    /// # Errors
    ///
    /// See [`request`](Self::request).
    pub async fn delete(&self, path: impl Into<String>) -> Result<HttpResponse, ApiError> {
        self.request(HttpRequest::without_body(HttpMethod::Delete, path)?)
            .await
    }

    fn merge_headers(&self, extra: Option<&BTreeMap<String, String>>) -> Vec<(String, String)> {
        let mut headers = self.default_headers.clone();
        for (key, value) in extra.into_iter().flatten() {
            if let Some(existing) = headers
                .iter_mut()
                .find(|(name, _)| name.eq_ignore_ascii_case(key))
            {
                existing.1.clone_from(value);
            } else {
                headers.push((key.clone(), value.clone()));
            }
        }
        headers
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::errors::{ErrorClass, TransportError};
    use async_trait::async_trait;
    use serde_json::json;
    use std::collections::{HashMap, VecDeque};
    use std::sync::Mutex;
    use std::time::Duration;

    #[derive(Debug, Default)]
    struct ScriptedTransport {
        script: Mutex<VecDeque<Result<HttpResponse, TransportError>>>,
        seen: Mutex<Vec<RequestAttempt>>,
    }

    impl ScriptedTransport {
        fn new(script: Vec<Result<HttpResponse, TransportError>>) -> Arc<Self> {
            Arc::new(Self {
                script: Mutex::new(script.into()),
                seen: Mutex::new(Vec::new()),
            })
        }

        fn seen(&self) -> Vec<RequestAttempt> {
            self.seen.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Transport for ScriptedTransport {
        async fn send(&self, attempt: &RequestAttempt) -> Result<HttpResponse, TransportError> {
            self.seen.lock().unwrap().push(attempt.clone());
            self.script
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(TransportError::other("script exhausted")))
        }
    }

    fn status(code: u16, body: &str) -> Result<HttpResponse, TransportError> {
        Ok(HttpResponse::new(code, HashMap::new(), body.as_bytes().to_vec()))
    }

    fn config(max_retries: u32) -> ClientConfig {
        ClientConfig::builder()
            .base_url(BaseUrl::new("http://gl:9000/api").unwrap())
            .token(ApiToken::new("dG9rZW46dG9rZW4=").unwrap())
            .max_retries(max_retries)
            .user_agent_prefix("my-tool")
            .build()
            .unwrap()
    }

    fn client(transport: Arc<ScriptedTransport>, max_retries: u32) -> HttpClient {
        HttpClient::new(&config(max_retries), transport)
    }

    #[test]
    fn test_standard_headers() {
        let token = ApiToken::new("abc").unwrap();
        let headers = standard_headers(&token, None);
        let lookup = |name: &str| {
            headers
                .iter()
                .find(|(key, _)| key == name)
                .map(|(_, value)| value.clone())
        };
        assert_eq!(lookup("Accept").as_deref(), Some("application/json"));
        assert_eq!(lookup("Content-Type").as_deref(), Some("application/json"));
        assert_eq!(lookup("X-Requested-By").as_deref(), Some(CLIENT_IDENTIFIER));
        assert_eq!(lookup("Authorization").as_deref(), Some("Basic abc"));
        assert_eq!(
            lookup("User-Agent"),
            Some(format!("graylog-api-rust v{SDK_VERSION}"))
        );
    }

    #[test]
    fn test_user_agent_prefix() {
        let token = ApiToken::new("abc").unwrap();
        let headers = standard_headers(&token, Some("my-tool"));
        assert!(headers.iter().any(|(key, value)| {
            key == "User-Agent" && value.starts_with("my-tool | graylog-api-rust v")
        }));
    }

    #[tokio::test(start_paused = true)]
    async fn test_success_returns_response() {
        let transport = ScriptedTransport::new(vec![status(200, r#"{"id":"1"}"#)]);
        let response = client(transport.clone(), 3)
            .get("/api/streams/1")
            .await
            .unwrap();

        assert_eq!(response.status, 200);
        let seen = transport.seen();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].url, "http://gl:9000/api/streams/1");
        assert_eq!(seen[0].method, HttpMethod::Get);
        assert!(seen[0].body.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_not_found_is_not_retried() {
        let transport = ScriptedTransport::new(vec![status(404, r#"{"error":"not found"}"#)]);
        let error = client(transport.clone(), 3)
            .get("/api/streams/missing")
            .await
            .unwrap_err();

        assert!(error.is_not_found());
        assert_eq!(transport.seen().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_terminal_status_is_classified() {
        let transport = ScriptedTransport::new(vec![status(
            400,
            r#"{"message":"validation failed","errors":{"title":["may not be empty"]}}"#,
        )]);
        let error = client(transport.clone(), 3)
            .post("/api/streams", json!({"title": ""}))
            .await
            .unwrap_err();

        assert_eq!(error.class(), ErrorClass::Validation);
        assert_eq!(error.status(), Some(400));
        assert_eq!(transport.seen().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_exhaustion_keeps_last_response() {
        let transport = ScriptedTransport::new(vec![
            status(503, "first"),
            status(502, "second"),
            status(500, "third"),
            status(429, "slow down"),
        ]);
        let error = client(transport.clone(), 3)
            .get("/api/system")
            .await
            .unwrap_err();

        match error {
            ApiError::MaxRetries(e) => {
                assert_eq!(e.tries, 4);
                assert_eq!(e.last.status, 429);
                assert_eq!(e.last.raw_body, "slow down");
            }
            other => panic!("expected MaxRetries, got {other:?}"),
        }
        assert_eq!(transport.seen().len(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_retries_returns_plain_response_error() {
        let transport = ScriptedTransport::new(vec![status(503, "down")]);
        let error = client(transport.clone(), 0)
            .get("/api/system")
            .await
            .unwrap_err();

        assert!(matches!(error, ApiError::Response(ref e) if e.status == 503));
        assert_eq!(transport.seen().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_attempt_indices_and_identical_bodies() {
        let transport = ScriptedTransport::new(vec![
            Err(TransportError::other("connection refused")),
            status(503, ""),
            status(201, r#"{"id":"x"}"#),
        ]);
        client(transport.clone(), 3)
            .post("/api/streams", json!({"title": "errors", "matching_type": "AND"}))
            .await
            .unwrap();

        let seen = transport.seen();
        assert_eq!(seen.len(), 3);
        assert_eq!(
            seen.iter().map(|a| a.attempt).collect::<Vec<_>>(),
            vec![0, 1, 2]
        );
        assert!(seen[0].body.is_some());
        assert_eq!(seen[0].body, seen[1].body);
        assert_eq!(seen[0].body, seen[2].body);
    }

    #[tokio::test(start_paused = true)]
    async fn test_extra_headers_override_defaults() {
        let transport = ScriptedTransport::new(vec![status(200, "{}")]);
        let request = HttpRequest::builder(HttpMethod::Get, "/api/system")
            .header("accept", "text/plain")
            .header("X-Trace", "1")
            .build()
            .unwrap();
        client(transport.clone(), 0).request(request).await.unwrap();

        let attempt = &transport.seen()[0];
        assert_eq!(attempt.header("Accept"), Some("text/plain"));
        assert_eq!(attempt.header("X-Trace"), Some("1"));
        assert_eq!(
            attempt
                .headers
                .iter()
                .filter(|(k, _)| k.eq_ignore_ascii_case("accept"))
                .count(),
            1
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_invalid_path_is_rejected_before_sending() {
        let transport = ScriptedTransport::new(vec![]);
        let error = client(transport.clone(), 0)
            .get("api/streams")
            .await
            .unwrap_err();
        assert!(matches!(error, ApiError::InvalidRequest(_)));
        assert!(transport.seen().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_token_short_circuits() {
        let transport = ScriptedTransport::new(vec![status(200, "{}")]);
        let cancel = CancellationToken::new();
        cancel.cancel();

        let request = HttpRequest::without_body(HttpMethod::Get, "/api/system").unwrap();
        let error = client(transport.clone(), 3)
            .request_with_cancel(request, &cancel)
            .await
            .unwrap_err();

        assert!(matches!(error, ApiError::Cancelled));
        assert!(transport.seen().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_transient_status_without_retries_stays_retryable() {
        let transport = ScriptedTransport::new(vec![status(503, "unavailable")]);
        let error = client(transport.clone(), 0)
            .get("/api/system")
            .await
            .unwrap_err();

        assert!(matches!(error, ApiError::Response(_)));
        assert_eq!(error.class(), ErrorClass::Retryable);
        assert_eq!(error.status(), Some(503));
        assert_eq!(transport.seen().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_interrupts_backoff_sleep() {
        let config = ClientConfig::builder()
            .base_url(BaseUrl::new("http://gl:9000").unwrap())
            .token(ApiToken::new("abc").unwrap())
            .max_retries(3)
            .retry_wait(Duration::from_secs(10))
            .build()
            .unwrap();
        let transport = ScriptedTransport::new(vec![status(503, ""), status(200, "{}")]);
        let client = HttpClient::new(&config, transport.clone());

        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(1)).await;
            trigger.cancel();
        });

        let started = tokio::time::Instant::now();
        let request = HttpRequest::without_body(HttpMethod::Get, "/api/system").unwrap();
        let error = client.request_with_cancel(request, &cancel).await.unwrap_err();

        assert!(matches!(error, ApiError::Cancelled));
        assert_eq!(transport.seen().len(), 1);
        assert_eq!(started.elapsed(), Duration::from_secs(1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_capped_backoff() {
        let config = ClientConfig::builder()
            .base_url(BaseUrl::new("http://gl:9000").unwrap())
            .token(ApiToken::new("abc").unwrap())
            .max_retries(4)
            .retry_wait(Duration::from_secs(1))
            .max_retry_wait(Duration::from_secs(2))
            .build()
            .unwrap();
        let transport = ScriptedTransport::new(vec![]);
        let client = HttpClient::new(&config, transport.clone());

        let started = tokio::time::Instant::now();
        let error = client.get("/api/system").await.unwrap_err();

        assert!(matches!(error, ApiError::Network { attempts: 5, .. }));
        // 1 + 2 + 2 + 2
        assert_eq!(started.elapsed(), Duration::from_secs(7));
    }
}
