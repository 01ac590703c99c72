//! Server generation detection.
//!
//! [`VersionProbe`] asks a handful of diagnostic endpoints for the
//! `X-Graylog-Version` header and classifies the first answer. It runs once
//! per client and never fails: an unreachable or silent server resolves to
//! [`ApiGeneration::Gen5`].

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::clients::errors::ApiError;
use crate::clients::http_client::standard_headers;
use crate::clients::http_request::{HttpMethod, RequestAttempt};
use crate::clients::transport::Transport;
use crate::config::{ApiGeneration, ClientConfig};

/// Diagnostic paths probed against every base URL variant, in order.
pub const PROBE_PATHS: [&str; 2] = ["/api/system", "/system"];

/// One-shot server generation detector.
///
/// Probes are sent with the same headers as normal requests, so servers that
/// reject the credentials with 401 still reveal their version. There are no
/// retries; transport failures and responses without a version header are
/// inconclusive and move on to the next candidate URL.
///
/// # Example
///
/// ```rust,ignore
/// use graylog_api::clients::{ReqwestTransport, VersionProbe};
/// use std::sync::Arc;
///
/// let probe = VersionProbe::new(&config, Arc::new(ReqwestTransport::new(config.timeout())));
/// let generation = probe.resolve().await;
/// println!("talking to Graylog {generation}");
/// ```
#[derive(Clone, Debug)]
pub struct VersionProbe {
    transport: Arc<dyn Transport>,
    candidates: Vec<String>,
    headers: Vec<(String, String)>,
}

impl VersionProbe {
    /// Creates a probe for the configured server.
    #[must_use]
    pub fn new(config: &ClientConfig, transport: Arc<dyn Transport>) -> Self {
        let mut candidates: Vec<String> = Vec::new();
        for base in config.base_url().variants() {
            for path in PROBE_PATHS {
                let url = format!("{base}{path}");
                if !candidates.contains(&url) {
                    candidates.push(url);
                }
            }
        }

        Self {
            transport,
            candidates,
            headers: standard_headers(config.token(), config.user_agent_prefix()),
        }
    }

    /// Returns the probed URLs in order.
    #[must_use]
    pub fn candidates(&self) -> &[String] {
        &self.candidates
    }

    /// Resolves the server generation, defaulting to Gen5.
    pub async fn resolve(&self) -> ApiGeneration {
        self.resolve_with_cancel(&CancellationToken::new())
            .await
            .unwrap_or_default()
    }

    /// Resolves the server generation, aborting as soon as `cancel` fires.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Cancelled`] if the token fires. No other error is
    /// ever returned.
    pub async fn resolve_with_cancel(
        &self,
        cancel: &CancellationToken,
    ) -> Result<ApiGeneration, ApiError> {
        for url in &self.candidates {
            let attempt = RequestAttempt {
                method: HttpMethod::Get,
                url: url.clone(),
                headers: self.headers.clone(),
                body: None,
                attempt: 0,
            };

            let outcome = tokio::select! {
                biased;
                () = cancel.cancelled() => return Err(ApiError::Cancelled),
                outcome = self.transport.send(&attempt) => outcome,
            };

            let response = match outcome {
                Ok(response) => response,
                Err(e) => {
                    tracing::debug!("Version probe of {url} failed: {e}");
                    continue;
                }
            };

            if !matches!(response.status, 200 | 401) {
                tracing::debug!(
                    "Version probe of {url} returned status {}",
                    response.status
                );
                continue;
            }

            if let Some(version) = response.version() {
                let generation = ApiGeneration::from_version_header(Some(version));
                tracing::debug!("Detected Graylog {version} ({generation}) via {url}");
                return Ok(generation);
            }
        }

        tracing::warn!(
            "Could not detect the Graylog version; assuming {}",
            ApiGeneration::default()
        );
        Ok(ApiGeneration::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::errors::TransportError;
    use crate::clients::http_response::{HttpResponse, VERSION_HEADER};
    use crate::config::{ApiToken, BaseUrl};
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// Answers by URL; unknown URLs fail at the transport level.
    #[derive(Debug, Default)]
    struct RoutedTransport {
        routes: HashMap<String, (u16, Option<&'static str>)>,
        seen: Mutex<Vec<RequestAttempt>>,
    }

    impl RoutedTransport {
        fn with(routes: &[(&str, u16, Option<&'static str>)]) -> Arc<Self> {
            Arc::new(Self {
                routes: routes
                    .iter()
                    .map(|(url, status, version)| ((*url).to_string(), (*status, *version)))
                    .collect(),
                seen: Mutex::new(Vec::new()),
            })
        }

        fn urls(&self) -> Vec<String> {
            self.seen
                .lock()
                .unwrap()
                .iter()
                .map(|a| a.url.clone())
                .collect()
        }
    }

    #[async_trait]
    impl Transport for RoutedTransport {
        async fn send(&self, attempt: &RequestAttempt) -> Result<HttpResponse, TransportError> {
            self.seen.lock().unwrap().push(attempt.clone());
            let (status, version) = self
                .routes
                .get(&attempt.url)
                .copied()
                .ok_or_else(|| TransportError::other("connection refused"))?;
            let mut headers = HashMap::new();
            if let Some(version) = version {
                headers.insert(VERSION_HEADER.to_string(), vec![version.to_string()]);
            }
            Ok(HttpResponse::new(status, headers, Vec::new()))
        }
    }

    fn config(url: &str) -> ClientConfig {
        ClientConfig::builder()
            .base_url(BaseUrl::new(url).unwrap())
            .token(ApiToken::new("dG9rZW46dG9rZW4=").unwrap())
            .build()
            .unwrap()
    }

    #[test]
    fn test_candidates_without_api_suffix() {
        let probe = VersionProbe::new(&config("http://gl:9000"), RoutedTransport::with(&[]));
        assert_eq!(
            probe.candidates(),
            &["http://gl:9000/api/system", "http://gl:9000/system"]
        );
    }

    #[test]
    fn test_candidates_with_api_suffix_are_deduplicated() {
        let probe = VersionProbe::new(&config("http://gl:9000/api"), RoutedTransport::with(&[]));
        assert_eq!(
            probe.candidates(),
            &[
                "http://gl:9000/api/system",
                "http://gl:9000/system",
                "http://gl:9000/api/api/system",
            ]
        );
    }

    #[tokio::test]
    async fn test_version_header_table() {
        let cases: [(Option<&'static str>, ApiGeneration); 5] = [
            (Some("7.0.1"), ApiGeneration::Gen7),
            (Some("6.9.0"), ApiGeneration::Gen6),
            (Some("5.2.3"), ApiGeneration::Gen5),
            (Some(""), ApiGeneration::Gen5),
            (None, ApiGeneration::Gen5),
        ];
        for (header, expected) in cases {
            let transport = RoutedTransport::with(&[("http://gl:9000/api/system", 200, header)]);
            let probe = VersionProbe::new(&config("http://gl:9000"), transport);
            assert_eq!(probe.resolve().await, expected, "{header:?}");
        }
    }

    #[tokio::test]
    async fn test_unauthorized_response_still_counts() {
        let transport = RoutedTransport::with(&[("http://gl:9000/api/system", 401, Some("6.1.0"))]);
        let probe = VersionProbe::new(&config("http://gl:9000"), transport.clone());
        assert_eq!(probe.resolve().await, ApiGeneration::Gen6);
        assert_eq!(transport.urls().len(), 1);
    }

    #[tokio::test]
    async fn test_other_statuses_are_inconclusive() {
        let transport = RoutedTransport::with(&[
            ("http://gl:9000/api/system", 500, Some("7.0.0")),
            ("http://gl:9000/system", 200, Some("6.0.0")),
        ]);
        let probe = VersionProbe::new(&config("http://gl:9000"), transport.clone());
        assert_eq!(probe.resolve().await, ApiGeneration::Gen6);
        assert_eq!(
            transport.urls(),
            vec!["http://gl:9000/api/system", "http://gl:9000/system"]
        );
    }

    #[tokio::test]
    async fn test_network_errors_fall_through_and_default() {
        let transport = RoutedTransport::with(&[]);
        let probe = VersionProbe::new(&config("http://gl:9000/api"), transport.clone());
        assert_eq!(probe.resolve().await, ApiGeneration::Gen5);
        assert_eq!(transport.urls().len(), 3);
    }

    #[tokio::test]
    async fn test_probe_sends_authenticated_headers() {
        let transport = RoutedTransport::with(&[("http://gl:9000/api/system", 200, Some("7.0.0"))]);
        let probe = VersionProbe::new(&config("http://gl:9000"), transport.clone());
        probe.resolve().await;

        let seen = transport.seen.lock().unwrap();
        assert_eq!(
            seen[0].header("authorization"),
            Some("Basic dG9rZW46dG9rZW4=")
        );
        assert_eq!(seen[0].header("accept"), Some("application/json"));
        assert!(seen[0].header("x-requested-by").is_some());
    }

    #[tokio::test]
    async fn test_cancelled_probe() {
        let transport = RoutedTransport::with(&[("http://gl:9000/api/system", 200, Some("7.0.0"))]);
        let probe = VersionProbe::new(&config("http://gl:9000"), transport.clone());
        let cancel = CancellationToken::new();
        cancel.cancel();

        let result = probe.resolve_with_cancel(&cancel).await;
        assert!(matches!(result, Err(ApiError::Cancelled)));
        assert!(transport.urls().is_empty());
    }
}
