//! Shared helpers for integration tests.

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use graylog_api::clients::{HttpResponse, RequestAttempt, TransportError};
use graylog_api::{ApiGeneration, ApiToken, BaseUrl, ClientConfig, GraylogClient, Transport};

/// Builds a config pointing at `url` with a tiny retry wait.
pub fn config(url: &str, generation: Option<ApiGeneration>) -> ClientConfig {
    let mut builder = ClientConfig::builder()
        .base_url(BaseUrl::new(url).unwrap())
        .token(ApiToken::from_credentials("admin", "admin").unwrap())
        .retry_wait(Duration::from_millis(1))
        .timeout(Duration::from_secs(5));
    if let Some(generation) = generation {
        builder = builder.api_generation(generation);
    }
    builder.build().unwrap()
}

/// Connects to `url` with a forced generation, skipping detection.
pub async fn client(url: &str, generation: ApiGeneration) -> GraylogClient {
    GraylogClient::connect(config(url, Some(generation))).await
}

/// A transport that replays a fixed script of outcomes.
#[derive(Debug, Default)]
pub struct ScriptedTransport {
    script: Mutex<VecDeque<Result<HttpResponse, TransportError>>>,
    seen: Mutex<Vec<RequestAttempt>>,
}

impl ScriptedTransport {
    pub fn new(script: Vec<Result<HttpResponse, TransportError>>) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(script.into()),
            seen: Mutex::new(Vec::new()),
        })
    }

    pub fn seen(&self) -> Vec<RequestAttempt> {
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

pub fn status(code: u16, body: &str) -> Result<HttpResponse, TransportError> {
    Ok(HttpResponse::new(code, HashMap::new(), body.as_bytes().to_vec()))
}
