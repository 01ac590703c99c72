//! # Graylog API Rust Client
//!
//! An async client for the Graylog REST API that adapts to the server it
//! talks to. Graylog 5, 6 and 7 disagree on paths, payload envelopes and
//! response shapes; this crate detects the server generation once and
//! smooths over the differences.
//!
//! ## Overview
//!
//! This crate provides:
//! - Type-safe configuration via [`ClientConfig`] and [`ClientConfigBuilder`]
//! - Server generation detection via [`clients::VersionProbe`]
//! - A retrying request executor with exponential backoff
//!   ([`clients::HttpClient`])
//! - Structured error classification ([`clients::ApiError`])
//! - Create-payload negotiation across request shapes
//!   ([`clients::PayloadNegotiator`])
//! - Thin resource clients for streams, inputs, index sets, pipelines,
//!   dashboards, events, users, roles, outputs and LDAP settings
//!
//! ## Quick Start
//!
//! ```rust
//! use graylog_api::{ApiToken, BaseUrl, ClientConfig};
//!
//! let config = ClientConfig::builder()
//!     .base_url(BaseUrl::new("https://graylog.example.com").unwrap())
//!     .token(ApiToken::from_credentials("admin", "admin").unwrap())
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(config.max_retries(), 3);
//! ```
//!
//! ## Connecting
//!
//! ```rust,ignore
//! use graylog_api::{ClientConfig, GraylogClient};
//! use graylog_api::rest::resources::Stream;
//!
//! let client = GraylogClient::connect(config).await;
//! println!("Talking to Graylog {}", client.generation());
//!
//! let stream = client
//!     .streams()
//!     .create(&Stream {
//!         title: "Errors".to_string(),
//!         index_set_id: client.index_sets().default_index_set().await?.id.unwrap_or_default(),
//!         ..Default::default()
//!     })
//!     .await?;
//! ```
//!
//! ## Error Handling
//!
//! ```rust,ignore
//! use graylog_api::clients::{ApiError, ErrorClass};
//!
//! match client.streams().get("missing").await {
//!     Err(ApiError::NotFound) => println!("gone"),
//!     Err(e) if e.class() == ErrorClass::Validation => {
//!         for (field, messages) in e.field_errors().into_iter().flatten() {
//!             println!("{field}: {}", messages.join(", "));
//!         }
//!     }
//!     Err(e) => return Err(e.into()),
//!     Ok(stream) => println!("{}", stream.title),
//! }
//! ```
//!
//! ## Design Principles
//!
//! - **No global state**: Configuration is instance-based and passed explicitly
//! - **Fail-fast validation**: All newtypes validate on construction
//! - **Detect once**: The server generation is resolved at construction and
//!   never changes
//! - **Thread-safe**: All client types are `Send + Sync`
//! - **Async-first**: Designed for use with the Tokio runtime

mod client;
pub mod clients;
pub mod config;
pub mod error;
pub mod rest;

// Re-export public types at crate root for convenience
pub use client::GraylogClient;
pub use config::{ApiGeneration, ApiToken, BaseUrl, ClientConfig, ClientConfigBuilder};
pub use error::ConfigError;

// Re-export core client types
pub use clients::{
    ApiError, CreateStrategy, ErrorClass, HttpClient, HttpMethod, HttpRequest, HttpResponse,
    PayloadNegotiator, ResponseError, RetryPolicy, Transport, VersionProbe,
};
