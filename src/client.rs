//! The Graylog API client facade.
//!
//! [`GraylogClient`] resolves the server generation once, picks the matching
//! [`CreateStrategy`], and hands out resource clients that share one
//! [`HttpClient`].

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::clients::{
    ApiError, CreateStrategy, HttpClient, PayloadNegotiator, ReqwestTransport, Transport,
    VersionProbe,
};
use crate::config::{ApiGeneration, ClientConfig};
use crate::rest::resources::{
    Dashboards, EventDefinitions, EventNotifications, IndexSets, Inputs, LdapSettingsClient,
    Outputs, Pipelines, Roles, StreamRules, Streams, Users,
};

/// Client for a single Graylog server.
///
/// Construction runs the [`VersionProbe`] exactly once, unless a generation
/// was forced with
/// [`ClientConfigBuilder::api_generation`](crate::ClientConfigBuilder::api_generation).
/// The resolved generation never changes afterwards.
///
/// # Thread Safety
///
/// `GraylogClient` is `Send + Sync` and cheap to clone. Concurrent calls on
/// one instance are safe; all state is read-only after construction.
///
/// # Example
///
/// ```rust,ignore
/// use graylog_api::{ApiToken, BaseUrl, ClientConfig, GraylogClient};
///
/// let config = ClientConfig::builder()
///     .base_url(BaseUrl::new("https://graylog.example.com/api")?)
///     .token(ApiToken::from_access_token("1a2b3c")?)
///     .debug_http_from_env()
///     .build()?;
///
/// let client = GraylogClient::connect(config).await;
/// println!("Graylog {}", client.generation());
///
/// for stream in client.streams().list().await? {
///     println!("{}: {}", stream.id.unwrap_or_default(), stream.title);
/// }
/// ```
#[derive(Clone, Debug)]
pub struct GraylogClient {
    http: HttpClient,
    generation: ApiGeneration,
    strategy: CreateStrategy,
}

// Verify GraylogClient is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<GraylogClient>();
};

impl GraylogClient {
    /// Connects using the built-in reqwest transport.
    ///
    /// Version detection is fail-open: an unreachable server yields a client
    /// for [`ApiGeneration::Gen5`].
    pub async fn connect(config: ClientConfig) -> Self {
        let transport = Arc::new(ReqwestTransport::new(config.timeout()));
        Self::with_transport(config, transport).await
    }

    /// As [`connect`](Self::connect), aborting version detection when
    /// `cancel` fires.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Cancelled`] if the token fires during detection.
    pub async fn connect_with_cancel(
        config: ClientConfig,
        cancel: &CancellationToken,
    ) -> Result<Self, ApiError> {
        let transport = Arc::new(ReqwestTransport::new(config.timeout()));
        Self::with_transport_and_cancel(config, transport, cancel).await
    }

    /// Connects using a custom transport.
    pub async fn with_transport(config: ClientConfig, transport: Arc<dyn Transport>) -> Self {
        let generation = match config.api_generation() {
            Some(forced) => forced,
            None => VersionProbe::new(&config, Arc::clone(&transport)).resolve().await,
        };
        Self::with_generation(&config, transport, generation)
    }

    /// Connects using a custom transport, aborting version detection when
    /// `cancel` fires.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Cancelled`] if the token fires during detection.
    pub async fn with_transport_and_cancel(
        config: ClientConfig,
        transport: Arc<dyn Transport>,
        cancel: &CancellationToken,
    ) -> Result<Self, ApiError> {
        let generation = match config.api_generation() {
            Some(forced) => forced,
            None => {
                VersionProbe::new(&config, Arc::clone(&transport))
                    .resolve_with_cancel(cancel)
                    .await?
            }
        };
        Ok(Self::with_generation(&config, transport, generation))
    }

    fn with_generation(
        config: &ClientConfig,
        transport: Arc<dyn Transport>,
        generation: ApiGeneration,
    ) -> Self {
        tracing::debug!(
            "Graylog client for {} using API {generation}",
            config.base_url()
        );
        Self {
            http: HttpClient::new(config, transport),
            generation,
            strategy: CreateStrategy::for_generation(generation),
        }
    }

    /// Returns the resolved server generation.
    #[must_use]
    pub const fn generation(&self) -> ApiGeneration {
        self.generation
    }

    /// Returns the create strategy selected for the server generation.
    #[must_use]
    pub const fn create_strategy(&self) -> CreateStrategy {
        self.strategy
    }

    /// Returns the request executor.
    #[must_use]
    pub const fn http(&self) -> &HttpClient {
        &self.http
    }

    /// Returns a payload negotiator sharing this client's executor.
    #[must_use]
    pub fn negotiator(&self) -> PayloadNegotiator {
        PayloadNegotiator::new(self.http.clone())
    }

    /// Applies the generation-specific `/api` prefix to `path`.
    #[must_use]
    pub fn prefixed(&self, path: &str) -> String {
        self.generation.prefixed(path)
    }

    /// Streams, their pause state and attached outputs.
    #[must_use]
    pub const fn streams(&self) -> Streams<'_> {
        Streams::new(self)
    }

    /// Stream routing rules.
    #[must_use]
    pub const fn stream_rules(&self) -> StreamRules<'_> {
        StreamRules::new(self)
    }

    /// Inputs and their extractors.
    #[must_use]
    pub const fn inputs(&self) -> Inputs<'_> {
        Inputs::new(self)
    }

    /// Index sets.
    #[must_use]
    pub const fn index_sets(&self) -> IndexSets<'_> {
        IndexSets::new(self)
    }

    /// Processing pipelines.
    #[must_use]
    pub const fn pipelines(&self) -> Pipelines<'_> {
        Pipelines::new(self)
    }

    /// Dashboards and classic dashboard widgets.
    #[must_use]
    pub const fn dashboards(&self) -> Dashboards<'_> {
        Dashboards::new(self)
    }

    /// Event definitions.
    #[must_use]
    pub const fn event_definitions(&self) -> EventDefinitions<'_> {
        EventDefinitions::new(self)
    }

    /// Event notifications.
    #[must_use]
    pub const fn event_notifications(&self) -> EventNotifications<'_> {
        EventNotifications::new(self)
    }

    /// Users.
    #[must_use]
    pub const fn users(&self) -> Users<'_> {
        Users::new(self)
    }

    /// Roles.
    #[must_use]
    pub const fn roles(&self) -> Roles<'_> {
        Roles::new(self)
    }

    /// Message outputs.
    #[must_use]
    pub const fn outputs(&self) -> Outputs<'_> {
        Outputs::new(self)
    }

    /// The LDAP settings singleton.
    #[must_use]
    pub const fn ldap_settings(&self) -> LdapSettingsClient<'_> {
        LdapSettingsClient::new(self)
    }
}
