//! Event notification resource.
//!
//! The notification kind travels inside `config.type`, and servers reject
//! a config without it. Well-known kinds get their discriminator filled in;
//! anything else must carry one before the request is sent.

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::client::GraylogClient;
use crate::clients::{require_keys, ApiError, CandidateRequest, IdExtractor, ListFallback};
use crate::rest::{decode_lenient, decode_list, segment};

/// Config discriminator used for email notifications.
pub const EMAIL_CONFIG_TYPE: &str = "email-notification-v1";
/// Config discriminator used for HTTP notifications.
pub const HTTP_CONFIG_TYPE: &str = "http-notification-v1";

/// An event notification.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct EventNotification {
    /// The notification id. Read-only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// The notification title.
    pub title: String,

    /// Short kind, e.g. `email` or `http`. Derived from `config.type` on
    /// read when the server omits it.
    #[serde(default, rename = "type", skip_serializing_if = "String::is_empty")]
    pub notification_type: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,

    /// Kind-specific configuration; must contain `type`.
    #[serde(default)]
    pub config: Map<String, Value>,
}

impl EventNotification {
    /// Returns the config with a default discriminator for known kinds.
    fn effective_config(&self) -> Map<String, Value> {
        let mut config = self.config.clone();
        let default_type = match self.notification_type.as_str() {
            "email" => Some(EMAIL_CONFIG_TYPE),
            "http" => Some(HTTP_CONFIG_TYPE),
            _ => None,
        };
        if let Some(default_type) = default_type {
            config
                .entry("type")
                .or_insert_with(|| Value::String(default_type.to_string()));
        }
        config
    }

    fn normalized(mut self) -> Self {
        if self.notification_type.is_empty() {
            let is_email = self
                .config
                .get("type")
                .and_then(Value::as_str)
                .is_some_and(|t| t.to_ascii_lowercase().contains("email"));
            if is_email {
                self.notification_type = "email".to_string();
            }
        }
        self
    }

    fn flat_body(&self) -> Result<Value, serde_json::Error> {
        serde_json::to_value(Self {
            id: None,
            config: self.effective_config(),
            ..self.clone()
        })
    }
}

/// Event notification operations.
#[derive(Clone, Copy, Debug)]
pub struct EventNotifications<'a> {
    client: &'a GraylogClient,
}

impl<'a> EventNotifications<'a> {
    pub(crate) const fn new(client: &'a GraylogClient) -> Self {
        Self { client }
    }

    fn path(&self) -> String {
        self.client.prefixed("/events/notifications")
    }

    fn notification_path(&self, id: &str) -> String {
        format!("{}/{}", self.path(), segment(id))
    }

    /// Creates a notification and returns it with its new id.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidRequest`] without contacting the server if
    /// the title or `config.type` is missing, otherwise [`ApiError`] if no
    /// candidate produced an identifier.
    pub async fn create(
        &self,
        notification: &EventNotification,
    ) -> Result<EventNotification, ApiError> {
        let config = notification.effective_config();
        let entity = json!({
            "title": notification.title,
            "description": notification.description,
            "config": config,
        });
        require_keys("create event notification", &entity, &["title", "config.type"])?;

        let path = self.path();
        let candidates = self.client.create_strategy().order(
            CandidateRequest::post(
                "entity envelope",
                path.clone(),
                json!({ "entity": entity }),
                IdExtractor::new(),
            )?,
            CandidateRequest::post(
                "flat body",
                path.clone(),
                notification.flat_body()?,
                IdExtractor::new(),
            )?,
        );
        let fallback = ListFallback::new(path, json!({ "title": notification.title }))
            .collection_key("notifications");

        let id = self
            .client
            .negotiator()
            .create_with_negotiation("create event notification", candidates, Some(&fallback))
            .await?;
        Ok(EventNotification {
            id: Some(id),
            config,
            ..notification.clone()
        }
        .normalized())
    }

    /// Fetches a notification by id.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`] if the notification does not exist.
    pub async fn get(&self, id: &str) -> Result<EventNotification, ApiError> {
        let notification: EventNotification = self
            .client
            .http()
            .get(self.notification_path(id))
            .await?
            .decode("event notification")?;
        Ok(notification.normalized())
    }

    /// Lists all notifications.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] if the request fails or the listing is malformed.
    pub async fn list(&self) -> Result<Vec<EventNotification>, ApiError> {
        let response = self.client.http().get(self.path()).await?;
        let notifications: Vec<EventNotification> =
            decode_list(&response, "notifications", "event notification list")?;
        Ok(notifications
            .into_iter()
            .map(EventNotification::normalized)
            .collect())
    }

    /// Updates a notification.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidRequest`] if `config.type` is missing,
    /// otherwise [`ApiError`] if the request fails.
    pub async fn update(
        &self,
        id: &str,
        notification: &EventNotification,
    ) -> Result<EventNotification, ApiError> {
        let body = notification.flat_body()?;
        require_keys("update event notification", &body, &["title", "config.type"])?;
        let response = self.client.http().put(self.notification_path(id), body).await?;
        match decode_lenient::<EventNotification>(&response) {
            Some(updated) => Ok(updated.normalized()),
            None => self.get(id).await,
        }
    }

    /// Deletes a notification.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`] if the notification does not exist.
    pub async fn delete(&self, id: &str) -> Result<(), ApiError> {
        self.client.http().delete(self.notification_path(id)).await?;
        Ok(())
    }
}
