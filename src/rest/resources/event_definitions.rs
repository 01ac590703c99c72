//! Event definition (alert) resource.
//!
//! Graylog 5 rejects definitions without `key_spec` and
//! `notification_settings`, and expects notification objects rather than
//! ids; both are filled in for every release.

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::client::GraylogClient;
use crate::clients::{ApiError, CandidateRequest, IdExtractor, ListFallback};
use crate::config::ApiGeneration;
use crate::rest::{decode_lenient, decode_list, segment};

const DEFINITIONS_PATH: &str = "/api/events/definitions";

/// An event definition.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct EventDefinition {
    /// The definition id. Read-only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// The definition title.
    pub title: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,

    /// Priority, 1 (low) to 3 (high).
    #[serde(default)]
    pub priority: i32,

    /// Whether matching events are alerts.
    #[serde(default)]
    pub alert: bool,

    /// Condition configuration, including its `type`.
    #[serde(default)]
    pub config: Map<String, Value>,

    /// Notifications to trigger.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub notification_ids: Vec<String>,

    /// Event key fields.
    #[serde(default)]
    pub key_spec: Vec<String>,

    /// Grace period and backlog settings.
    #[serde(default)]
    pub notification_settings: Map<String, Value>,
}

impl EventDefinition {
    fn effective_notification_settings(&self) -> Value {
        if self.notification_settings.is_empty() {
            json!({"grace_period_ms": 0, "backlog_size": 0})
        } else {
            Value::Object(self.notification_settings.clone())
        }
    }

    fn request_body(&self, generation: ApiGeneration) -> Result<Value, serde_json::Error> {
        if generation == ApiGeneration::Gen5 {
            return Ok(json!({
                "title": self.title,
                "description": self.description,
                "priority": self.priority,
                "alert": self.alert,
                "config": self.config,
                "notifications": [],
                "notification_settings": self.effective_notification_settings(),
                "key_spec": self.key_spec,
            }));
        }
        let mut body = serde_json::to_value(Self {
            id: None,
            ..self.clone()
        })?;
        body["notification_settings"] = self.effective_notification_settings();
        Ok(body)
    }
}

/// Event definition operations.
#[derive(Clone, Copy, Debug)]
pub struct EventDefinitions<'a> {
    client: &'a GraylogClient,
}

impl<'a> EventDefinitions<'a> {
    pub(crate) const fn new(client: &'a GraylogClient) -> Self {
        Self { client }
    }

    /// Lists all event definitions.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] if the request fails or the listing is malformed.
    pub async fn list(&self) -> Result<Vec<EventDefinition>, ApiError> {
        let response = self.client.http().get(DEFINITIONS_PATH).await?;
        decode_list(&response, "event_definitions", "event definition list")
    }

    /// Creates an event definition and returns it with its new id.
    ///
    /// Both the entity envelope and the flat body are tried, in the order of
    /// the client's [`CreateStrategy`](crate::clients::CreateStrategy).
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] if no candidate produced an identifier.
    pub async fn create(&self, definition: &EventDefinition) -> Result<EventDefinition, ApiError> {
        let body = definition.request_body(self.client.generation())?;
        let candidates = self.client.create_strategy().order(
            CandidateRequest::post(
                "entity envelope",
                DEFINITIONS_PATH,
                json!({ "entity": body }),
                IdExtractor::new(),
            )?,
            CandidateRequest::post("flat body", DEFINITIONS_PATH, body, IdExtractor::new())?,
        );
        let fallback = ListFallback::new(DEFINITIONS_PATH, json!({ "title": definition.title }))
            .collection_key("event_definitions");

        let id = self
            .client
            .negotiator()
            .create_with_negotiation("create event definition", candidates, Some(&fallback))
            .await?;
        Ok(EventDefinition {
            id: Some(id),
            ..definition.clone()
        })
    }

    /// Fetches an event definition by id.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`] if the definition does not exist.
    pub async fn get(&self, id: &str) -> Result<EventDefinition, ApiError> {
        self.client
            .http()
            .get(format!("{DEFINITIONS_PATH}/{}", segment(id)))
            .await?
            .decode("event definition")
    }

    /// Updates an event definition.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] if the request fails.
    pub async fn update(
        &self,
        id: &str,
        definition: &EventDefinition,
    ) -> Result<EventDefinition, ApiError> {
        let mut body = definition.request_body(self.client.generation())?;
        body["id"] = Value::String(id.to_string());
        let response = self
            .client
            .http()
            .put(format!("{DEFINITIONS_PATH}/{}", segment(id)), body)
            .await?;
        match decode_lenient(&response) {
            Some(updated) => Ok(updated),
            None => self.get(id).await,
        }
    }

    /// Deletes an event definition.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`] if the definition does not exist.
    pub async fn delete(&self, id: &str) -> Result<(), ApiError> {
        self.client
            .http()
            .delete(format!("{DEFINITIONS_PATH}/{}", segment(id)))
            .await?;
        Ok(())
    }
}
