//! Index set resource.
//!
//! Index set writes always send a complete snake_case body with rotation and
//! retention settings filled in, since several releases reject partial ones.

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::client::GraylogClient;
use crate::clients::ApiError;
use crate::rest::{decode_lenient, decode_list, segment};

const INDEX_SETS_PATH: &str = "/api/system/indices/index_sets";

/// Analyzer used when none is given.
pub const DEFAULT_INDEX_ANALYZER: &str = "standard";
/// Field type refresh interval (ms) used when none is given.
pub const DEFAULT_FIELD_TYPE_REFRESH_INTERVAL: u64 = 5000;
/// Rotation strategy used when none is given.
pub const DEFAULT_ROTATION_STRATEGY_CLASS: &str =
    "org.graylog2.indexer.rotation.strategies.MessageCountRotationStrategy";
/// Retention strategy used when none is given.
pub const DEFAULT_RETENTION_STRATEGY_CLASS: &str =
    "org.graylog2.indexer.retention.strategies.DeletionRetentionStrategy";

/// An index set.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct IndexSet {
    /// The index set id. Read-only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Display title.
    pub title: String,

    /// Free-form description.
    #[serde(default)]
    pub description: String,

    /// Prefix of the backing indices.
    #[serde(default)]
    pub index_prefix: String,

    /// Shards per index; at least 1 is sent.
    #[serde(default)]
    pub shards: u32,

    /// Replicas per index.
    #[serde(default)]
    pub replicas: u32,

    /// Rotation strategy class.
    #[serde(default)]
    pub rotation_strategy_class: String,

    /// Rotation strategy configuration.
    #[serde(default, rename = "rotation_strategy")]
    pub rotation_strategy_config: Map<String, Value>,

    /// Retention strategy class.
    #[serde(default)]
    pub retention_strategy_class: String,

    /// Retention strategy configuration.
    #[serde(default, rename = "retention_strategy")]
    pub retention_strategy_config: Map<String, Value>,

    /// Index analyzer.
    #[serde(default)]
    pub index_analyzer: String,

    /// Field type refresh interval in milliseconds.
    #[serde(default)]
    pub field_type_refresh_interval: u64,

    /// Whether this is the default index set.
    #[serde(default)]
    pub default: bool,

    /// Maximum segments after optimization.
    #[serde(default)]
    pub index_optimization_max_num_segments: u32,

    /// Whether index optimization is disabled.
    #[serde(default)]
    pub index_optimization_disabled: bool,

    /// Whether the index set accepts writes.
    #[serde(default = "writable_by_default")]
    pub writable: bool,
}

const fn writable_by_default() -> bool {
    true
}

impl IndexSet {
    /// Builds the full write body, filling in defaults.
    fn request_body(&self, id: Option<&str>) -> Value {
        let rotation_class =
            non_empty_or(&self.rotation_strategy_class, DEFAULT_ROTATION_STRATEGY_CLASS);
        let rotation = if self.rotation_strategy_config.is_empty() {
            json!({
                "type": "org.graylog2.indexer.rotation.strategies.MessageCountRotationStrategyConfig",
                "max_docs_per_index": 20_000_000,
            })
        } else {
            Value::Object(self.rotation_strategy_config.clone())
        };
        let retention_class =
            non_empty_or(&self.retention_strategy_class, DEFAULT_RETENTION_STRATEGY_CLASS);
        let retention = if self.retention_strategy_config.is_empty() {
            json!({
                "type": "org.graylog2.indexer.retention.strategies.DeletionRetentionStrategyConfig",
                "max_number_of_indices": 20,
            })
        } else {
            Value::Object(self.retention_strategy_config.clone())
        };

        let refresh_interval = if self.field_type_refresh_interval == 0 {
            DEFAULT_FIELD_TYPE_REFRESH_INTERVAL
        } else {
            self.field_type_refresh_interval
        };

        let mut body = json!({
            "title": self.title,
            "description": self.description,
            "index_prefix": self.index_prefix,
            "shards": self.shards.max(1),
            "replicas": self.replicas,
            "index_analyzer": non_empty_or(&self.index_analyzer, DEFAULT_INDEX_ANALYZER),
            "field_type_refresh_interval": refresh_interval,
            "index_optimization_max_num_segments": self.index_optimization_max_num_segments.max(1),
            "index_optimization_disabled": self.index_optimization_disabled,
            "writable": self.writable,
            "creation_date": Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            "rotation_strategy_class": rotation_class,
            "rotation_strategy": rotation,
            "retention_strategy_class": retention_class,
            "retention_strategy": retention,
        });
        if self.default {
            body["default"] = Value::Bool(true);
        }
        if let Some(id) = id {
            body["id"] = Value::String(id.to_string());
        }
        body
    }
}

fn non_empty_or<'a>(value: &'a str, fallback: &'a str) -> &'a str {
    if value.is_empty() {
        fallback
    } else {
        value
    }
}

/// Index set operations.
#[derive(Clone, Copy, Debug)]
pub struct IndexSets<'a> {
    client: &'a GraylogClient,
}

impl<'a> IndexSets<'a> {
    pub(crate) const fn new(client: &'a GraylogClient) -> Self {
        Self { client }
    }

    /// Lists all index sets.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] if the request fails or the listing is malformed.
    pub async fn list(&self) -> Result<Vec<IndexSet>, ApiError> {
        let response = self.client.http().get(INDEX_SETS_PATH).await?;
        decode_list(&response, "index_sets", "index set list")
    }

    /// Returns the default index set, else the first writable one.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`] if there is no candidate.
    pub async fn default_index_set(&self) -> Result<IndexSet, ApiError> {
        let sets = self.list().await?;
        let default = sets.iter().position(|set| set.default);
        let writable = sets.iter().position(|set| set.writable);
        default
            .or(writable)
            .and_then(|index| sets.into_iter().nth(index))
            .ok_or(ApiError::NotFound)
    }

    /// Creates an index set.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] if the request fails.
    pub async fn create(&self, index_set: &IndexSet) -> Result<IndexSet, ApiError> {
        let response = self
            .client
            .http()
            .post(INDEX_SETS_PATH, index_set.request_body(None))
            .await?;
        response.decode("index set")
    }

    /// Fetches an index set by id.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`] if the index set does not exist.
    pub async fn get(&self, id: &str) -> Result<IndexSet, ApiError> {
        self.client
            .http()
            .get(format!("{INDEX_SETS_PATH}/{}", segment(id)))
            .await?
            .decode("index set")
    }

    /// Updates an index set.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] if the request fails.
    pub async fn update(&self, id: &str, index_set: &IndexSet) -> Result<IndexSet, ApiError> {
        let response = self
            .client
            .http()
            .put(
                format!("{INDEX_SETS_PATH}/{}", segment(id)),
                index_set.request_body(Some(id)),
            )
            .await?;
        match decode_lenient(&response) {
            Some(updated) => Ok(updated),
            None => self.get(id).await,
        }
    }

    /// Deletes an index set.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`] if the index set does not exist.
    pub async fn delete(&self, id: &str) -> Result<(), ApiError> {
        self.client
            .http()
            .delete(format!("{INDEX_SETS_PATH}/{}", segment(id)))
            .await?;
        Ok(())
    }
}
