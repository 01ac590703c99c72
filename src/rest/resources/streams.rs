//! Stream resource.
//!
//! Streams route incoming messages into index sets. Creation is negotiated:
//! Graylog 7 expects a `{"entity": {...}}` envelope, earlier releases a flat
//! body with an embedded (empty) rule list.

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::client::GraylogClient;
use crate::clients::{ApiError, CandidateRequest, IdExtractor, ListFallback};
use crate::config::ApiGeneration;
use crate::rest::{decode_list, decode_lenient, segment};

const STREAMS_PATH: &str = "/api/streams";

/// Matching type applied when none is given.
pub const DEFAULT_MATCHING_TYPE: &str = "AND";

/// A Graylog stream.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct Stream {
    /// The stream id. Read-only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// The stream title.
    pub title: String,

    /// Free-form description.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,

    /// Whether the stream is paused.
    #[serde(default)]
    pub disabled: bool,

    /// Index set receiving the stream's messages.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub index_set_id: String,

    /// `AND` or `OR`; defaults to `AND`.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub matching_type: String,
}

impl Stream {
    fn effective_matching_type(&self) -> &str {
        if self.matching_type.is_empty() {
            DEFAULT_MATCHING_TYPE
        } else {
            &self.matching_type
        }
    }
}

/// Stream operations.
#[derive(Clone, Copy, Debug)]
pub struct Streams<'a> {
    client: &'a GraylogClient,
}

impl<'a> Streams<'a> {
    pub(crate) const fn new(client: &'a GraylogClient) -> Self {
        Self { client }
    }

    /// Creates a stream and returns it with its new id.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] if no candidate body produced an identifier.
    pub async fn create(&self, stream: &Stream) -> Result<Stream, ApiError> {
        let matching_type = stream.effective_matching_type();
        let entity = json!({
            "title": stream.title,
            "description": stream.description,
            "index_set_id": stream.index_set_id,
            "matching_type": matching_type,
        });
        let mut flat = entity.clone();
        flat["rules"] = json!([]);

        let extractor = IdExtractor::new().flat("stream_id").wrapped("stream");
        let candidates = self.client.create_strategy().order(
            CandidateRequest::post(
                "entity envelope",
                STREAMS_PATH,
                json!({ "entity": entity }),
                extractor.clone(),
            )?,
            CandidateRequest::post("flat body", STREAMS_PATH, flat, extractor)?,
        );
        let fallback = ListFallback::new(
            STREAMS_PATH,
            json!({"title": stream.title, "index_set_id": stream.index_set_id}),
        )
        .collection_key("streams");

        let id = self
            .client
            .negotiator()
            .create_with_negotiation("create stream", candidates, Some(&fallback))
            .await?;

        Ok(Stream {
            id: Some(id),
            matching_type: matching_type.to_string(),
            ..stream.clone()
        })
    }

    /// Fetches a stream by id.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`] if the stream does not exist.
    pub async fn get(&self, id: &str) -> Result<Stream, ApiError> {
        self.client
            .http()
            .get(format!("{STREAMS_PATH}/{}", segment(id)))
            .await?
            .decode("stream")
    }

    /// Lists all streams.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] if the request fails or the listing is malformed.
    pub async fn list(&self) -> Result<Vec<Stream>, ApiError> {
        let response = self.client.http().get(STREAMS_PATH).await?;
        decode_list(&response, "streams", "stream list")
    }

    /// Updates a stream.
    ///
    /// On Graylog 7 the update body cannot carry `disabled`; the paused state
    /// is applied through pause/resume and the stream is re-read.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] if the update or the state change fails.
    pub async fn update(&self, id: &str, stream: &Stream) -> Result<Stream, ApiError> {
        let path = format!("{STREAMS_PATH}/{}", segment(id));

        if self.client.generation() == ApiGeneration::Gen7 {
            let body = json!({
                "title": stream.title,
                "description": stream.description,
                "index_set_id": stream.index_set_id,
                "matching_type": stream.effective_matching_type(),
                "remove_matches_from_default_stream": false,
            });
            self.client.http().put(path, body).await?;
            if stream.disabled {
                self.pause(id).await?;
            } else {
                self.resume(id).await?;
            }
            return self.get(id).await;
        }

        let body = serde_json::to_value(Stream {
            matching_type: stream.effective_matching_type().to_string(),
            ..stream.clone()
        })?;
        let response = self.client.http().put(path, body).await?;
        match decode_lenient(&response) {
            Some(updated) => Ok(updated),
            None => self.get(id).await,
        }
    }

    /// Deletes a stream.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`] if the stream does not exist.
    pub async fn delete(&self, id: &str) -> Result<(), ApiError> {
        self.client
            .http()
            .delete(format!("{STREAMS_PATH}/{}", segment(id)))
            .await?;
        Ok(())
    }

    /// Pauses a stream.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] if the request fails.
    pub async fn pause(&self, id: &str) -> Result<(), ApiError> {
        self.client
            .http()
            .post_empty(format!("{STREAMS_PATH}/{}/pause", segment(id)))
            .await?;
        Ok(())
    }

    /// Resumes a paused stream.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] if the request fails.
    pub async fn resume(&self, id: &str) -> Result<(), ApiError> {
        self.client
            .http()
            .post_empty(format!("{STREAMS_PATH}/{}/resume", segment(id)))
            .await?;
        Ok(())
    }

    /// Attaches an output to a stream.
    ///
    /// Uses the `{"output_id": ...}` body first and falls back to the
    /// older per-output path.
    ///
    /// # Errors
    ///
    /// Returns the error of the fallback call if both forms fail.
    pub async fn attach_output(&self, stream_id: &str, output_id: &str) -> Result<(), ApiError> {
        let outputs = format!("{STREAMS_PATH}/{}/outputs", segment(stream_id));
        match self
            .client
            .http()
            .post(outputs.clone(), json!({ "output_id": output_id }))
            .await
        {
            Ok(_) => Ok(()),
            Err(ApiError::Cancelled) => Err(ApiError::Cancelled),
            Err(e) => {
                tracing::debug!("Attaching output {output_id} with a body failed: {e}");
                self.client
                    .http()
                    .post_empty(format!("{outputs}/{}", segment(output_id)))
                    .await?;
                Ok(())
            }
        }
    }

    /// Detaches an output from a stream.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] if the request fails.
    pub async fn detach_output(&self, stream_id: &str, output_id: &str) -> Result<(), ApiError> {
        self.client
            .http()
            .delete(format!(
                "{STREAMS_PATH}/{}/outputs/{}",
                segment(stream_id),
                segment(output_id)
            ))
            .await?;
        Ok(())
    }
}
