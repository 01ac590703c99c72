//! Processing pipeline resource.

use serde::{Deserialize, Serialize};

use crate::client::GraylogClient;
use crate::clients::{ApiError, CandidateRequest, IdExtractor};
use crate::rest::{decode_lenient, segment};

const PIPELINES_PATH: &str = "/api/system/pipelines/pipeline";

/// A processing pipeline.
///
/// Stages and rule references live in `source`, in Graylog's pipeline
/// language:
///
/// ```text
/// pipeline "Tag errors"
/// stage 0 match either
/// rule "tag level"
/// end
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct Pipeline {
    /// The pipeline id. Read-only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// The pipeline title.
    pub title: String,

    /// Free-form description.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,

    /// Pipeline source.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub source: String,
}

/// Pipeline operations.
#[derive(Clone, Copy, Debug)]
pub struct Pipelines<'a> {
    client: &'a GraylogClient,
}

impl<'a> Pipelines<'a> {
    pub(crate) const fn new(client: &'a GraylogClient) -> Self {
        Self { client }
    }

    /// Creates a pipeline and returns it with its new id.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] if the request fails or the response carries no id.
    pub async fn create(&self, pipeline: &Pipeline) -> Result<Pipeline, ApiError> {
        let body = serde_json::to_value(Pipeline {
            id: None,
            ..pipeline.clone()
        })?;
        let id = self
            .client
            .negotiator()
            .create_with_negotiation(
                "create pipeline",
                vec![CandidateRequest::post(
                    "pipeline body",
                    PIPELINES_PATH,
                    body,
                    IdExtractor::new(),
                )?],
                None,
            )
            .await?;
        Ok(Pipeline {
            id: Some(id),
            ..pipeline.clone()
        })
    }

    /// Fetches a pipeline by id.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`] if the pipeline does not exist.
    pub async fn get(&self, id: &str) -> Result<Pipeline, ApiError> {
        self.client
            .http()
            .get(format!("{PIPELINES_PATH}/{}", segment(id)))
            .await?
            .decode("pipeline")
    }

    /// Updates a pipeline.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] if the request fails.
    pub async fn update(&self, id: &str, pipeline: &Pipeline) -> Result<Pipeline, ApiError> {
        let body = serde_json::to_value(Pipeline {
            id: None,
            ..pipeline.clone()
        })?;
        let response = self
            .client
            .http()
            .put(format!("{PIPELINES_PATH}/{}", segment(id)), body)
            .await?;
        match decode_lenient(&response) {
            Some(updated) => Ok(updated),
            None => self.get(id).await,
        }
    }

    /// Deletes a pipeline.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`] if the pipeline does not exist.
    pub async fn delete(&self, id: &str) -> Result<(), ApiError> {
        self.client
            .http()
            .delete(format!("{PIPELINES_PATH}/{}", segment(id)))
            .await?;
        Ok(())
    }
}
