//! Message output resource.
//!
//! Attaching outputs to streams lives on [`Streams`](super::Streams).

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::client::GraylogClient;
use crate::clients::{ApiError, CandidateRequest, IdExtractor};
use crate::rest::{decode_lenient, decode_list, segment};

const OUTPUTS_PATH: &str = "/api/system/outputs";

/// A message output, e.g. a GELF forwarder.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Output {
    /// The output id. Read-only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// The output title.
    pub title: String,

    /// Fully-qualified output class.
    #[serde(rename = "type")]
    pub output_type: String,

    /// Output-specific configuration.
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub configuration: Map<String, Value>,
}

/// Output operations.
#[derive(Clone, Copy, Debug)]
pub struct Outputs<'a> {
    client: &'a GraylogClient,
}

impl<'a> Outputs<'a> {
    pub(crate) const fn new(client: &'a GraylogClient) -> Self {
        Self { client }
    }

    /// Lists all outputs.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] if the request fails or the listing is malformed.
    pub async fn list(&self) -> Result<Vec<Output>, ApiError> {
        let response = self.client.http().get(OUTPUTS_PATH).await?;
        decode_list(&response, "outputs", "output list")
    }

    /// Creates an output and returns it with its new id.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] if the request fails or the response carries no id.
    pub async fn create(&self, output: &Output) -> Result<Output, ApiError> {
        let body = serde_json::to_value(Output {
            id: None,
            ..output.clone()
        })?;
        let id = self
            .client
            .negotiator()
            .create_with_negotiation(
                "create output",
                vec![CandidateRequest::post(
                    "output body",
                    OUTPUTS_PATH,
                    body,
                    IdExtractor::new().flat("output_id"),
                )?],
                None,
            )
            .await?;
        Ok(Output {
            id: Some(id),
            ..output.clone()
        })
    }

    /// Fetches an output by id.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`] if the output does not exist.
    pub async fn get(&self, id: &str) -> Result<Output, ApiError> {
        self.client
            .http()
            .get(format!("{OUTPUTS_PATH}/{}", segment(id)))
            .await?
            .decode("output")
    }

    /// Updates an output.
    ///
    /// Some releases answer with an empty body; the result then is `output`
    /// carrying `id`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] if the request fails.
    pub async fn update(&self, id: &str, output: &Output) -> Result<Output, ApiError> {
        let body = serde_json::to_value(Output {
            id: None,
            ..output.clone()
        })?;
        let response = self
            .client
            .http()
            .put(format!("{OUTPUTS_PATH}/{}", segment(id)), body)
            .await?;
        Ok(decode_lenient(&response)
            .filter(|updated: &Output| updated.id.as_deref().is_some_and(|v| !v.is_empty()))
            .unwrap_or_else(|| Output {
                id: Some(id.to_string()),
                ..output.clone()
            }))
    }

    /// Deletes an output.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`] if the output does not exist.
    pub async fn delete(&self, id: &str) -> Result<(), ApiError> {
        self.client
            .http()
            .delete(format!("{OUTPUTS_PATH}/{}", segment(id)))
            .await?;
        Ok(())
    }
}
