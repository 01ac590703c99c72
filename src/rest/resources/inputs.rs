//! Input resource and input extractors.
//!
//! Extractor payloads differ between releases and are passed through as
//! free-form JSON objects.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::client::GraylogClient;
use crate::clients::{ApiError, CandidateRequest, IdExtractor};
use crate::rest::{decode_lenient, decode_list, segment};

const INPUTS_PATH: &str = "/api/system/inputs";

/// A message input.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Input {
    /// The input id. Read-only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// The input title.
    pub title: String,

    /// Fully-qualified input class, e.g. `org.graylog2.inputs.gelf.udp.GELFUDPInput`.
    #[serde(rename = "type")]
    pub input_type: String,

    /// Whether the input runs on every node.
    #[serde(default)]
    pub global: bool,

    /// Node id for non-global inputs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node: Option<String>,

    /// Input-specific configuration.
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub configuration: Map<String, Value>,
}

/// Input and extractor operations.
#[derive(Clone, Copy, Debug)]
pub struct Inputs<'a> {
    client: &'a GraylogClient,
}

impl<'a> Inputs<'a> {
    pub(crate) const fn new(client: &'a GraylogClient) -> Self {
        Self { client }
    }

    /// Creates an input and returns it with its new id.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] if the request fails or the response carries no id.
    pub async fn create(&self, input: &Input) -> Result<Input, ApiError> {
        let body = serde_json::to_value(Input {
            id: None,
            ..input.clone()
        })?;
        let id = self
            .client
            .negotiator()
            .create_with_negotiation(
                "create input",
                vec![CandidateRequest::post(
                    "input body",
                    INPUTS_PATH,
                    body,
                    IdExtractor::new().flat("input_id"),
                )?],
                None,
            )
            .await?;
        Ok(Input {
            id: Some(id),
            ..input.clone()
        })
    }

    /// Fetches an input by id.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`] if the input does not exist.
    pub async fn get(&self, id: &str) -> Result<Input, ApiError> {
        self.client
            .http()
            .get(format!("{INPUTS_PATH}/{}", segment(id)))
            .await?
            .decode("input")
    }

    /// Updates an input.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] if the request fails.
    pub async fn update(&self, id: &str, input: &Input) -> Result<Input, ApiError> {
        let body = serde_json::to_value(Input {
            id: None,
            ..input.clone()
        })?;
        let response = self
            .client
            .http()
            .put(format!("{INPUTS_PATH}/{}", segment(id)), body)
            .await?;
        Ok(decode_lenient(&response)
            .filter(|updated: &Input| !updated.title.is_empty())
            .unwrap_or_else(|| Input {
                id: Some(id.to_string()),
                ..input.clone()
            }))
    }

    /// Deletes an input.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`] if the input does not exist.
    pub async fn delete(&self, id: &str) -> Result<(), ApiError> {
        self.client
            .http()
            .delete(format!("{INPUTS_PATH}/{}", segment(id)))
            .await?;
        Ok(())
    }

    fn extractors_path(&self, input_id: &str) -> String {
        self.client
            .prefixed(&format!("/system/inputs/{}/extractors", segment(input_id)))
    }

    /// Lists the extractors of an input.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] if the request fails or the listing is malformed.
    pub async fn list_extractors(
        &self,
        input_id: &str,
    ) -> Result<Vec<Map<String, Value>>, ApiError> {
        let response = self
            .client
            .http()
            .get(format!("{INPUTS_PATH}/{}/extractors", segment(input_id)))
            .await?;
        decode_list(&response, "extractors", "extractor list")
    }

    /// Creates an extractor and returns the server's answer.
    ///
    /// Graylog answers with `{"extractor_id": ...}` or the full extractor
    /// depending on the release; an empty answer yields an empty map.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] if the request fails.
    pub async fn create_extractor(
        &self,
        input_id: &str,
        extractor: Map<String, Value>,
    ) -> Result<Map<String, Value>, ApiError> {
        let response = self
            .client
            .http()
            .post(self.extractors_path(input_id), Value::Object(extractor))
            .await?;
        Ok(decode_lenient(&response).unwrap_or_default())
    }

    /// Deletes an extractor.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`] if the extractor does not exist.
    pub async fn delete_extractor(
        &self,
        input_id: &str,
        extractor_id: &str,
    ) -> Result<(), ApiError> {
        self.client
            .http()
            .delete(format!(
                "{}/{}",
                self.extractors_path(input_id),
                segment(extractor_id)
            ))
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_input_round_trips_configuration() {
        let input: Input = serde_json::from_value(json!({
            "id": "i1",
            "title": "gelf",
            "type": "org.graylog2.inputs.gelf.udp.GELFUDPInput",
            "global": true,
            "configuration": {"port": 12201, "bind_address": "0.0.0.0"}
        }))
        .unwrap();
        assert_eq!(input.input_type, "org.graylog2.inputs.gelf.udp.GELFUDPInput");
        assert_eq!(input.configuration["port"], 12201);
        assert!(input.node.is_none());
    }
}
