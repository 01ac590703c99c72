//! Stream rule resource.

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::client::GraylogClient;
use crate::clients::{ApiError, CandidateRequest, IdExtractor, ListFallback};
use crate::rest::{decode_list, segment};

/// A routing rule attached to a stream.
///
/// `rule_type` is Graylog's numeric rule kind (1 = exact match, 2 = greater
/// than, 3 = smaller than, 5 = field presence, ...).
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct StreamRule {
    /// The rule id. Read-only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// The message field the rule inspects.
    pub field: String,

    /// The numeric rule kind.
    #[serde(rename = "type")]
    pub rule_type: i32,

    /// The value compared against.
    #[serde(default)]
    pub value: String,

    /// Whether the match is negated.
    #[serde(default)]
    pub inverted: bool,

    /// Free-form description.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
}

/// Stream rule operations.
#[derive(Clone, Copy, Debug)]
pub struct StreamRules<'a> {
    client: &'a GraylogClient,
}

impl<'a> StreamRules<'a> {
    pub(crate) const fn new(client: &'a GraylogClient) -> Self {
        Self { client }
    }

    fn rules_path(stream_id: &str) -> String {
        format!("/api/streams/{}/rules", segment(stream_id))
    }

    /// Lists the rules of a stream.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] if the request fails or the listing is malformed.
    pub async fn list(&self, stream_id: &str) -> Result<Vec<StreamRule>, ApiError> {
        let response = self.client.http().get(Self::rules_path(stream_id)).await?;
        decode_list(&response, "stream_rules", "stream rule list")
    }

    /// Creates a rule and returns it with its new id.
    ///
    /// The id is read from `id`, `stream_rule_id`, `rule_id` or
    /// `stream_rule.id`. If none is present the rules are listed and the one
    /// matching field, type, value and inversion is used.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NegotiationExhausted`] if the rule was accepted
    /// but could not be identified.
    pub async fn create(&self, stream_id: &str, rule: &StreamRule) -> Result<StreamRule, ApiError> {
        let path = Self::rules_path(stream_id);
        let body = serde_json::to_value(StreamRule {
            id: None,
            ..rule.clone()
        })?;
        let extractor = IdExtractor::new()
            .flat("id")
            .flat("stream_rule_id")
            .flat("rule_id")
            .wrapped("stream_rule");
        let fallback = ListFallback::new(
            path.clone(),
            json!({
                "field": rule.field,
                "type": rule.rule_type,
                "value": rule.value,
                "inverted": rule.inverted,
            }),
        )
        .collection_key("stream_rules");

        let id = self
            .client
            .negotiator()
            .create_with_negotiation(
                "create stream rule",
                vec![CandidateRequest::post("rule body", path, body, extractor)?],
                Some(&fallback),
            )
            .await?;

        Ok(StreamRule {
            id: Some(id),
            ..rule.clone()
        })
    }

    /// Deletes a rule.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`] if the rule does not exist.
    pub async fn delete(&self, stream_id: &str, rule_id: &str) -> Result<(), ApiError> {
        self.client
            .http()
            .delete(format!("{}/{}", Self::rules_path(stream_id), segment(rule_id)))
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rule_type_uses_wire_name() {
        let rule = StreamRule {
            field: "source".to_string(),
            rule_type: 1,
            value: "web".to_string(),
            ..Default::default()
        };
        let value = serde_json::to_value(&rule).unwrap();
        assert_eq!(value["type"], 1);
        assert!(value.get("rule_type").is_none());
        assert!(value.get("id").is_none());
    }
}
