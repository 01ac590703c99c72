//! Graylog resource clients.
//!
//! This module contains thin, per-entity clients built on top of the
//! adaptive core in [`clients`](crate::clients). Each client borrows a
//! [`GraylogClient`](crate::GraylogClient), assembles version-appropriate
//! paths and bodies, and either decodes the response or delegates to the
//! [`PayloadNegotiator`](crate::clients::PayloadNegotiator).
//!
//! # Example
//!
//! ```rust,ignore
//! use graylog_api::rest::resources::Stream;
//!
//! let stream = Stream {
//!     title: "Errors".to_string(),
//!     index_set_id: "65a1...".to_string(),
//!     ..Default::default()
//! };
//! let created = client.streams().create(&stream).await?;
//! client.streams().resume(created.id.as_deref().unwrap_or_default()).await?;
//! ```

pub mod resources;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::clients::{ApiError, HttpResponse};

/// Percent-encodes a single path segment.
pub(crate) fn segment(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}

/// Decodes a listing that is either a bare array or an object wrapping the
/// array under `wrapper_key`.
///
/// # Errors
///
/// Returns [`ApiError::UnexpectedResponse`] for any other shape.
pub fn decode_list<T: DeserializeOwned>(
    response: &HttpResponse,
    wrapper_key: &str,
    context: &'static str,
) -> Result<Vec<T>, ApiError> {
    let unexpected = || ApiError::UnexpectedResponse {
        context,
        body: response.text(),
    };

    let items = match response.json_value().ok_or_else(unexpected)? {
        Value::Array(items) => Value::Array(items),
        Value::Object(mut object) => object
            .remove(wrapper_key)
            .filter(Value::is_array)
            .ok_or_else(unexpected)?,
        _ => return Err(unexpected()),
    };

    serde_json::from_value(items).map_err(|e| {
        tracing::debug!("Failed to decode {context}: {e}");
        unexpected()
    })
}

/// Decodes a response body, or returns `None` if it is empty or does not
/// match `T`.
///
/// Several Graylog releases answer writes with an empty body or a partial
/// object; callers fall back to re-reading the resource.
pub(crate) fn decode_lenient<T: DeserializeOwned>(response: &HttpResponse) -> Option<T> {
    if response.is_empty() {
        return None;
    }
    response.json().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use std::collections::HashMap;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Item {
        id: String,
    }

    fn response(body: &str) -> HttpResponse {
        HttpResponse::new(200, HashMap::new(), body.as_bytes().to_vec())
    }

    #[test]
    fn test_decode_list_wrapper() {
        let items: Vec<Item> =
            decode_list(&response(r#"{"total":1,"streams":[{"id":"a"}]}"#), "streams", "streams")
                .unwrap();
        assert_eq!(items, vec![Item { id: "a".to_string() }]);
    }

    #[test]
    fn test_decode_list_bare_array() {
        let items: Vec<Item> =
            decode_list(&response(r#"[{"id":"a"},{"id":"b"}]"#), "streams", "streams").unwrap();
        assert_eq!(items.len(), 2);
    }

    #[test]
    fn test_decode_list_rejects_other_shapes() {
        for body in [r#"{"items":[]}"#, r#"{"streams":{}}"#, "\"x\"", "nope"] {
            let result: Result<Vec<Item>, _> = decode_list(&response(body), "streams", "streams");
            assert!(
                matches!(result, Err(ApiError::UnexpectedResponse { context: "streams", .. })),
                "{body}"
            );
        }
    }

    #[test]
    fn test_decode_lenient() {
        assert_eq!(decode_lenient::<Item>(&response("")), None);
        assert_eq!(decode_lenient::<Item>(&response("{}")), None);
        assert_eq!(
            decode_lenient::<Item>(&response(r#"{"id":"a"}"#)),
            Some(Item { id: "a".to_string() })
        );
    }

    #[test]
    fn test_segment_encoding() {
        assert_eq!(segment("john doe"), "john%20doe");
        assert_eq!(segment("a/b"), "a%2Fb");
    }
}
