//! Integration tests for the resource clients.
//!
//! Each test pins one generation-specific behaviour: path prefixes, body
//! shapes, follow-up calls and response-shape tolerance.

mod common;

use graylog_api::clients::{ApiError, InvalidHttpRequestError};
use graylog_api::rest::resources::{
    EventNotification, IndexSet, LdapSettings, Output, Pipeline, Role, Stream, User,
};
use graylog_api::ApiGeneration;
use serde_json::{json, Value};
use wiremock::matchers::{body_json, body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ============================================================================
// Streams
// ============================================================================

#[tokio::test]
async fn test_gen7_stream_update_pauses_and_rereads() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/api/streams/s1"))
        .and(body_partial_json(json!({"remove_matches_from_default_stream": false})))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/streams/s1/pause"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/streams/s1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "s1", "title": "errors", "disabled": true, "matching_type": "AND"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = common::client(&server.uri(), ApiGeneration::Gen7).await;
    let stream = Stream {
        title: "errors".to_string(),
        disabled: true,
        ..Default::default()
    };
    let updated = client.streams().update("s1", &stream).await.unwrap();

    assert!(updated.disabled);
    let put = &server.received_requests().await.unwrap()[0];
    let body: Value = serde_json::from_slice(&put.body).unwrap();
    assert!(body.get("disabled").is_none());
}

#[tokio::test]
async fn test_attach_output_falls_back_to_path_form() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/streams/s1/outputs"))
        .and(body_json(json!({"output_id": "o1"})))
        .respond_with(ResponseTemplate::new(400))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/streams/s1/outputs/o1"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let client = common::client(&server.uri(), ApiGeneration::Gen6).await;
    client.streams().attach_output("s1", "o1").await.unwrap();
}

#[tokio::test]
async fn test_get_missing_stream_is_not_found() {
    let server = MockServer::start().await;
    let client = common::client(&server.uri(), ApiGeneration::Gen6).await;

    let error = client.streams().get("nope").await.unwrap_err();

    assert!(matches!(error, ApiError::NotFound));
}

// ============================================================================
// Index sets
// ============================================================================

#[tokio::test]
async fn test_index_set_listing_accepts_both_shapes() {
    for body in [
        json!({"index_sets": [{"id": "a", "title": "Default", "default": true}], "total": 1}),
        json!([{"id": "a", "title": "Default", "default": true}]),
    ] {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/system/indices/index_sets"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&server)
            .await;

        let client = common::client(&server.uri(), ApiGeneration::Gen5).await;
        let sets = client.index_sets().list().await.unwrap();

        assert_eq!(sets.len(), 1);
        assert_eq!(sets[0].id.as_deref(), Some("a"));
        assert!(sets[0].writable);
    }
}

#[tokio::test]
async fn test_index_set_listing_rejects_other_shapes() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/system/indices/index_sets"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"unexpected": true})))
        .mount(&server)
        .await;

    let client = common::client(&server.uri(), ApiGeneration::Gen5).await;
    let error = client.index_sets().list().await.unwrap_err();

    assert!(matches!(error, ApiError::UnexpectedResponse { .. }));
}

#[tokio::test]
async fn test_index_set_create_sends_defaults() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/system/indices/index_sets"))
        .and(body_partial_json(json!({
            "title": "logs",
            "shards": 1,
            "index_analyzer": "standard",
            "retention_strategy": {"max_number_of_indices": 20}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "is1", "title": "logs", "index_prefix": "logs", "shards": 1
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = common::client(&server.uri(), ApiGeneration::Gen6).await;
    let index_set = IndexSet {
        title: "logs".to_string(),
        index_prefix: "logs".to_string(),
        ..Default::default()
    };
    let created = client.index_sets().create(&index_set).await.unwrap();

    assert_eq!(created.id.as_deref(), Some("is1"));
}

// ============================================================================
// Event notifications
// ============================================================================

#[tokio::test]
async fn test_notification_without_config_type_is_rejected_locally() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let client = common::client(&server.uri(), ApiGeneration::Gen7).await;
    let notification = EventNotification {
        title: "chat".to_string(),
        notification_type: "slack".to_string(),
        ..Default::default()
    };
    let error = client
        .event_notifications()
        .create(&notification)
        .await
        .unwrap_err();

    assert!(matches!(
        error,
        ApiError::InvalidRequest(InvalidHttpRequestError::MissingRequiredKey { ref key, .. })
            if key == "config.type"
    ));
}

#[tokio::test]
async fn test_gen7_email_notification_uses_envelope_with_default_type() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/events/notifications"))
        .and(body_partial_json(json!({
            "entity": {"title": "mail", "config": {"type": "email-notification-v1"}}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "n1", "title": "mail", "config": {"type": "email-notification-v1"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = common::client(&server.uri(), ApiGeneration::Gen7).await;
    let notification = EventNotification {
        title: "mail".to_string(),
        notification_type: "email".to_string(),
        ..Default::default()
    };
    let created = client.event_notifications().create(&notification).await.unwrap();

    assert_eq!(created.id.as_deref(), Some("n1"));
    assert_eq!(created.notification_type, "email");
}

#[tokio::test]
async fn test_gen5_notifications_live_at_server_root() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/events/notifications"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "notifications": [{"id": "n1", "title": "mail", "config": {"type": "email-notification-v1"}}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = common::client(&server.uri(), ApiGeneration::Gen5).await;
    let notifications = client.event_notifications().list().await.unwrap();

    assert_eq!(notifications.len(), 1);
    assert_eq!(notifications[0].notification_type, "email");
}

// ============================================================================
// Dashboards
// ============================================================================

#[tokio::test]
async fn test_gen7_dashboard_list_filters_views() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/views"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"views": [
            {"id": "v1", "type": "DASHBOARD", "title": "Ops", "summary": "overview"},
            {"id": "v2", "type": "SEARCH", "title": "Saved search"},
            {"id": "v3", "type": "dashboard", "title": "Dev"}
        ]})))
        .mount(&server)
        .await;

    let client = common::client(&server.uri(), ApiGeneration::Gen7).await;
    let dashboards = client.dashboards().list().await.unwrap();

    let ids: Vec<_> = dashboards.iter().filter_map(|d| d.id.as_deref()).collect();
    assert_eq!(ids, vec!["v1", "v3"]);
    assert_eq!(dashboards[0].description, "overview");
}

#[tokio::test]
async fn test_gen5_widgets_use_unprefixed_path() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/dashboards/d1/widgets/w1"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let client = common::client(&server.uri(), ApiGeneration::Gen5).await;
    client.dashboards().delete_widget("d1", "w1").await.unwrap();
}

// ============================================================================
// Users
// ============================================================================

#[tokio::test]
async fn test_legacy_user_update_changes_password_separately() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/api/users/ada"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/api/users/ada/password"))
        .and(body_json(json!({"password": "n3w"})))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/users/ada"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "u1", "username": "ada", "email": "ada@example.com"
        })))
        .mount(&server)
        .await;

    let client = common::client(&server.uri(), ApiGeneration::Gen6).await;
    let user = User {
        username: "ada".to_string(),
        email: "ada@example.com".to_string(),
        password: "n3w".to_string(),
        ..Default::default()
    };
    let updated = client.users().update("ada", &user).await.unwrap();

    assert!(updated.password.is_empty());
    let requests = server.received_requests().await.unwrap();
    let first_put: Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert!(first_put.get("password").is_none());
}

#[tokio::test]
async fn test_gen7_user_update_targets_object_id() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/users/ada"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "u1", "username": "ada", "disabled": true
        })))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/api/users/u1"))
        .and(body_json(json!({"fullName": "Ada Lovelace", "disabled": true})))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/users/u1/disable"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let client = common::client(&server.uri(), ApiGeneration::Gen7).await;
    let user = User {
        username: "ada".to_string(),
        full_name: "Ada Lovelace".to_string(),
        disabled: true,
        ..Default::default()
    };
    let updated = client.users().update("ada", &user).await.unwrap();

    assert!(updated.disabled);
}

#[tokio::test]
async fn test_user_create_rereads_when_body_is_empty() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/users"))
        .and(body_partial_json(json!({"first_name": "Ada", "last_name": "Lovelace"})))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/users/ada"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "u1", "username": "ada", "full_name": "Ada Lovelace"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = common::client(&server.uri(), ApiGeneration::Gen5).await;
    let user = User {
        username: "ada".to_string(),
        full_name: "Ada Lovelace".to_string(),
        password: "s3cret".to_string(),
        ..Default::default()
    };
    let created = client.users().create(&user).await.unwrap();

    assert_eq!(created.id.as_deref(), Some("u1"));
    assert!(created.password.is_empty());
}

// ============================================================================
// Pipelines
// ============================================================================

#[tokio::test]
async fn test_pipeline_create_and_update_reread() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/system/pipelines/pipeline"))
        .and(body_partial_json(json!({"title": "tagging"})))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"id": "p1", "title": "tagging"})),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/api/system/pipelines/pipeline/p1"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/system/pipelines/pipeline/p1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "p1", "title": "tagging", "source": "pipeline \"tagging\"\nend"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = common::client(&server.uri(), ApiGeneration::Gen6).await;
    let pipeline = Pipeline {
        title: "tagging".to_string(),
        source: "pipeline \"tagging\"\nend".to_string(),
        ..Default::default()
    };
    let created = client.pipelines().create(&pipeline).await.unwrap();
    assert_eq!(created.id.as_deref(), Some("p1"));

    let updated = client.pipelines().update("p1", &created).await.unwrap();
    assert_eq!(updated.id.as_deref(), Some("p1"));
    assert_eq!(updated.source, pipeline.source);
}

// ============================================================================
// Roles, outputs and LDAP
// ============================================================================

#[tokio::test]
async fn test_role_create_echoes_input_on_empty_answer() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/roles"))
        .respond_with(ResponseTemplate::new(201))
        .mount(&server)
        .await;

    let client = common::client(&server.uri(), ApiGeneration::Gen6).await;
    let role = Role {
        name: "reader".to_string(),
        permissions: vec!["streams:read".to_string()],
        ..Default::default()
    };

    assert_eq!(client.roles().create(&role).await.unwrap(), role);
}

#[tokio::test]
async fn test_output_update_keeps_id_on_empty_answer() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/api/system/outputs/o1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&server)
        .await;

    let client = common::client(&server.uri(), ApiGeneration::Gen7).await;
    let output = Output {
        title: "forwarder".to_string(),
        output_type: "org.graylog2.outputs.GelfOutput".to_string(),
        ..Default::default()
    };
    let updated = client.outputs().update("o1", &output).await.unwrap();

    assert_eq!(updated.id.as_deref(), Some("o1"));
    assert_eq!(updated.title, "forwarder");
}

#[tokio::test]
async fn test_ldap_settings_path_depends_on_generation() {
    for (generation, expected_path) in [
        (ApiGeneration::Gen5, "/system/ldap/settings"),
        (ApiGeneration::Gen6, "/api/system/ldap/settings"),
    ] {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(expected_path))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "enabled": true, "ldap_uri": "ldap://ldap:389"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = common::client(&server.uri(), generation).await;
        let settings: LdapSettings = client.ldap_settings().get().await.unwrap();

        assert!(settings.enabled);
        assert_eq!(settings.ldap_uri, "ldap://ldap:389");
    }
}
