//! Integration tests for the call-intake relay client
//!
//! Tests HTTP client behavior using wiremock for request/response mocking.

use serde_json::json;
use wiremock::{
    matchers::{body_json, method, path},
    Mock, MockServer, ResponseTemplate,
};

use rex_claims::config::{RelayConfig, RequestConfig};
use rex_claims::error::RelayError;
use rex_claims::relay::{CallRelay, CallSubmission, HttpCallRelay};

/// Create a relay client pointing at the mock server
fn create_test_relay(base_url: &str) -> HttpCallRelay {
    let config = RelayConfig {
        base_url: base_url.to_string(),
    };
    let request_config = RequestConfig { timeout_ms: 5000 };
    HttpCallRelay::new(&config, &request_config).expect("Failed to create relay")
}

fn sample_submission() -> CallSubmission {
    CallSubmission {
        user_id: "user_1724_abc".to_string(),
        phone: "+1 555 0100".to_string(),
        topic: "billing question".to_string(),
    }
}

mod submit_tests {
    use super::*;

    #[tokio::test]
    async fn test_successful_submit_returns_request_id() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/rexy/calls"))
            .and(body_json(json!({
                "userId": "user_1724_abc",
                "phone": "+1 555 0100",
                "topic": "billing question"
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "ok": true,
                "endpoint": "/api/rexy/calls",
                "requestId": "req-789"
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let relay = create_test_relay(&mock_server.uri());
        let receipt = relay.submit(&sample_submission()).await.unwrap();
        assert_eq!(receipt.request_id, "req-789");
    }

    #[tokio::test]
    async fn test_submit_400_is_api_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/rexy/calls"))
            .respond_with(
                ResponseTemplate::new(400).set_body_json(json!({ "error": "Invalid JSON body." })),
            )
            .expect(1)
            .mount(&mock_server)
            .await;

        let relay = create_test_relay(&mock_server.uri());
        let err = relay.submit(&sample_submission()).await.unwrap_err();
        assert!(matches!(err, RelayError::Api { status: 400, .. }));
    }

    #[tokio::test]
    async fn test_submit_malformed_body_is_invalid_response() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/rexy/calls"))
            .respond_with(ResponseTemplate::new(201).set_body_string("not json at all"))
            .expect(1)
            .mount(&mock_server)
            .await;

        let relay = create_test_relay(&mock_server.uri());
        let err = relay.submit(&sample_submission()).await.unwrap_err();
        assert!(matches!(err, RelayError::InvalidResponse { .. }));
    }

    #[tokio::test]
    async fn test_submit_missing_request_id_is_invalid_response() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/rexy/calls"))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "ok": true,
                "endpoint": "/api/rexy/calls"
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let relay = create_test_relay(&mock_server.uri());
        let err = relay.submit(&sample_submission()).await.unwrap_err();
        assert!(matches!(err, RelayError::InvalidResponse { .. }));
    }

    #[tokio::test]
    async fn test_submit_network_error() {
        // No server listening on this port
        let relay = create_test_relay("http://127.0.0.1:9");
        let err = relay.submit(&sample_submission()).await.unwrap_err();
        assert!(matches!(err, RelayError::Http(_) | RelayError::Timeout { .. }));
    }
}

mod health_tests {
    use super::*;

    #[tokio::test]
    async fn test_health_ok() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/health"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "ok": true,
                "service": "rexy-call-intake"
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let relay = create_test_relay(&mock_server.uri());
        let health = relay.health().await.unwrap();
        assert!(health.ok);
        assert_eq!(health.service, "rexy-call-intake");
    }
}

mod list_tests {
    use super::*;

    #[tokio::test]
    async fn test_list_call_requests() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/call-requests"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "items": [
                    {
                        "requestId": "req-1",
                        "userId": "user_1_a",
                        "phone": "+1 555 0100",
                        "topic": "billing",
                        "status": "queued",
                        "createdAt": "2026-08-30T12:00:00Z"
                    },
                    {
                        "requestId": "req-2",
                        "userId": null,
                        "phone": null,
                        "topic": null,
                        "status": "queued",
                        "createdAt": "2026-08-30T12:05:00Z"
                    }
                ]
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let relay = create_test_relay(&mock_server.uri());
        let items = relay.list_call_requests().await.unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].request_id, "req-1");
        assert_eq!(items[0].topic.as_deref(), Some("billing"));
        assert!(items[1].user_id.is_none(), "server fields are nullable");
    }

    #[tokio::test]
    async fn test_list_empty() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/call-requests"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "items": [] })))
            .mount(&mock_server)
            .await;

        let relay = create_test_relay(&mock_server.uri());
        let items = relay.list_call_requests().await.unwrap();
        assert!(items.is_empty());
    }
}
