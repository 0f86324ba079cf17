//! Mock HTTP tests for WebhookClient.
//!
//! These tests cover:
//! - Request formatting (method, headers, JSON body shape)
//! - Success keyed on HTTP status
//! - Rejection and connection errors surfacing to the caller

use shutterpost::webhook::{SubmissionPayload, WebhookClient, WebhookError};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_payload() -> SubmissionPayload {
    SubmissionPayload::new(
        vec![
            "data:image/jpeg;base64,Zmlyc3Q=".to_string(),
            "data:image/jpeg;base64,c2Vjb25k".to_string(),
        ],
        Some("alice"),
    )
}

#[tokio::test]
async fn test_post_submission_sends_json_content_type() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/hook"))
        .and(header("Content-Type", "application/json"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = WebhookClient::new(format!("{}/hook", mock_server.uri())).unwrap();
    let result = client.post_submission(&test_payload()).await;

    assert!(result.is_ok());
}

#[tokio::test]
async fn test_post_submission_body_matches_wire_shape() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/hook"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = WebhookClient::new(format!("{}/hook", mock_server.uri())).unwrap();
    client.post_submission(&test_payload()).await.unwrap();

    let requests = mock_server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);

    let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    let images = body["images"].as_array().unwrap();
    assert_eq!(images.len(), 2);
    assert_eq!(images[0], "data:image/jpeg;base64,Zmlyc3Q=");
    assert_eq!(images[1], "data:image/jpeg;base64,c2Vjb25k");
    assert_eq!(body["userId"], "alice");
    assert!(body["timestamp"].is_string());
    // The wire uses camelCase; the Rust field name must not appear
    assert!(body.get("user_id").is_none());
}

#[tokio::test]
async fn test_post_submission_accepts_any_2xx() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/hook"))
        .respond_with(ResponseTemplate::new(202))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = WebhookClient::new(format!("{}/hook", mock_server.uri())).unwrap();
    assert!(client.post_submission(&test_payload()).await.is_ok());
}

#[tokio::test]
async fn test_post_submission_rejection_carries_status_and_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/hook"))
        .respond_with(ResponseTemplate::new(422).set_body_string("images array too large"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = WebhookClient::new(format!("{}/hook", mock_server.uri())).unwrap();
    let result = client.post_submission(&test_payload()).await;

    match result {
        Err(WebhookError::Rejected { status, body }) => {
            assert_eq!(status, 422);
            assert_eq!(body, "images array too large");
        }
        other => panic!("Expected Rejected, got {:?}", other.err()),
    }
}

#[tokio::test]
async fn test_post_submission_server_error_is_rejection() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/hook"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    let client = WebhookClient::new(format!("{}/hook", mock_server.uri())).unwrap();
    let result = client.post_submission(&test_payload()).await;

    assert!(matches!(
        result,
        Err(WebhookError::Rejected { status: 500, .. })
    ));
}

#[tokio::test]
async fn test_post_submission_connection_refused_is_http_error() {
    // No server at all on this port
    let client = WebhookClient::new("http://127.0.0.1:9/hook").unwrap();
    let result = client.post_submission(&test_payload()).await;

    assert!(matches!(result, Err(WebhookError::HttpError(_))));
}
