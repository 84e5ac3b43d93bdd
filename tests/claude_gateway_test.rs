//! Integration tests for the Anthropic gateway adapter
//!
//! Test coverage:
//! - Request shape and headers for complete calls
//! - SSE streaming into text fragments
//! - Retry of transient errors (429, 5xx) and no retry of permanent ones
//! - Error classification into gateway errors
//! - Configuration validation

use futures::StreamExt;
use mockito::{Matcher, Server};
use serde_json::json;
use socratic_tutor::domain::models::Role;
use socratic_tutor::domain::ports::{ChatGateway, ChatMessage, ChatRequest, GatewayError};
use socratic_tutor::infrastructure::claude::{ClaudeApiError, ClaudeClientConfig, ClaudeGateway};

const MODEL: &str = "claude-test-model";

fn config(base_url: String) -> ClaudeClientConfig {
    ClaudeClientConfig {
        api_key: "test-api-key".to_string(),
        base_url,
        model: MODEL.to_string(),
        default_max_tokens: 512,
        requests_per_second: 100,
        max_retries: 3,
        initial_backoff_ms: 10,
        max_backoff_ms: 50,
        timeout_secs: 10,
    }
}

fn chat_request() -> ChatRequest {
    ChatRequest::new(
        "You are a tutor.",
        vec![
            ChatMessage::new(Role::Assistant, "Good day."),
            ChatMessage::user("My loop is wrong"),
        ],
        0.5,
    )
}

fn message_body(text: &str) -> String {
    json!({
        "id": "msg_01ABC123",
        "type": "message",
        "role": "assistant",
        "content": [{"type": "text", "text": text}],
        "model": MODEL,
        "stop_reason": "end_turn",
        "usage": {"input_tokens": 12, "output_tokens": 5}
    })
    .to_string()
}

fn sse_body(fragments: &[&str]) -> String {
    let mut body = String::from(
        "event: message_start\ndata: {\"type\":\"message_start\",\"message\":{\"id\":\"msg_1\"}}\n\n",
    );
    for fragment in fragments {
        let event = json!({
            "type": "content_block_delta",
            "index": 0,
            "delta": {"type": "text_delta", "text": fragment}
        });
        body.push_str(&format!("event: content_block_delta\ndata: {event}\n\n"));
    }
    body.push_str("event: message_delta\ndata: {\"type\":\"message_delta\",\"delta\":{\"stop_reason\":\"end_turn\"}}\n\n");
    body.push_str("event: message_stop\ndata: {\"type\":\"message_stop\"}\n\n");
    body
}

#[tokio::test]
async fn test_complete_sends_expected_request() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/v1/messages")
        .match_header("x-api-key", "test-api-key")
        .match_header("anthropic-version", "2023-06-01")
        .match_header("content-type", "application/json")
        .match_body(Matcher::PartialJson(json!({
            "model": MODEL,
            "max_tokens": 512,
            "system": "You are a tutor.",
            "temperature": 0.5,
            "messages": [
                {"role": "assistant", "content": "Good day."},
                {"role": "user", "content": "My loop is wrong"}
            ]
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(message_body("What does xs[1:] return?"))
        .create_async()
        .await;

    let gateway = ClaudeGateway::new(config(server.url())).expect("Failed to create gateway");
    let reply = gateway.complete(chat_request()).await.expect("complete failed");

    assert_eq!(reply, "What does xs[1:] return?");
    mock.assert_async().await;
}

#[tokio::test]
async fn test_request_max_tokens_overrides_default() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/v1/messages")
        .match_body(Matcher::PartialJson(json!({"max_tokens": 16})))
        .with_status(200)
        .with_body(message_body("CORRECT"))
        .create_async()
        .await;

    let gateway = ClaudeGateway::new(config(server.url())).unwrap();
    let reply = gateway
        .complete(chat_request().with_max_tokens(16))
        .await
        .unwrap();

    assert_eq!(reply, "CORRECT");
    mock.assert_async().await;
}

#[tokio::test]
async fn test_retry_on_rate_limit_then_success() {
    let mut server = Server::new_async().await;
    let limited = server
        .mock("POST", "/v1/messages")
        .with_status(429)
        .with_body(r#"{"error": {"type": "rate_limit_error", "message": "Rate limit exceeded"}}"#)
        .expect(1)
        .create_async()
        .await;
    let success = server
        .mock("POST", "/v1/messages")
        .with_status(200)
        .with_body(message_body("Try again"))
        .expect(1)
        .create_async()
        .await;

    let gateway = ClaudeGateway::new(config(server.url())).unwrap();
    let reply = gateway.complete(chat_request()).await;

    assert_eq!(reply.unwrap(), "Try again");
    limited.assert_async().await;
    success.assert_async().await;
}

#[tokio::test]
async fn test_server_errors_exhaust_retries() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/v1/messages")
        .with_status(529)
        .with_body(r#"{"error": {"type": "overloaded_error", "message": "Overloaded"}}"#)
        .expect(3)
        .create_async()
        .await;

    let mut cfg = config(server.url());
    cfg.max_retries = 2;
    let gateway = ClaudeGateway::new(cfg).unwrap();
    let err = gateway.complete(chat_request()).await.unwrap_err();

    assert!(matches!(err, GatewayError::Unavailable(_)), "got {err:?}");
    mock.assert_async().await;
}

#[tokio::test]
async fn test_bad_request_not_retried() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/v1/messages")
        .with_status(400)
        .with_body(r#"{"error": {"type": "invalid_request_error", "message": "messages: roles must alternate"}}"#)
        .expect(1)
        .create_async()
        .await;

    let gateway = ClaudeGateway::new(config(server.url())).unwrap();
    let err = gateway.complete(chat_request()).await.unwrap_err();

    match err {
        GatewayError::Rejected { status, message } => {
            assert_eq!(status, 400);
            assert!(message.contains("roles must alternate"));
        }
        other => panic!("expected rejection, got {other:?}"),
    }
    mock.assert_async().await;
}

#[tokio::test]
async fn test_invalid_api_key_not_retried() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/v1/messages")
        .with_status(401)
        .with_body(r#"{"error": {"type": "authentication_error", "message": "invalid x-api-key"}}"#)
        .expect(1)
        .create_async()
        .await;

    let gateway = ClaudeGateway::new(config(server.url())).unwrap();
    let err = gateway.complete(chat_request()).await.unwrap_err();

    assert!(matches!(err, GatewayError::Rejected { status: 401, .. }));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_empty_text_is_an_error() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("POST", "/v1/messages")
        .with_status(200)
        .with_body(message_body(""))
        .create_async()
        .await;

    let gateway = ClaudeGateway::new(config(server.url())).unwrap();
    let err = gateway.complete(chat_request()).await.unwrap_err();

    assert!(matches!(err, GatewayError::Stream(_)));
}

#[tokio::test]
async fn test_stream_yields_text_fragments() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/v1/messages")
        .match_body(Matcher::PartialJson(json!({"stream": true})))
        .with_status(200)
        .with_header("content-type", "text/event-stream")
        .with_body(sse_body(&["What ", "does ", "the loop skip?"]))
        .create_async()
        .await;

    let gateway = ClaudeGateway::new(config(server.url())).unwrap();
    let fragments: Vec<String> = gateway
        .stream(chat_request())
        .await
        .expect("stream failed to open")
        .map(|item| item.expect("fragment failed"))
        .collect()
        .await;

    assert_eq!(fragments, vec!["What ", "does ", "the loop skip?"]);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_stream_error_event_surfaces_after_fragments() {
    let mut server = Server::new_async().await;
    let mut body = String::new();
    body.push_str("event: content_block_delta\ndata: {\"type\":\"content_block_delta\",\"index\":0,\"delta\":{\"type\":\"text_delta\",\"text\":\"Hel\"}}\n\n");
    body.push_str("event: error\ndata: {\"type\":\"error\",\"error\":{\"type\":\"overloaded_error\",\"message\":\"Overloaded\"}}\n\n");
    let _mock = server
        .mock("POST", "/v1/messages")
        .with_status(200)
        .with_header("content-type", "text/event-stream")
        .with_body(body)
        .create_async()
        .await;

    let gateway = ClaudeGateway::new(config(server.url())).unwrap();
    let items: Vec<Result<String, GatewayError>> =
        gateway.stream(chat_request()).await.unwrap().collect().await;

    assert_eq!(items.len(), 2);
    assert_eq!(items[0], Ok("Hel".to_string()));
    match &items[1] {
        Err(GatewayError::Stream(message)) => assert!(message.contains("overloaded_error")),
        other => panic!("expected stream error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_stream_open_is_retried() {
    let mut server = Server::new_async().await;
    let unavailable = server
        .mock("POST", "/v1/messages")
        .with_status(503)
        .with_body("Service Unavailable")
        .expect(1)
        .create_async()
        .await;
    let success = server
        .mock("POST", "/v1/messages")
        .with_status(200)
        .with_header("content-type", "text/event-stream")
        .with_body(sse_body(&["ok"]))
        .expect(1)
        .create_async()
        .await;

    let gateway = ClaudeGateway::new(config(server.url())).unwrap();
    let fragments: Vec<_> = gateway.stream(chat_request()).await.unwrap().collect().await;

    assert_eq!(fragments, vec![Ok("ok".to_string())]);
    unavailable.assert_async().await;
    success.assert_async().await;
}

#[test]
fn test_missing_api_key_rejected() {
    let mut cfg = config("http://localhost:9".to_string());
    cfg.api_key = "   ".to_string();

    let result = ClaudeGateway::new(cfg);

    assert!(matches!(result, Err(ClaudeApiError::Configuration(_))));
}

#[test]
fn test_zero_rate_limit_rejected() {
    let mut cfg = config("http://localhost:9".to_string());
    cfg.requests_per_second = 0;

    assert!(matches!(
        ClaudeGateway::new(cfg),
        Err(ClaudeApiError::Configuration(_))
    ));
}
