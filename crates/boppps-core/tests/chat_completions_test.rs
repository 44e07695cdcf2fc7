//! Tests for `ChatCompletionsClient` against a local fake endpoint.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Json, Router};

use boppps_core::llm::{ChatCompletionsClient, CompletionClient, CompletionError, CompletionRequest};

#[derive(Default)]
struct Seen {
    body: Option<serde_json::Value>,
    authorization: Option<String>,
}

/// Start a fake chat-completion server that answers every request with
/// `status` and `body`. Returns its base URL and the last request seen.
async fn fake_server(status: StatusCode, body: &'static str) -> (String, Arc<Mutex<Seen>>) {
    let seen = Arc::new(Mutex::new(Seen::default()));

    let app = Router::new()
        .route(
            "/v1/chat/completions",
            post(
                move |State(seen): State<Arc<Mutex<Seen>>>,
                      headers: HeaderMap,
                      Json(req): Json<serde_json::Value>| async move {
                    let mut s = seen.lock().unwrap();
                    s.body = Some(req);
                    s.authorization = headers
                        .get("authorization")
                        .map(|v| v.to_str().unwrap().to_string());
                    (status, [("content-type", "application/json")], body).into_response()
                },
            ),
        )
        .with_state(seen.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr: SocketAddr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{addr}/v1"), seen)
}

fn request() -> CompletionRequest {
    CompletionRequest {
        model: "llama3-8b-8192".to_string(),
        prompt: "Write a plan".to_string(),
        temperature: 0.7,
    }
}

const OK_BODY: &str = r#"{
  "id": "chatcmpl-1",
  "choices": [
    {"index": 0, "message": {"role": "assistant", "content": "Bridge-In: ..."}},
    {"index": 1, "message": {"role": "assistant", "content": "second choice"}}
  ]
}"#;

#[tokio::test]
async fn returns_first_choice_content_and_sends_expected_body() {
    let (base_url, seen) = fake_server(StatusCode::OK, OK_BODY).await;
    let client = ChatCompletionsClient::new(base_url, Some("secret-key".to_string()));

    let text = client.complete(&request()).await.expect("complete");
    assert_eq!(text, "Bridge-In: ...");

    let seen = seen.lock().unwrap();
    let body = seen.body.as_ref().expect("server saw a request");
    assert_eq!(body["model"], "llama3-8b-8192");
    assert_eq!(body["messages"][0]["role"], "user");
    assert_eq!(body["messages"][0]["content"], "Write a plan");
    assert!((body["temperature"].as_f64().unwrap() - 0.7).abs() < 1e-6);
    assert_eq!(seen.authorization.as_deref(), Some("Bearer secret-key"));
}

#[tokio::test]
async fn missing_key_sends_no_authorization_header() {
    let (base_url, seen) = fake_server(StatusCode::OK, OK_BODY).await;
    let client = ChatCompletionsClient::new(base_url, None);

    client.complete(&request()).await.unwrap();
    assert!(seen.lock().unwrap().authorization.is_none());
}

#[tokio::test]
async fn blank_key_sends_no_authorization_header() {
    let (base_url, seen) = fake_server(StatusCode::OK, OK_BODY).await;
    let client = ChatCompletionsClient::new(base_url, Some("   ".to_string()));

    client.complete(&request()).await.unwrap();
    assert!(seen.lock().unwrap().authorization.is_none());
}

#[tokio::test]
async fn non_success_status_is_reported_with_body() {
    let (base_url, _) = fake_server(
        StatusCode::UNAUTHORIZED,
        r#"{"error":{"message":"Invalid API Key"}}"#,
    )
    .await;
    let client = ChatCompletionsClient::new(base_url, None);

    let err = client.complete(&request()).await.unwrap_err();
    match &err {
        CompletionError::Status { status, body } => {
            assert_eq!(status.as_u16(), 401);
            assert!(body.contains("Invalid API Key"));
        }
        other => panic!("expected Status, got {other:?}"),
    }
}

#[tokio::test]
async fn malformed_json_is_reported() {
    let (base_url, _) = fake_server(StatusCode::OK, "{not json").await;
    let client = ChatCompletionsClient::new(base_url, None);

    let err = client.complete(&request()).await.unwrap_err();
    assert!(matches!(err, CompletionError::MalformedResponse(_)), "got {err:?}");
}

#[tokio::test]
async fn empty_choices_are_reported() {
    let (base_url, _) = fake_server(StatusCode::OK, r#"{"choices": []}"#).await;
    let client = ChatCompletionsClient::new(base_url, None);

    let err = client.complete(&request()).await.unwrap_err();
    assert!(matches!(err, CompletionError::EmptyResponse), "got {err:?}");
}

#[tokio::test]
async fn null_content_is_reported_as_empty() {
    let (base_url, _) = fake_server(
        StatusCode::OK,
        r#"{"choices": [{"message": {"role": "assistant", "content": null}}]}"#,
    )
    .await;
    let client = ChatCompletionsClient::new(base_url, None);

    let err = client.complete(&request()).await.unwrap_err();
    assert!(matches!(err, CompletionError::EmptyResponse), "got {err:?}");
}

#[tokio::test]
async fn unreachable_endpoint_is_a_transport_error() {
    // Bind then drop to get a port nothing listens on.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = ChatCompletionsClient::new(format!("http://{addr}/v1"), None);
    let err = client.complete(&request()).await.unwrap_err();
    assert!(matches!(err, CompletionError::Transport(_)), "got {err:?}");
}
