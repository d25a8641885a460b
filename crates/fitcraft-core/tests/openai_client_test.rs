//! Integration tests for the OpenAI adapter against a local axum upstream.

use std::sync::{Arc, Mutex};

use axum::Json;
use axum::Router;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::post;
use serde_json::{Value, json};

use fitcraft_core::model::{
    ChatModel, ChatRequest, ModelError, OpenAiChatModel, OpenAiConfig,
};
use fitcraft_test_utils::spawn_upstream;

/// What the fake upstream saw.
#[derive(Default)]
struct Captured {
    authorization: Option<String>,
    body: Option<Value>,
}

type Shared = Arc<Mutex<Captured>>;

async fn completions_ok(
    State(captured): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Json<Value> {
    let mut c = captured.lock().unwrap();
    c.authorization = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    c.body = Some(body);
    Json(json!({
        "id": "chatcmpl-1",
        "model": "gpt-4o-2024-08-06",
        "choices": [
            { "index": 0, "message": { "role": "assistant", "content": "{\"ok\":true}" } }
        ]
    }))
}

async fn model_against(router: Router) -> OpenAiChatModel {
    let base = spawn_upstream(router).await;
    let config = OpenAiConfig::new("sk-test-key").with_base_url(format!("{base}/v1"));
    OpenAiChatModel::new(config).expect("client should build")
}

#[tokio::test]
async fn sends_bearer_auth_and_json_mode_body() {
    let captured: Shared = Arc::default();
    let router = Router::new()
        .route("/v1/chat/completions", post(completions_ok))
        .with_state(captured.clone());
    let model = model_against(router).await;

    let completion = model
        .complete(&ChatRequest::json("regras", "pedido"))
        .await
        .expect("completion should succeed");
    assert_eq!(completion.content, r#"{"ok":true}"#);
    assert_eq!(completion.model.as_deref(), Some("gpt-4o-2024-08-06"));

    let c = captured.lock().unwrap();
    assert_eq!(c.authorization.as_deref(), Some("Bearer sk-test-key"));
    let body = c.body.as_ref().unwrap();
    assert_eq!(body["model"], "gpt-4o");
    assert_eq!(body["response_format"]["type"], "json_object");
    assert_eq!(body["messages"][0]["role"], "system");
    assert_eq!(body["messages"][0]["content"], "regras");
    assert_eq!(body["messages"][1]["role"], "user");
    assert_eq!(body["messages"][1]["content"], "pedido");
    assert!(body.get("stream").is_none());
}

#[tokio::test]
async fn non_success_status_is_passed_through() {
    let router = Router::new().route(
        "/v1/chat/completions",
        post(|| async {
            (
                StatusCode::UNAUTHORIZED,
                r#"{"error":{"message":"Incorrect API key provided"}}"#,
            )
        }),
    );
    let model = model_against(router).await;

    let err = model
        .complete(&ChatRequest::json("s", "u"))
        .await
        .unwrap_err();
    match err {
        ModelError::Upstream { status, body } => {
            assert_eq!(status, 401);
            assert!(body.contains("Incorrect API key provided"));
        }
        other => panic!("expected Upstream, got: {other}"),
    }
}

#[tokio::test]
async fn missing_content_is_empty_response() {
    let router = Router::new().route(
        "/v1/chat/completions",
        post(|| async { Json(json!({ "choices": [] })) }),
    );
    let model = model_against(router).await;

    let err = model
        .complete(&ChatRequest::json("s", "u"))
        .await
        .unwrap_err();
    assert!(matches!(err, ModelError::EmptyResponse), "got: {err}");
}

#[tokio::test]
async fn undecodable_success_is_decode_error() {
    let router = Router::new().route("/v1/chat/completions", post(|| async { "not json" }));
    let model = model_against(router).await;

    let err = model
        .complete(&ChatRequest::json("s", "u"))
        .await
        .unwrap_err();
    assert!(matches!(err, ModelError::Decode(_)), "got: {err}");
}

#[tokio::test]
async fn unreachable_service_is_transport_error() {
    // Bind then drop a listener to get a port with nothing behind it.
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let config = OpenAiConfig::new("k").with_base_url(format!("http://{addr}/v1"));
    let model = OpenAiChatModel::new(config).unwrap();
    let err = model
        .complete(&ChatRequest::json("s", "u"))
        .await
        .unwrap_err();
    assert!(matches!(err, ModelError::Transport(_)), "got: {err}");
}
