use axum::{
    Json, Router,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::post,
};
use portfolio_gateway::{
    models::CompletionRequest,
    provider::{CompletionProvider, OpenAiProvider, ProviderError},
};
use serde_json::Value;
use std::sync::Arc;

// Echoes what it received back as the completion text: "<auth>|<messages>|<max_tokens>"
async fn echo_completion(headers: HeaderMap, Json(body): Json<Value>) -> impl IntoResponse {
    let auth = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();
    let messages = body["messages"].as_array().map(|m| m.len()).unwrap_or(0);
    let content = format!("{}|{}|{}", auth, messages, body["max_tokens"]);

    Json(serde_json::json!({
        "choices": [{ "message": { "role": "assistant", "content": content } }]
    }))
}

async fn unauthorized() -> impl IntoResponse {
    (StatusCode::UNAUTHORIZED, "invalid api key sk-x")
}

async fn not_json() -> impl IntoResponse {
    (StatusCode::OK, "<html>definitely not json</html>")
}

// Serve `app` on a random local port, returns the base url
async fn spawn_upstream(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}/v1", addr)
}

fn provider(base_url: &str) -> OpenAiProvider {
    OpenAiProvider::new(reqwest::Client::new(), base_url, "gpt-4o-mini", Some("sk-x".to_string()))
}

fn request() -> CompletionRequest {
    CompletionRequest {
        system_instruction: Arc::from("be brief"),
        message: "who are you?".to_string(),
        max_tokens: 250,
        temperature: 0.7,
    }
}

#[tokio::test]
async fn sends_bearer_key_to_chat_completions() {
    let app = Router::new().route("/v1/chat/completions", post(echo_completion));
    let base_url = spawn_upstream(app).await;

    let reply = provider(&base_url).complete(&request()).await;

    assert_eq!(reply, Ok(Some("Bearer sk-x|2|250".to_string())));
}

#[tokio::test]
async fn error_status_is_reported_as_status() {
    let app = Router::new().route("/v1/chat/completions", post(unauthorized));
    let base_url = spawn_upstream(app).await;

    let reply = provider(&base_url).complete(&request()).await;

    assert_eq!(reply, Err(ProviderError::Status(401)));
    assert_eq!(ProviderError::Status(401).kind(), "status");
}

#[tokio::test]
async fn non_json_body_is_a_decode_error() {
    let app = Router::new().route("/v1/chat/completions", post(not_json));
    let base_url = spawn_upstream(app).await;

    let reply = provider(&base_url).complete(&request()).await;

    assert_eq!(reply, Err(ProviderError::Decode));
}

#[tokio::test]
async fn refused_port_is_a_connect_error() {
    // grab a free port, then close it so nothing is listening
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let reply = provider(&format!("http://{}/v1", addr)).complete(&request()).await;

    assert_eq!(reply, Err(ProviderError::Connect));
}
