//! Test utilities for penny-core
//!
//! In-process mock servers for the Ollama chat API (plus the OpenAI-compatible
//! chat completions route) and the Tavily search API. Both bind to an
//! ephemeral localhost port and shut down on drop.

use std::collections::VecDeque;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::{
    extract::{Json, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::sync::oneshot;

use crate::ai::MOCK_BEAUTIFIED;

/// Shared state behind a mock server
#[derive(Default)]
struct MockState {
    /// Scripted completions, consumed before the prompt-based fallbacks
    responses: Mutex<VecDeque<String>>,
    /// Every prompt or query received
    requests: Mutex<Vec<String>>,
    /// Respond with HTTP 500 to every call
    failing: bool,
}

impl MockState {
    fn record(&self, request: &str) {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request.to_string());
        }
    }

    fn next_scripted(&self) -> Option<String> {
        self.responses.lock().ok().and_then(|mut q| q.pop_front())
    }
}

/// Spawn `app` on an ephemeral port
async fn spawn(app: Router) -> (SocketAddr, oneshot::Sender<()>) {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let (shutdown_tx, shutdown_rx) = oneshot::channel();

    tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async {
                shutdown_rx.await.ok();
            })
            .await
            .unwrap();
    });

    (addr, shutdown_tx)
}

/// Mock Ollama server for testing and development
pub struct MockOllamaServer {
    addr: SocketAddr,
    state: Arc<MockState>,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl MockOllamaServer {
    /// Start the mock server on an available port
    pub async fn start() -> Self {
        Self::start_with_state(MockState::default()).await
    }

    /// Start a server that replays `responses` before falling back to
    /// prompt-based answers
    pub async fn start_with_responses<I, S>(responses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::start_with_state(MockState {
            responses: Mutex::new(responses.into_iter().map(Into::into).collect()),
            ..Default::default()
        })
        .await
    }

    /// Start a server that answers every chat call with HTTP 500
    pub async fn start_failing() -> Self {
        Self::start_with_state(MockState {
            failing: true,
            ..Default::default()
        })
        .await
    }

    async fn start_with_state(state: MockState) -> Self {
        let state = Arc::new(state);
        let app = Router::new()
            .route("/api/tags", get(handle_tags))
            .route("/api/chat", post(handle_chat))
            .route("/v1/models", get(handle_models))
            .route("/v1/chat/completions", post(handle_chat_completions))
            .with_state(state.clone());

        let (addr, shutdown_tx) = spawn(app).await;

        Self {
            addr,
            state,
            shutdown_tx: Some(shutdown_tx),
        }
    }

    /// Get the base URL for this mock server
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Prompts received so far
    pub fn prompts(&self) -> Vec<String> {
        self.state
            .requests
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }

    /// Stop the mock server
    pub fn stop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

impl Drop for MockOllamaServer {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Ollama tags endpoint (health check)
async fn handle_tags() -> Json<serde_json::Value> {
    Json(json!({
        "models": [{
            "name": "gemma3:1b",
            "modified_at": "2025-01-01T00:00:00Z",
            "size": 815_000_000u64
        }]
    }))
}

/// OpenAI-compatible models endpoint (health check)
async fn handle_models() -> Json<serde_json::Value> {
    Json(json!({"object": "list", "data": [{"id": "gemma3:1b", "object": "model"}]}))
}

/// Ollama chat endpoint
async fn handle_chat(
    State(state): State<Arc<MockState>>,
    Json(request): Json<ChatRequest>,
) -> Response {
    match complete(&state, &request) {
        Some(content) => Json(json!({
            "model": request.model,
            "message": {"role": "assistant", "content": content},
            "done": true
        }))
        .into_response(),
        None => (StatusCode::INTERNAL_SERVER_ERROR, "model crashed").into_response(),
    }
}

/// OpenAI-compatible chat completions endpoint
async fn handle_chat_completions(
    State(state): State<Arc<MockState>>,
    Json(request): Json<ChatRequest>,
) -> Response {
    match complete(&state, &request) {
        Some(content) => Json(json!({
            "id": "chatcmpl-mock",
            "object": "chat.completion",
            "model": request.model,
            "choices": [{
                "index": 0,
                "message": {"role": "assistant", "content": content},
                "finish_reason": "stop"
            }]
        }))
        .into_response(),
        None => (StatusCode::INTERNAL_SERVER_ERROR, "model crashed").into_response(),
    }
}

/// Produce a completion for the last user message, or None to signal failure
fn complete(state: &MockState, request: &ChatRequest) -> Option<String> {
    let prompt = request
        .messages
        .iter()
        .rev()
        .find(|m| m.role == "user")
        .map(|m| m.content.as_str())
        .unwrap_or_default();
    state.record(prompt);

    if state.failing {
        return None;
    }

    Some(
        state
            .next_scripted()
            .unwrap_or_else(|| answer_for_prompt(prompt)),
    )
}

/// Prompt-based answers matching the prompt files in prompts/*.md
fn answer_for_prompt(prompt: &str) -> String {
    let lower = prompt.to_lowercase();

    if prompt.contains("Valid Categories:") {
        // classify_general_category.md
        if lower.contains("coffee") || lower.contains("starbucks") {
            "Food & Dining"
        } else if lower.contains("fuel") || lower.contains("petrol") {
            "Transport"
        } else {
            "Other"
        }
        .to_string()
    } else if prompt.contains("broader category of") {
        // classify_subcategory.md
        if lower.contains("coffee") || lower.contains("starbucks") {
            "Coffee Shop"
        } else if lower.contains("fuel") || lower.contains("petrol") {
            "Fuel"
        } else {
            "Unknown"
        }
        .to_string()
    } else if prompt.contains("convert it into a JSON array") {
        // beautify_suggestion.md
        MOCK_BEAUTIFIED.to_string()
    } else {
        // suggest_alternative.md
        "Try brewing coffee at home. You could save ₹300 per week and reach your goal sooner."
            .to_string()
    }
}

#[derive(Debug, Deserialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatRequestMessage>,
    #[serde(default)]
    #[allow(dead_code)]
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct ChatRequestMessage {
    role: String,
    content: String,
}

/// Mock Tavily search server
///
/// Answers `POST /search`. The API key `invalid` gets HTTP 401 and a query
/// containing `error` gets HTTP 500.
pub struct MockTavilyServer {
    addr: SocketAddr,
    state: Arc<MockState>,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl MockTavilyServer {
    /// Start the mock server on an available port
    pub async fn start() -> Self {
        let state = Arc::new(MockState::default());
        let app = Router::new()
            .route("/search", post(handle_search))
            .with_state(state.clone());

        let (addr, shutdown_tx) = spawn(app).await;

        Self {
            addr,
            state,
            shutdown_tx: Some(shutdown_tx),
        }
    }

    /// Get the base URL for this mock server
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Queries received so far
    pub fn queries(&self) -> Vec<String> {
        self.state
            .requests
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }

    /// Stop the mock server
    pub fn stop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

impl Drop for MockTavilyServer {
    fn drop(&mut self) {
        self.stop();
    }
}

#[derive(Debug, Deserialize, Serialize)]
struct SearchRequest {
    api_key: String,
    query: String,
    search_depth: String,
    include_answer: bool,
    max_results: u32,
}

async fn handle_search(
    State(state): State<Arc<MockState>>,
    Json(request): Json<SearchRequest>,
) -> Response {
    state.record(&request.query);

    if request.api_key == "invalid" {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({"detail": {"error": "Unauthorized: missing or invalid API key."}})),
        )
            .into_response();
    }
    if request.query.to_lowercase().contains("error") {
        return (StatusCode::INTERNAL_SERVER_ERROR, "search backend down").into_response();
    }

    let answer = if request.query.to_lowercase().contains("starbucks") {
        "Starbucks is an American multinational chain of coffeehouses.".to_string()
    } else {
        format!("{} is a merchant.", request.query)
    };

    Json(json!({
        "query": request.query,
        "answer": answer,
        "results": [{
            "title": request.query,
            "url": "https://example.com",
            "content": answer,
            "score": 0.9
        }],
        "response_time": 0.5
    }))
    .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::{AIBackend, OllamaBackend, OpenAICompatibleBackend};
    use crate::error::Error;
    use crate::model_router::TaskType;
    use crate::search::{SearchProvider, TavilyClient};

    #[tokio::test]
    async fn test_mock_server_health_check() {
        let server = MockOllamaServer::start().await;
        let client = OllamaBackend::new(&server.url(), "gemma3:1b");

        assert!(client.health_check().await);
    }

    #[tokio::test]
    async fn test_ollama_general_category() {
        let server = MockOllamaServer::start().await;
        let client = OllamaBackend::new(&server.url(), "gemma3:1b");

        let answer = client
            .classify_general_category(
                "Starbucks is a chain of coffeehouses.",
                &["Food & Dining", "Other", "Transport"],
            )
            .await
            .unwrap();
        assert_eq!(answer, "Food & Dining");
        assert_eq!(server.prompts().len(), 1);
    }

    #[tokio::test]
    async fn test_ollama_scripted_response_is_trimmed() {
        let server = MockOllamaServer::start_with_responses(["  Coffee Shop\n"]).await;
        let client = OllamaBackend::new(&server.url(), "gemma3:1b");

        let answer = client
            .chat(TaskType::SubcategoryClassification, "anything")
            .await
            .unwrap();
        assert_eq!(answer, "Coffee Shop");
    }

    #[tokio::test]
    async fn test_ollama_server_error_is_backend_error() {
        let server = MockOllamaServer::start_failing().await;
        let client = OllamaBackend::new(&server.url(), "gemma3:1b");

        let err = client.beautify_suggestion("text").await.unwrap_err();
        assert!(matches!(err, Error::Backend(_)));
    }

    #[tokio::test]
    async fn test_openai_compatible_chat() {
        let server = MockOllamaServer::start().await;
        let client = OpenAICompatibleBackend::new(&server.url(), "gemma3:1b");

        assert!(client.health_check().await);
        let text = client.beautify_suggestion("four tips").await.unwrap();
        assert!(text.starts_with("```json"));
    }

    #[tokio::test]
    async fn test_tavily_answer() {
        let server = MockTavilyServer::start().await;
        let client = TavilyClient::with_base_url(Some("tvly-test".into()), &server.url());

        let answer = client.search("Starbucks").await.unwrap();
        assert!(answer.answer.unwrap().contains("coffeehouses"));
        assert_eq!(answer.results.len(), 1);
        assert_eq!(server.queries(), vec!["Starbucks".to_string()]);
    }

    #[tokio::test]
    async fn test_tavily_unauthorized() {
        let server = MockTavilyServer::start().await;
        let client = TavilyClient::with_base_url(Some("invalid".into()), &server.url());

        let err = client.search("Starbucks").await.unwrap_err();
        assert!(matches!(err, Error::SearchAuth(_)));
    }

    #[tokio::test]
    async fn test_tavily_server_error() {
        let server = MockTavilyServer::start().await;
        let client = TavilyClient::with_base_url(Some("tvly-test".into()), &server.url());

        let err = client.search("trigger error").await.unwrap_err();
        assert!(matches!(err, Error::Search(_)));
    }
}
