//! Ollama backend implementation
//!
//! HTTP client for the Ollama chat API. Uses the model router for per-task
//! model and timeout selection and the prompt library for customizable prompts.

use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};
use crate::model_router::{ModelRouter, RouterConfig, TaskType};
use crate::prompts::PromptLibrary;

use super::types::{ChatMessage, RouterInfo};
use super::{AIBackend, DEFAULT_MODEL, DEFAULT_OLLAMA_HOST};

/// Ollama backend with model router integration
///
/// # Configuration
///
/// Configure routing via `~/.local/share/penny/config/models.toml`:
///
/// ```toml
/// [models.suggestion]
/// model = "llama3.2"
/// timeout_secs = 180
/// ```
#[derive(Clone)]
pub struct OllamaBackend {
    http_client: Client,
    base_url: String,
    router: Arc<RwLock<ModelRouter>>,
    default_model: String,
    prompts: Arc<RwLock<PromptLibrary>>,
}

impl OllamaBackend {
    /// Create a new Ollama backend
    pub fn new(base_url: &str, default_model: &str) -> Self {
        Self::with_router(base_url, default_model, ModelRouter::default())
    }

    /// Create with a custom router
    pub fn with_router(base_url: &str, default_model: &str, router: ModelRouter) -> Self {
        Self {
            http_client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            router: Arc::new(RwLock::new(router)),
            default_model: default_model.to_string(),
            prompts: Arc::new(RwLock::new(PromptLibrary::new())),
        }
    }

    /// Create a new instance with a different model
    pub fn with_model(&self, model: &str) -> Self {
        Self {
            default_model: model.to_string(),
            ..self.clone()
        }
    }

    /// Create from environment variables, defaulting to a local server
    pub fn from_env() -> Self {
        let host =
            std::env::var("OLLAMA_HOST").unwrap_or_else(|_| DEFAULT_OLLAMA_HOST.to_string());
        let model = std::env::var("OLLAMA_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());
        Self::new(&host, &model)
    }

    fn route(&self, task: TaskType) -> (String, std::time::Duration) {
        match self.router.read() {
            Ok(router) => (
                router
                    .model_for_task(task, &self.default_model)
                    .to_string(),
                router.timeout_for_task(task),
            ),
            Err(_) => (
                self.default_model.clone(),
                RouterConfig::default().default_timeout,
            ),
        }
    }
}

/// Request to the Ollama chat API
#[derive(Debug, Serialize)]
struct OllamaChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    stream: bool,
}

/// Response from the Ollama chat API
#[derive(Debug, Deserialize)]
struct OllamaChatResponse {
    message: ChatMessage,
}

#[async_trait]
impl AIBackend for OllamaBackend {
    async fn chat(&self, task: TaskType, prompt: &str) -> Result<String> {
        let (model, timeout) = self.route(task);
        debug!(task = task.as_str(), model = %model, "Ollama chat request");

        let request = OllamaChatRequest {
            model,
            messages: vec![ChatMessage::user(prompt)],
            stream: false,
        };

        let response = self
            .http_client
            .post(format!("{}/api/chat", self.base_url))
            .timeout(timeout)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Backend(format!(
                "Ollama returned {}: {}",
                status, body
            )));
        }

        let chat_response: OllamaChatResponse = response.json().await?;
        debug!(task = task.as_str(), "Ollama response: {}", chat_response.message.content);

        Ok(chat_response.message.content.trim().to_string())
    }

    fn prompts(&self) -> &RwLock<PromptLibrary> {
        &self.prompts
    }

    async fn health_check(&self) -> bool {
        match self
            .http_client
            .get(format!("{}/api/tags", self.base_url))
            .send()
            .await
        {
            Ok(resp) => resp.status().is_success(),
            Err(_) => false,
        }
    }

    fn model(&self) -> &str {
        &self.default_model
    }

    fn host(&self) -> &str {
        &self.base_url
    }

    fn router_info(&self) -> RouterInfo {
        let mut task_models = Vec::new();

        if let Ok(router) = self.router.read() {
            for task in TaskType::all() {
                let model = router.model_for_task(*task, &self.default_model);
                // Only include if different from default
                if model != self.default_model {
                    task_models.push((task.as_str().to_string(), model.to_string()));
                }
            }
        }

        RouterInfo {
            default_model: self.default_model.clone(),
            task_models,
        }
    }
}
