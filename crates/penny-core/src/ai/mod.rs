//! Pluggable AI backend abstraction
//!
//! This module provides a backend-agnostic interface for the chat calls made by
//! the classifier and the advisor. Every call is a single user-role prompt,
//! non-streaming, one completion.
//!
//! # Architecture
//!
//! - `AIBackend` trait: one required `chat` call plus the prompt-level operations
//! - `AIClient` enum: concrete wrapper providing Clone + compile-time dispatch
//! - Backend implementations: `OllamaBackend`, `OpenAICompatibleBackend`, `MockBackend`
//!
//! # Usage
//!
//! ```rust,ignore
//! let ai = AIClient::from_env();
//! let category = ai
//!     .classify_general_category("Coffeehouse chain", &["Food & Dining", "Other"])
//!     .await?;
//! ```
//!
//! # Configuration
//!
//! Environment variables:
//! - `AI_BACKEND`: Backend to use (ollama, openai_compatible, mock). Default: ollama
//! - `OLLAMA_HOST`: Ollama server URL (default: http://localhost:11434)
//! - `OLLAMA_MODEL`: Model name (default: gemma3:1b)
//! - `OPENAI_COMPATIBLE_HOST`: Server URL (required for openai_compatible backend)
//! - `OPENAI_COMPATIBLE_MODEL`: Model name (default: gemma3:1b)
//! - `OPENAI_COMPATIBLE_API_KEY`: API key if required (optional)

mod mock;
mod ollama;
mod openai_compatible;
pub mod parsing;
pub mod types;

pub use mock::{MockBackend, MOCK_BEAUTIFIED};
pub use ollama::OllamaBackend;
pub use openai_compatible::OpenAICompatibleBackend;
pub use types::*;

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use tracing::debug;

use crate::error::{Error, Result};
use crate::model_router::TaskType;
use crate::models::SuggestionRequest;
use crate::prompts::{PromptId, PromptLibrary};

/// Default Ollama server URL
pub const DEFAULT_OLLAMA_HOST: &str = "http://localhost:11434";

/// Default chat model
pub const DEFAULT_MODEL: &str = "gemma3:1b";

/// Trait defining the interface for all AI backends
///
/// Backends implement `chat`; the prompt-level operations are provided on top
/// of it and render their prompt from the backend's prompt library.
#[async_trait]
pub trait AIBackend: Send + Sync {
    /// Send one user-role prompt for a task and return the trimmed completion
    async fn chat(&self, task: TaskType, prompt: &str) -> Result<String>;

    /// Prompt library used to render task prompts
    fn prompts(&self) -> &RwLock<PromptLibrary>;

    /// Check if the backend is available
    async fn health_check(&self) -> bool;

    /// Get the model name
    fn model(&self) -> &str;

    /// Get the host URL (for logging)
    fn host(&self) -> &str;

    /// Get router configuration info
    fn router_info(&self) -> RouterInfo;

    /// Render the user section of a prompt with the given variables
    fn render_prompt(&self, id: PromptId, vars: &HashMap<&str, &str>) -> Result<String> {
        let mut prompts = self
            .prompts()
            .write()
            .map_err(|_| Error::InvalidData("Failed to acquire prompt library lock".into()))?;
        Ok(prompts.get(id)?.render_user(vars))
    }

    /// Ask the model for exactly one general category name
    async fn classify_general_category(
        &self,
        description: &str,
        categories: &[&str],
    ) -> Result<String> {
        let categories = categories.join(", ");
        let mut vars = HashMap::new();
        vars.insert("description", description);
        vars.insert("categories", categories.as_str());
        let prompt = self.render_prompt(PromptId::ClassifyGeneralCategory, &vars)?;

        let answer = self.chat(TaskType::CategoryClassification, &prompt).await?;
        debug!(answer = %answer, "General category answer");
        Ok(answer)
    }

    /// Ask the model for one subcategory under an already chosen category
    async fn classify_subcategory(
        &self,
        merchant: &str,
        description: &str,
        general_category: &str,
        subcategories: &[&str],
    ) -> Result<String> {
        let subcategories = subcategories.join(", ");
        let mut vars = HashMap::new();
        vars.insert("merchant", merchant);
        vars.insert("description", description);
        vars.insert("general_category", general_category);
        vars.insert("subcategories", subcategories.as_str());
        let prompt = self.render_prompt(PromptId::ClassifySubcategory, &vars)?;

        let answer = self
            .chat(TaskType::SubcategoryClassification, &prompt)
            .await?;
        debug!(answer = %answer, "Subcategory answer");
        Ok(answer)
    }

    /// Generate free-text spending advice for a transaction
    async fn suggest_alternative(&self, request: &SuggestionRequest) -> Result<String> {
        let income = request.income.to_string();
        let mut vars = HashMap::new();
        vars.insert("merchant", request.merchant.as_str());
        vars.insert("description", request.description.as_str());
        vars.insert("category", request.category.as_str());
        vars.insert("subcategory", request.subcategory.as_str());
        vars.insert("goal", request.goal.as_str());
        vars.insert("income", income.as_str());
        let prompt = self.render_prompt(PromptId::SuggestAlternative, &vars)?;

        self.chat(TaskType::Suggestion, &prompt).await
    }

    /// Reformat free text into a JSON array of {title, description}
    ///
    /// The output is not guaranteed to be valid JSON.
    async fn beautify_suggestion(&self, text: &str) -> Result<String> {
        let mut vars = HashMap::new();
        vars.insert("text", text);
        let prompt = self.render_prompt(PromptId::BeautifySuggestion, &vars)?;

        self.chat(TaskType::Beautify, &prompt).await
    }
}

/// Concrete AI client enum
///
/// Provides Clone and compile-time dispatch without Box<dyn> overhead.
#[derive(Clone)]
pub enum AIClient {
    /// Ollama backend (HTTP API)
    Ollama(OllamaBackend),
    /// OpenAI-compatible backend (vLLM, LocalAI, llama-server, etc.)
    OpenAICompatible(OpenAICompatibleBackend),
    /// Mock backend for testing
    Mock(MockBackend),
}

impl AIClient {
    /// Create an AI client from environment variables
    ///
    /// Checks `AI_BACKEND` to determine which backend to use:
    /// - `ollama` (default): Uses OLLAMA_HOST and OLLAMA_MODEL
    /// - `openai_compatible`: Uses OPENAI_COMPATIBLE_HOST and OPENAI_COMPATIBLE_MODEL
    /// - `mock`: Creates a mock backend for testing
    ///
    /// Falls back to a local Ollama when the selected backend is not configured.
    pub fn from_env() -> Self {
        let backend = std::env::var("AI_BACKEND").unwrap_or_else(|_| "ollama".to_string());

        match backend.to_lowercase().as_str() {
            "ollama" => AIClient::Ollama(OllamaBackend::from_env()),
            "openai_compatible" | "openai" | "vllm" | "localai" | "llamacpp" => {
                match OpenAICompatibleBackend::from_env() {
                    Some(b) => AIClient::OpenAICompatible(b),
                    None => {
                        tracing::warn!(
                            "OPENAI_COMPATIBLE_HOST not set, falling back to ollama"
                        );
                        AIClient::Ollama(OllamaBackend::from_env())
                    }
                }
            }
            "mock" => AIClient::Mock(MockBackend::new()),
            _ => {
                tracing::warn!(backend = %backend, "Unknown AI_BACKEND, falling back to ollama");
                AIClient::Ollama(OllamaBackend::from_env())
            }
        }
    }

    /// Create an Ollama backend directly
    pub fn ollama(host: &str, model: &str) -> Self {
        AIClient::Ollama(OllamaBackend::new(host, model))
    }

    /// Create a mock backend for testing
    pub fn mock() -> Self {
        AIClient::Mock(MockBackend::new())
    }

    /// Short backend name for health output and logs
    pub fn backend_name(&self) -> &'static str {
        match self {
            AIClient::Ollama(_) => "ollama",
            AIClient::OpenAICompatible(_) => "openai_compatible",
            AIClient::Mock(_) => "mock",
        }
    }

    /// Create a new instance with a different model
    pub fn with_model(&self, model: &str) -> Self {
        match self {
            AIClient::Ollama(b) => AIClient::Ollama(b.with_model(model)),
            AIClient::OpenAICompatible(b) => AIClient::OpenAICompatible(b.with_model(model)),
            AIClient::Mock(b) => AIClient::Mock(b.with_model(model)),
        }
    }
}

// Implement AIBackend for AIClient by delegating to the inner backend
#[async_trait]
impl AIBackend for AIClient {
    async fn chat(&self, task: TaskType, prompt: &str) -> Result<String> {
        match self {
            AIClient::Ollama(b) => b.chat(task, prompt).await,
            AIClient::OpenAICompatible(b) => b.chat(task, prompt).await,
            AIClient::Mock(b) => b.chat(task, prompt).await,
        }
    }

    fn prompts(&self) -> &RwLock<PromptLibrary> {
        match self {
            AIClient::Ollama(b) => b.prompts(),
            AIClient::OpenAICompatible(b) => b.prompts(),
            AIClient::Mock(b) => b.prompts(),
        }
    }

    async fn health_check(&self) -> bool {
        match self {
            AIClient::Ollama(b) => b.health_check().await,
            AIClient::OpenAICompatible(b) => b.health_check().await,
            AIClient::Mock(b) => b.health_check().await,
        }
    }

    fn model(&self) -> &str {
        match self {
            AIClient::Ollama(b) => b.model(),
            AIClient::OpenAICompatible(b) => b.model(),
            AIClient::Mock(b) => b.model(),
        }
    }

    fn host(&self) -> &str {
        match self {
            AIClient::Ollama(b) => b.host(),
            AIClient::OpenAICompatible(b) => b.host(),
            AIClient::Mock(b) => b.host(),
        }
    }

    fn router_info(&self) -> RouterInfo {
        match self {
            AIClient::Ollama(b) => b.router_info(),
            AIClient::OpenAICompatible(b) => b.router_info(),
            AIClient::Mock(b) => b.router_info(),
        }
    }
}
