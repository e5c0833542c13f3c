//! Penny Core Library
//!
//! Shared functionality for the Penny merchant classification and spending
//! advisor service:
//! - Merchant category taxonomy (general category -> subcategory -> MCC details)
//! - Pluggable AI backends (Ollama, OpenAI-compatible, mock)
//! - Web search providers for merchant descriptions (Tavily, mock)
//! - Classification and spending-alternative pipelines
//! - Lenient JSON extraction for model output
//! - Model router for task-based model selection
//! - Prompt library for customizable AI prompts

pub mod advisor;
pub mod ai;
pub mod classifier;
pub mod error;
pub mod model_router;
pub mod models;
pub mod prompts;
pub mod search;
pub mod taxonomy;

/// Test utilities including mock Ollama and Tavily servers
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use advisor::suggest_alternate;
pub use ai::parsing::{extract_json_array, safe_parse_json, ExtractError};
pub use ai::{
    AIBackend, AIClient, ChatMessage, MockBackend, OllamaBackend, OpenAICompatibleBackend,
    RouterInfo,
};
pub use classifier::{classify_merchant, fetch_merchant_description};
pub use error::{Error, Result};
pub use model_router::{ModelRouter, RouterConfig, TaskConfig, TaskType};
pub use models::{
    BeautifyFailure, ClassificationResult, MerchantRequest, SuggestionItem, SuggestionOutcome,
    SuggestionRequest,
};
pub use prompts::{Prompt, PromptId, PromptInfo, PromptLibrary};
pub use search::{
    MockSearchProvider, SearchAnswer, SearchClient, SearchProvider, SearchResult, TavilyClient,
};
pub use taxonomy::{CategoryDetail, Taxonomy, OTHER_CATEGORY, UNKNOWN_SUBCATEGORY};
