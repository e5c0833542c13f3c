//! Web search providers
//!
//! Used to turn a bare merchant name into a short description before
//! classification. Only the provider's synthesized `answer` is consumed.
//!
//! # Configuration
//!
//! Environment variables:
//! - `SEARCH_BACKEND`: Provider to use (tavily, mock). Default: tavily
//! - `TAVILY_API_KEY`: Tavily credential. Without it every search fails with an auth error
//! - `TAVILY_HOST`: Override the Tavily base URL (testing)

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};

/// Default Tavily API base URL
pub const DEFAULT_TAVILY_HOST: &str = "https://api.tavily.com";

/// Number of results requested per search
const MAX_RESULTS: u32 = 5;

/// One search hit
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    pub title: String,
    pub url: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub score: f64,
}

/// Search response reduced to what the pipeline uses
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchAnswer {
    /// Provider-synthesized answer, absent when the provider produced none
    pub answer: Option<String>,
    #[serde(default)]
    pub results: Vec<SearchResult>,
}

/// Trait for web search providers
#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Search for `query`, asking the provider for a synthesized answer
    async fn search(&self, query: &str) -> Result<SearchAnswer>;

    /// Provider name for logs and health output
    fn name(&self) -> &str;
}

/// Tavily search request body
#[derive(Debug, Serialize)]
struct TavilySearchRequest<'a> {
    api_key: &'a str,
    query: &'a str,
    search_depth: &'static str,
    include_answer: bool,
    max_results: u32,
}

/// Tavily search client
#[derive(Clone)]
pub struct TavilyClient {
    api_key: Option<String>,
    base_url: String,
    http_client: Client,
}

impl TavilyClient {
    pub fn new(api_key: Option<String>) -> Self {
        Self::with_base_url(api_key, DEFAULT_TAVILY_HOST)
    }

    pub fn with_base_url(api_key: Option<String>, base_url: &str) -> Self {
        Self {
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            http_client: Client::new(),
        }
    }

    /// Create from `TAVILY_API_KEY` and optional `TAVILY_HOST`
    pub fn from_env() -> Self {
        let api_key = std::env::var("TAVILY_API_KEY")
            .ok()
            .filter(|k| !k.trim().is_empty());
        let host =
            std::env::var("TAVILY_HOST").unwrap_or_else(|_| DEFAULT_TAVILY_HOST.to_string());
        Self::with_base_url(api_key, &host)
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }
}

#[async_trait]
impl SearchProvider for TavilyClient {
    async fn search(&self, query: &str) -> Result<SearchAnswer> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| Error::SearchAuth("TAVILY_API_KEY is not set".into()))?;

        let request = TavilySearchRequest {
            api_key,
            query,
            search_depth: "advanced",
            include_answer: true,
            max_results: MAX_RESULTS,
        };

        let response = self
            .http_client
            .post(format!("{}/search", self.base_url))
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::Search(format!("Tavily request failed: {}", e)))?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            return Err(Error::SearchAuth("Tavily rejected the API key".into()));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Search(format!("Tavily API error {}: {}", status, body)));
        }

        let answer: SearchAnswer = response
            .json()
            .await
            .map_err(|e| Error::Search(format!("Failed to parse Tavily response: {}", e)))?;
        debug!(query = %query, results = answer.results.len(), "Tavily search complete");

        Ok(answer)
    }

    fn name(&self) -> &str {
        "tavily"
    }
}

/// Mock search provider for testing
///
/// Returns a fixed answer (or fails) and records every query.
#[derive(Clone, Default)]
pub struct MockSearchProvider {
    answer: Option<String>,
    failing: bool,
    queries: Arc<Mutex<Vec<String>>>,
}

impl MockSearchProvider {
    /// Provider that answers every query with `answer`
    pub fn with_answer(answer: impl Into<String>) -> Self {
        Self {
            answer: Some(answer.into()),
            ..Default::default()
        }
    }

    /// Provider that returns results but no synthesized answer
    pub fn without_answer() -> Self {
        Self::default()
    }

    /// Provider whose every search fails
    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Default::default()
        }
    }

    /// Queries received so far
    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().map(|q| q.clone()).unwrap_or_default()
    }

    pub fn call_count(&self) -> usize {
        self.queries.lock().map(|q| q.len()).unwrap_or_default()
    }
}

#[async_trait]
impl SearchProvider for MockSearchProvider {
    async fn search(&self, query: &str) -> Result<SearchAnswer> {
        if let Ok(mut queries) = self.queries.lock() {
            queries.push(query.to_string());
        }

        if self.failing {
            return Err(Error::Search("mock search failure".into()));
        }

        Ok(SearchAnswer {
            answer: self.answer.clone(),
            results: Vec::new(),
        })
    }

    fn name(&self) -> &str {
        "mock"
    }
}

/// Concrete search client enum
#[derive(Clone)]
pub enum SearchClient {
    Tavily(TavilyClient),
    Mock(MockSearchProvider),
}

impl SearchClient {
    /// Create a search client from `SEARCH_BACKEND` (default: tavily)
    pub fn from_env() -> Self {
        let backend = std::env::var("SEARCH_BACKEND").unwrap_or_else(|_| "tavily".to_string());

        match backend.to_lowercase().as_str() {
            "mock" => SearchClient::Mock(MockSearchProvider::with_answer(
                "A merchant found by the mock search provider.",
            )),
            "tavily" => SearchClient::Tavily(TavilyClient::from_env()),
            _ => {
                tracing::warn!(backend = %backend, "Unknown SEARCH_BACKEND, falling back to tavily");
                SearchClient::Tavily(TavilyClient::from_env())
            }
        }
    }
}

#[async_trait]
impl SearchProvider for SearchClient {
    async fn search(&self, query: &str) -> Result<SearchAnswer> {
        match self {
            SearchClient::Tavily(c) => c.search(query).await,
            SearchClient::Mock(c) => c.search(query).await,
        }
    }

    fn name(&self) -> &str {
        match self {
            SearchClient::Tavily(c) => c.name(),
            SearchClient::Mock(c) => c.name(),
        }
    }
}
