//! Mock backend for testing
//!
//! Replays scripted responses in order and records every prompt it receives.
//! When the script runs out it falls back to a canned answer per task.
//! Useful for unit tests and development without a running LLM server.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, RwLock};

use async_trait::async_trait;

use crate::error::{Error, Result};
use crate::model_router::TaskType;
use crate::prompts::PromptLibrary;

use super::types::RouterInfo;
use super::AIBackend;

/// Canned beautifier output used when no response is scripted
pub const MOCK_BEAUTIFIED: &str = r#"```json
[
  {"title": "Cheaper option", "description": "Pick a lower-cost alternative."},
  {"title": "Cut frequency", "description": "Buy this less often."},
  {"title": "Set a budget", "description": "Cap monthly spend in this category."},
  {"title": "Redirect savings", "description": "Move what you save towards your goal."}
]
```"#;

/// Mock AI backend for testing
#[derive(Clone)]
pub struct MockBackend {
    /// Whether health_check should return true
    pub healthy: bool,
    failing: bool,
    responses: Arc<Mutex<VecDeque<String>>>,
    calls: Arc<Mutex<Vec<(TaskType, String)>>>,
    prompts: Arc<RwLock<PromptLibrary>>,
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MockBackend {
    /// Create a new mock backend (healthy by default)
    pub fn new() -> Self {
        Self {
            healthy: true,
            failing: false,
            responses: Arc::new(Mutex::new(VecDeque::new())),
            calls: Arc::new(Mutex::new(Vec::new())),
            prompts: Arc::new(RwLock::new(PromptLibrary::embedded_only())),
        }
    }

    /// Create an unhealthy mock backend
    pub fn unhealthy() -> Self {
        Self {
            healthy: false,
            ..Self::new()
        }
    }

    /// Create a backend whose every chat call fails
    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::new()
        }
    }

    /// Queue responses returned by successive chat calls
    pub fn with_responses<I, S>(self, responses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if let Ok(mut queue) = self.responses.lock() {
            queue.extend(responses.into_iter().map(Into::into));
        }
        self
    }

    /// Create a new instance with a different model (no-op for mock)
    pub fn with_model(&self, _model: &str) -> Self {
        self.clone()
    }

    /// Prompts received so far, with the task they were sent for
    pub fn calls(&self) -> Vec<(TaskType, String)> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    /// Number of chat calls made so far
    pub fn call_count(&self) -> usize {
        self.calls.lock().map(|c| c.len()).unwrap_or_default()
    }

    fn default_response(task: TaskType) -> &'static str {
        match task {
            TaskType::CategoryClassification => "Other",
            TaskType::SubcategoryClassification => "Unknown",
            TaskType::Suggestion => {
                "Consider a cheaper alternative and put the difference towards your goal."
            }
            TaskType::Beautify => MOCK_BEAUTIFIED,
        }
    }
}

#[async_trait]
impl AIBackend for MockBackend {
    async fn chat(&self, task: TaskType, prompt: &str) -> Result<String> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push((task, prompt.to_string()));
        }

        if self.failing {
            return Err(Error::Backend("mock backend failure".into()));
        }

        let scripted = self
            .responses
            .lock()
            .ok()
            .and_then(|mut queue| queue.pop_front());

        Ok(scripted
            .unwrap_or_else(|| Self::default_response(task).to_string())
            .trim()
            .to_string())
    }

    fn prompts(&self) -> &RwLock<PromptLibrary> {
        &self.prompts
    }

    async fn health_check(&self) -> bool {
        self.healthy
    }

    fn model(&self) -> &str {
        "mock"
    }

    fn host(&self) -> &str {
        "mock://localhost"
    }

    fn router_info(&self) -> RouterInfo {
        RouterInfo {
            default_model: "mock".to_string(),
            task_models: vec![],
        }
    }
}
