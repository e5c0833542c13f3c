//! AI backend support types
//!
//! These types are backend-agnostic and used across all AI implementations.

/// Router configuration information for display
#[derive(Debug, Clone)]
pub struct RouterInfo {
    /// Backend model used when a task has no override
    pub default_model: String,
    /// Task-specific model overrides (only non-default)
    pub task_models: Vec<(String, String)>,
}

/// A single chat message sent to the model
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}
