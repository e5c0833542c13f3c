//! Request and response types shared by the core pipelines and the HTTP layer

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};
use crate::taxonomy::CategoryDetail;

/// Message returned when the beautified suggestion could not be parsed
pub const BEAUTIFY_PARSE_ERROR: &str = "Failed to parse beautified JSON";

/// Body of `POST /classify`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MerchantRequest {
    pub merchant: String,
}

/// Body of `POST /suggest-alternate`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuggestionRequest {
    pub merchant: String,
    pub description: String,
    pub category: String,
    pub subcategory: String,
    pub goal: String,
    /// Monthly income in rupees
    pub income: i64,
}

impl SuggestionRequest {
    /// Reject requests that must never reach the LLM
    pub fn validate(&self) -> Result<()> {
        if self.income <= 0 {
            return Err(Error::Validation(format!(
                "income must be greater than 0, got {}",
                self.income
            )));
        }
        Ok(())
    }
}

/// Response of `POST /classify`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub merchant: String,
    /// Search-derived description; empty when the search provider failed
    pub description: String,
    pub general_category: String,
    pub subcategory: String,
    pub details: CategoryDetail,
}

/// One entry of a beautified suggestion
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuggestionItem {
    pub title: String,
    pub description: String,
}

/// Envelope returned when the beautifier output is not parseable
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BeautifyFailure {
    pub error: String,
    /// The beautifier text exactly as returned (trimmed)
    pub raw: String,
}

/// Result of the suggestion pipeline
///
/// Serializes to either the parsed JSON value or the `{error, raw}` envelope.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SuggestionOutcome {
    Parsed(Value),
    Failed(BeautifyFailure),
}

impl SuggestionOutcome {
    pub fn failed(raw: impl Into<String>) -> Self {
        Self::Failed(BeautifyFailure {
            error: BEAUTIFY_PARSE_ERROR.to_string(),
            raw: raw.into(),
        })
    }

    pub fn is_parsed(&self) -> bool {
        matches!(self, Self::Parsed(_))
    }

    /// Interpret the parsed value as suggestion items, if it has that shape
    pub fn items(&self) -> Option<Vec<SuggestionItem>> {
        match self {
            Self::Parsed(value) => serde_json::from_value(value.clone()).ok(),
            Self::Failed(_) => None,
        }
    }
}
