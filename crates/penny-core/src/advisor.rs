//! Spending-alternative advisor
//!
//! Generates free-text advice, asks the model to reshape it into a JSON array,
//! then parses that leniently. An unparseable or empty reshape is not an
//! error: it comes back as the `{error, raw}` envelope.

use serde_json::Value;
use tracing::{debug, info};

use crate::ai::parsing::safe_parse_json;
use crate::ai::AIBackend;
use crate::error::Result;
use crate::models::{SuggestionOutcome, SuggestionRequest};

/// Run the suggestion pipeline for a validated request
///
/// Requests with `income <= 0` are rejected before any model call.
pub async fn suggest_alternate(
    ai: &dyn AIBackend,
    request: &SuggestionRequest,
) -> Result<SuggestionOutcome> {
    request.validate()?;

    let suggestion = ai.suggest_alternative(request).await?;
    debug!(merchant = %request.merchant, "Raw suggestion: {}", suggestion);

    let beautified = ai.beautify_suggestion(&suggestion).await?;

    let outcome = match safe_parse_json(&beautified) {
        Some(value) if !is_empty_value(&value) => SuggestionOutcome::Parsed(value),
        _ => SuggestionOutcome::failed(beautified),
    };

    info!(
        merchant = %request.merchant,
        parsed = outcome.is_parsed(),
        "Generated spending alternative"
    );

    Ok(outcome)
}

/// Parsed values that carry no suggestions: null, false, zero, "", [] and {}
fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
    }
}
