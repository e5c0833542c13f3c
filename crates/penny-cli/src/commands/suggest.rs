//! Suggestion command implementation

use anyhow::{Context, Result};
use penny_core::{suggest_alternate, AIClient, SuggestionOutcome, SuggestionRequest};

/// Generate alternatives for one transaction using the backend from the environment
pub async fn cmd_suggest(request: &SuggestionRequest) -> Result<()> {
    let ai = AIClient::from_env();

    let outcome = suggest_with(&ai, request).await?;
    if !outcome.is_parsed() {
        eprintln!("⚠️  Model output was not valid JSON; printing the raw envelope");
    }
    println!("{}", serde_json::to_string_pretty(&outcome)?);

    Ok(())
}

/// Run the suggestion pipeline with an explicit backend
pub async fn suggest_with(ai: &AIClient, request: &SuggestionRequest) -> Result<SuggestionOutcome> {
    suggest_alternate(ai, request)
        .await
        .with_context(|| format!("Failed to suggest alternatives for \"{}\"", request.merchant))
}
