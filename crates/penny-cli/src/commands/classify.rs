//! Classification command implementation

use std::path::Path;

use anyhow::{Context, Result};
use penny_core::{classify_merchant, AIClient, ClassificationResult, SearchClient, Taxonomy};

use super::load_taxonomy;

/// Classify one merchant using backends from the environment
pub async fn cmd_classify(taxonomy_path: &Path, merchant: &str) -> Result<()> {
    let taxonomy = load_taxonomy(taxonomy_path)?;
    let ai = AIClient::from_env();
    let search = SearchClient::from_env();

    let result = classify_with(&ai, &search, &taxonomy, merchant).await?;
    println!("{}", serde_json::to_string_pretty(&result)?);

    Ok(())
}

/// Run the classification pipeline with explicit backends
pub async fn classify_with(
    ai: &AIClient,
    search: &SearchClient,
    taxonomy: &Taxonomy,
    merchant: &str,
) -> Result<ClassificationResult> {
    classify_merchant(ai, search, taxonomy, merchant)
        .await
        .with_context(|| format!("Failed to classify \"{}\"", merchant))
}
