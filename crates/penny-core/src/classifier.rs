//! Merchant classification pipeline
//!
//! search description -> general category -> subcategory -> taxonomy lookup
//!
//! Search failures degrade to an empty description. LLM failures propagate.

use tracing::{debug, info, warn};

use crate::ai::AIBackend;
use crate::error::Result;
use crate::models::ClassificationResult;
use crate::search::SearchProvider;
use crate::taxonomy::{CategoryDetail, Taxonomy, OTHER_CATEGORY, UNKNOWN_SUBCATEGORY};

/// Fetch a short description of a merchant from the search provider
///
/// Never fails: any provider error, or a response without an answer, yields `""`.
pub async fn fetch_merchant_description(search: &dyn SearchProvider, merchant: &str) -> String {
    match search.search(merchant).await {
        Ok(result) => match result.answer {
            Some(answer) => answer,
            None => {
                debug!(merchant = %merchant, "Search returned no answer");
                String::new()
            }
        },
        Err(e) => {
            warn!(
                merchant = %merchant,
                provider = search.name(),
                error = %e,
                "Search failed, continuing with empty description"
            );
            String::new()
        }
    }
}

/// Classify a merchant into the taxonomy
///
/// A general-category answer of "Other", or one that names no taxonomy
/// category, short-circuits to the placeholder without a subcategory call.
/// Subcategory answers are matched exactly; anything else gets the placeholder.
pub async fn classify_merchant(
    ai: &dyn AIBackend,
    search: &dyn SearchProvider,
    taxonomy: &Taxonomy,
    merchant: &str,
) -> Result<ClassificationResult> {
    let description = fetch_merchant_description(search, merchant).await;

    let categories: Vec<&str> = taxonomy.general_categories().collect();
    let general_category = ai
        .classify_general_category(&description, &categories)
        .await?;

    if general_category != OTHER_CATEGORY && !taxonomy.contains_category(&general_category) {
        warn!(
            merchant = %merchant,
            answer = %general_category,
            "General category answer is not in the taxonomy, treating as Other"
        );
    }

    if general_category == OTHER_CATEGORY || !taxonomy.contains_category(&general_category) {
        return Ok(ClassificationResult {
            merchant: merchant.to_string(),
            description,
            general_category: OTHER_CATEGORY.to_string(),
            subcategory: UNKNOWN_SUBCATEGORY.to_string(),
            details: CategoryDetail::unknown(),
        });
    }

    let subcategories = taxonomy.subcategories(&general_category);
    let subcategory = ai
        .classify_subcategory(merchant, &description, &general_category, &subcategories)
        .await?;
    let details = taxonomy.lookup(&general_category, &subcategory);

    info!(
        merchant = %merchant,
        general_category = %general_category,
        subcategory = %subcategory,
        code = details.code,
        "Classified merchant"
    );

    Ok(ClassificationResult {
        merchant: merchant.to_string(),
        description,
        general_category,
        subcategory,
        details,
    })
}
