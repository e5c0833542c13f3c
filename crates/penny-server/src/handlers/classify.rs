//! Merchant classification handler

use std::sync::Arc;

use axum::{extract::rejection::JsonRejection, extract::State, Json};

use crate::{AppError, AppState};
use penny_core::{ClassificationResult, MerchantRequest};

/// POST /classify - Classify a merchant into the taxonomy
///
/// Search failures degrade to an empty description; LLM failures are a 500.
pub async fn classify(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<MerchantRequest>, JsonRejection>,
) -> Result<Json<ClassificationResult>, AppError> {
    let Json(request) = payload.map_err(AppError::rejected)?;

    let result =
        penny_core::classify_merchant(&state.ai, &state.search, &state.taxonomy, &request.merchant)
            .await
            .map_err(AppError::from_core)?;

    Ok(Json(result))
}
