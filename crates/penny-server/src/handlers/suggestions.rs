//! Spending-alternative suggestion handler

use std::sync::Arc;

use axum::{extract::rejection::JsonRejection, extract::State, Json};

use crate::{AppError, AppState};
use penny_core::{SuggestionOutcome, SuggestionRequest};

/// POST /suggest-alternate - Goal-aligned alternative for a transaction
///
/// Returns the parsed suggestion array, or `{error, raw}` with 200 when the
/// beautified text could not be parsed.
pub async fn suggest_alternate(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<SuggestionRequest>, JsonRejection>,
) -> Result<Json<SuggestionOutcome>, AppError> {
    let Json(request) = payload.map_err(AppError::rejected)?;

    // Reject before any external call
    request.validate().map_err(AppError::from_core)?;

    let outcome = penny_core::suggest_alternate(&state.ai, &request)
        .await
        .map_err(AppError::from_core)?;

    Ok(Json(outcome))
}
