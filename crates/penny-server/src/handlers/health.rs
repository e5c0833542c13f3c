//! Health check handler

use std::sync::Arc;

use axum::{extract::State, Json};
use serde::Serialize;

use crate::AppState;
use penny_core::ai::AIBackend;
use penny_core::search::SearchProvider;

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub ai_backend: &'static str,
    pub ai_model: String,
    pub ai_available: bool,
    pub search_provider: String,
    pub categories: usize,
    pub subcategories: usize,
}

/// GET /health - Backend availability and taxonomy size
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let ai_available = state.ai.health_check().await;

    Json(HealthResponse {
        status: "ok",
        ai_backend: state.ai.backend_name(),
        ai_model: state.ai.model().to_string(),
        ai_available,
        search_provider: state.search.name().to_string(),
        categories: state.taxonomy.category_count(),
        subcategories: state.taxonomy.subcategory_count(),
    })
}
