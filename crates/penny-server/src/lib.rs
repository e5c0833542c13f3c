//! Penny Web Server
//!
//! Axum-based REST API for merchant classification and spending advice.
//!
//! Routes:
//! - `POST /classify`: classify a merchant into the taxonomy
//! - `POST /suggest-alternate`: goal-aligned spending alternative
//! - `GET /health`: backend and taxonomy status

use std::sync::Arc;

use axum::{
    extract::rejection::JsonRejection,
    http::{header, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{error, info, warn};

use penny_core::ai::{AIBackend, AIClient};
use penny_core::search::{SearchClient, SearchProvider};
use penny_core::Taxonomy;

mod handlers;

/// Server configuration
#[derive(Clone, Default)]
pub struct ServerConfig {
    /// Allowed CORS origins (empty = any origin)
    pub allowed_origins: Vec<String>,
}

impl ServerConfig {
    /// Read `PENNY_ALLOWED_ORIGINS` (comma-separated)
    pub fn from_env() -> Self {
        let allowed_origins = std::env::var("PENNY_ALLOWED_ORIGINS")
            .map(|v| {
                v.split(',')
                    .map(|o| o.trim().to_string())
                    .filter(|o| !o.is_empty())
                    .collect()
            })
            .unwrap_or_default();
        Self { allowed_origins }
    }
}

/// Shared application state
///
/// Read-only after startup; nothing here is written per request.
pub struct AppState {
    pub taxonomy: Arc<Taxonomy>,
    pub ai: AIClient,
    pub search: SearchClient,
}

/// Create the application router with backends from the environment
pub fn create_router(taxonomy: Taxonomy, config: ServerConfig) -> Router {
    let ai = AIClient::from_env();
    let search = SearchClient::from_env();
    create_router_with_clients(taxonomy, ai, search, config)
}

/// Create the application router with explicit backends (for testing)
pub fn create_router_with_clients(
    taxonomy: Taxonomy,
    ai: AIClient,
    search: SearchClient,
    config: ServerConfig,
) -> Router {
    let router_info = ai.router_info();
    info!(
        "AI backend configured: {} {} (default model: {})",
        ai.backend_name(),
        ai.host(),
        router_info.default_model
    );
    for (task, model) in &router_info.task_models {
        info!("  - {}: {}", task, model);
    }
    info!("Search provider configured: {}", search.name());

    let state = Arc::new(AppState {
        taxonomy: Arc::new(taxonomy),
        ai,
        search,
    });

    let cors = if config.allowed_origins.is_empty() {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers([header::CONTENT_TYPE])
    } else {
        let origins: Vec<HeaderValue> = config
            .allowed_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers([header::CONTENT_TYPE])
    };

    Router::new()
        .route("/classify", post(handlers::classify))
        .route("/suggest-alternate", post(handlers::suggest_alternate))
        .route("/health", get(handlers::health))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

/// Start the server
pub async fn serve(taxonomy: Taxonomy, host: &str, port: u16) -> anyhow::Result<()> {
    serve_with_config(taxonomy, host, port, ServerConfig::from_env()).await
}

/// Start the server with custom configuration
pub async fn serve_with_config(
    taxonomy: Taxonomy,
    host: &str,
    port: u16,
    config: ServerConfig,
) -> anyhow::Result<()> {
    info!(
        "Taxonomy loaded: {} categories, {} subcategories",
        taxonomy.category_count(),
        taxonomy.subcategory_count()
    );

    check_ai_connection().await;

    let app = create_router(taxonomy, config);
    let addr = format!("{}:{}", host, port);

    info!("Starting server at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Check and log AI backend connection status
async fn check_ai_connection() {
    let client = AIClient::from_env();
    if client.health_check().await {
        info!(
            "AI backend connected: {} (model: {})",
            client.host(),
            client.model()
        );
    } else {
        warn!(
            "AI backend not responding: {} (model: {}). Requests will fail until it is reachable",
            client.host(),
            client.model()
        );
    }
}

// ============================================================================
// Error Handling
// ============================================================================

/// Application error type with proper HTTP status codes
pub struct AppError {
    status: StatusCode,
    message: String,
    internal: Option<anyhow::Error>,
}

impl AppError {
    pub fn unprocessable(msg: &str) -> Self {
        Self {
            status: StatusCode::UNPROCESSABLE_ENTITY,
            message: msg.to_string(),
            internal: None,
        }
    }

    /// Keep axum's status for a rejected JSON body, with a JSON error body
    pub fn rejected(rejection: JsonRejection) -> Self {
        Self {
            status: rejection.status(),
            message: rejection.body_text(),
            internal: None,
        }
    }

    /// Map a core error, surfacing validation failures as 422
    pub fn from_core(err: penny_core::Error) -> Self {
        match err {
            penny_core::Error::Validation(msg) => Self::unprocessable(&msg),
            other => other.into(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Log the full internal error if present
        if let Some(err) = &self.internal {
            error!(error = %err, "Internal error");
        }

        let body = Json(serde_json::json!({
            "error": self.message
        }));

        (self.status, body).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        let err = err.into();
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            // Return generic message to client
            message: "An internal error occurred".to_string(),
            // Keep full error for logging
            internal: Some(err),
        }
    }
}

#[cfg(test)]
mod tests;
