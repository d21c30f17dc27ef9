//! Index and health check handlers.

use crate::models::{HealthResponse, IndexResponse};
use crate::routes::AppState;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use std::sync::Arc;

/// Handler for GET /
pub async fn index() -> Json<IndexResponse> {
    Json(IndexResponse {
        success: true,
        message: "My Coffee shop",
    })
}

/// Handler for GET /health
///
/// Returns 503 with `"unhealthy"` if the drink store cannot be reached.
/// Store errors are logged, never returned.
#[tracing::instrument(skip_all, name = "drinks.health")]
pub async fn health_check(State(state): State<Arc<AppState>>) -> (StatusCode, Json<HealthResponse>) {
    match state.repo.ping().await {
        Ok(()) => (StatusCode::OK, Json(HealthResponse { status: "healthy" })),
        Err(e) => {
            tracing::warn!(target: "drinks.health", error = %e, "Health check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(HealthResponse {
                    status: "unhealthy",
                }),
            )
        }
    }
}
