//! Health check endpoint

use axum::{routing::get, Json, Router};
use chrono::Utc;
use serde::Serialize;

use crate::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub ok: bool,
    /// RFC 3339 UTC timestamp
    pub timestamp: String,
}

/// GET /health
///
/// Liveness probe for the quiz frontend; no upstream calls involved.
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        ok: true,
        timestamp: Utc::now().to_rfc3339(),
    })
}

/// Build health check routes
pub fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
