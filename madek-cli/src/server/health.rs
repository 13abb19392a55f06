//! Health check endpoint

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;

use crate::AppState;

/// Liveness plus the upstream this server compiles from
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    /// Madek API base address, without trailing slash
    pub api_address: String,
    /// Tags, keywords and people resolved so far in this session
    pub cached_references: usize,
    pub response_cache: bool,
}

/// GET /health
///
/// Never contacts the upstream API.
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        api_address: state.client.address().to_string(),
        cached_references: state.client.cache().len(),
        response_cache: state.cache_enabled,
    })
}

pub fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
