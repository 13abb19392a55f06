//! Compilation endpoints

use axum::{
    extract::{Path, Query, State},
    Json,
};
use madek_compiler::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::future::Future;
use tracing::debug;
use uuid::Uuid;

use super::cache::ResourceKind;
use super::error::{ApiError, ApiResult};
use crate::AppState;

/// Query parameters shared by the compilation endpoints
#[derive(Debug, Default, Deserialize)]
pub struct CompileParams {
    /// `yes` skips the response cache
    pub fresh: Option<String>,
}

impl CompileParams {
    pub fn is_fresh(&self) -> bool {
        self.fresh.as_deref() == Some("yes")
    }
}

/// GET /:id
pub async fn get_collection(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(params): Query<CompileParams>,
) -> ApiResult<Json<Value>> {
    serve(&state, ResourceKind::Collection, &id, params.is_fresh(), |client, id| async move {
        client.compile_collection(&id).await
    })
    .await
}

/// GET /media-entries/:id
pub async fn get_media_entry(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(params): Query<CompileParams>,
) -> ApiResult<Json<Value>> {
    serve(&state, ResourceKind::MediaEntry, &id, params.is_fresh(), |client, id| async move {
        client.compile_media_entry(&id).await
    })
    .await
}

/// Answer from the cache or compile, storing the result when caching is on
async fn serve<T, F, Fut>(
    state: &AppState,
    kind: ResourceKind,
    id: &str,
    fresh: bool,
    compile: F,
) -> ApiResult<Json<Value>>
where
    T: Serialize,
    F: FnOnce(Client, String) -> Fut,
    Fut: Future<Output = madek_compiler::Result<T>>,
{
    let id = parse_id(id)?;

    if !fresh {
        if let Some(cached) = state.cache.get(kind, &id).await {
            debug!(id = %id, ?kind, "Serving cached response");
            return Ok(Json(cached.as_ref().clone()));
        }
    }

    let compiled = compile(state.client.clone(), id.clone()).await?;
    let document = serde_json::to_value(&compiled).map_err(|e| ApiError::Internal(e.to_string()))?;

    if state.cache_enabled {
        state.cache.insert(kind, id, document.clone()).await;
    }

    Ok(Json(document))
}

/// Madek ids are UUIDs; anything else never reaches the API
fn parse_id(id: &str) -> ApiResult<String> {
    Uuid::parse_str(id)
        .map(|uuid| uuid.to_string())
        .map_err(|e| ApiError::BadRequest(format!("invalid id {:?}: {}", id, e)))
}
