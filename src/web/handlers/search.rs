//! Search aggregator HTTP handlers
//!
//! The public search entry point applies the cache-aside pattern: check the
//! cache, on a miss run the orchestration, answer the client, and write the
//! serialized result back to the cache from a detached task so the write can
//! never delay or fail the response.

use axum::extract::{Path, Query, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use crate::cache::CacheStore;
use crate::errors::{AppError, AppResult};
use crate::models::{ExistenceResponse, SearchResponse};
use crate::services::SearchOrchestrator;

/// Shared state for the aggregator handlers.
#[derive(Clone)]
pub struct SearchState {
    /// None when caching is disabled by configuration.
    pub cache: Option<CacheStore>,
    pub orchestrator: SearchOrchestrator,
}

impl SearchState {
    fn connected_cache(&self) -> Option<&CacheStore> {
        self.cache.as_ref().filter(|cache| cache.is_connected())
    }
}

fn json_bytes(bytes: Vec<u8>) -> Response {
    ([(header::CONTENT_TYPE, "application/json")], bytes).into_response()
}

/// Cache-aside augmented drop search, the main public entry point.
pub async fn search_with_cache(
    Path(name): Path<String>,
    State(state): State<SearchState>,
) -> AppResult<Response> {
    let cache_key = name.clone();

    if let Some(cache) = state.connected_cache() {
        if let Some(cached) = cache.get(&cache_key).await {
            info!("Cache hit for {}", name);
            return Ok(json_bytes(cached));
        }
    }

    info!("Cache miss for {}, fetching from aggregator", name);

    let drops = state.orchestrator.search_and_augment(&name).await?;
    let body = serde_json::to_vec(&SearchResponse { data: drops })
        .map_err(|e| AppError::internal(format!("Failed to serialize search response: {e}")))?;

    if let Some(cache) = state.connected_cache().cloned() {
        let payload = body.clone();
        // Detached so the write outlives this handler and a failure stays
        // local to the task; the response below does not wait for it.
        tokio::spawn(async move {
            cache.set(&cache_key, &payload, None).await;
        });
    }

    Ok(json_bytes(body))
}

#[derive(Debug, Deserialize)]
pub struct SearchDropsParams {
    pub name: String,
}

/// Uncached augmented drop search (internal API).
pub async fn search_drops_augmented(
    Query(params): Query<SearchDropsParams>,
    State(state): State<SearchState>,
) -> AppResult<Json<SearchResponse>> {
    if params.name.is_empty() {
        return Err(AppError::validation("name must not be empty"));
    }

    let drops = state.orchestrator.search_and_augment(&params.name).await?;
    Ok(Json(SearchResponse { data: drops }))
}

/// Aggregated image/drop existence check for every id sharing a name.
pub async fn existence_check(
    Path(name): Path<String>,
    State(state): State<SearchState>,
) -> AppResult<Json<ExistenceResponse>> {
    let results = state.orchestrator.aggregate_existence(&name).await?;
    Ok(Json(ExistenceResponse { results }))
}

/// Readiness probe. The cache is optional, so this reports its state but
/// never fails because of it.
pub async fn readiness(State(state): State<SearchState>) -> Json<serde_json::Value> {
    let cache_status = match &state.cache {
        None => "disabled",
        Some(cache) if cache.is_connected() => "connected",
        Some(_) => "disconnected",
    };

    Json(json!({
        "status": "ready",
        "cache": cache_status,
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}
