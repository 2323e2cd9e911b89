//! Drop-repo HTTP handlers

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;
use serde_json::json;
use tracing::{error, info};

use crate::database::Database;
use crate::errors::{AppError, AppResult};
use crate::models::{
    DropExistenceRequest, DropExistenceResponse, DropFields, DropRecord, IdKind, TypedId,
};
use crate::repositories::DropRepository;

/// Shared state for the drop-repo handlers.
#[derive(Clone)]
pub struct DropRepoState {
    pub repository: DropRepository,
    pub database: Database,
}

#[derive(Debug, Deserialize)]
pub struct SearchDropsQuery {
    pub query: i64,
    pub query_type: IdKind,
}

/// Search drops by mob or item id.
pub async fn search_drops(
    Query(params): Query<SearchDropsQuery>,
    State(state): State<DropRepoState>,
) -> AppResult<Json<Vec<DropRecord>>> {
    info!(
        "Searching drops: query={}, type={}",
        params.query, params.query_type
    );

    let typed_id = TypedId::new(params.query_type, params.query);
    let drops = state.repository.search_drops(typed_id).await?;

    info!("Found {} results for query={}", drops.len(), params.query);
    Ok(Json(drops))
}

/// Get a single drop record by id.
pub async fn get_drop(
    Path(id): Path<i64>,
    State(state): State<DropRepoState>,
) -> AppResult<Json<DropRecord>> {
    let drop = state
        .repository
        .get_drop(id)
        .await?
        .ok_or_else(|| AppError::not_found("drop record", id.to_string()))?;

    Ok(Json(drop))
}

/// Add a new drop record.
pub async fn add_drop(
    State(state): State<DropRepoState>,
    Json(fields): Json<DropFields>,
) -> AppResult<Json<serde_json::Value>> {
    let id = state.repository.create_drop(&fields).await?;

    info!("Added drop record: id={}", id);
    Ok(Json(json!({
        "message": "Drop data added successfully",
        "id": id,
    })))
}

/// Update an existing drop record.
pub async fn update_drop(
    Path(id): Path<i64>,
    State(state): State<DropRepoState>,
    Json(fields): Json<DropFields>,
) -> AppResult<Json<serde_json::Value>> {
    state.repository.update_drop(id, &fields).await?;

    info!("Updated drop record: id={}", id);
    Ok(Json(json!({
        "message": "Drop data updated successfully",
        "id": id,
    })))
}

/// Delete a drop record.
pub async fn delete_drop(
    Path(id): Path<i64>,
    State(state): State<DropRepoState>,
) -> AppResult<Json<serde_json::Value>> {
    state.repository.delete_drop(id).await?;

    info!("Deleted drop record: id={}", id);
    Ok(Json(json!({
        "message": "Drop data deleted successfully",
        "id": id,
    })))
}

/// Batch drop-existence check.
pub async fn check_drops_exist(
    State(state): State<DropRepoState>,
    Json(request): Json<DropExistenceRequest>,
) -> AppResult<Json<DropExistenceResponse>> {
    info!("Checking existence of {} items", request.items.len());

    let results = state.repository.check_existence(&request.items).await?;
    Ok(Json(DropExistenceResponse { results }))
}

/// Readiness probe; 503 when MySQL is unreachable.
pub async fn readiness(
    State(state): State<DropRepoState>,
) -> AppResult<Json<serde_json::Value>> {
    if let Err(e) = state.database.ping().await {
        error!("MySQL health check failed: {}", e);
        return Err(AppError::downstream(
            axum::http::StatusCode::SERVICE_UNAVAILABLE,
            "MySQL unavailable",
        ));
    }

    Ok(Json(json!({
        "status": "ready",
        "mysql": "connected",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    })))
}
