//! Image-retriever HTTP handlers
//!
//! The single-image fetch is cache-fronted the same way the search entry
//! point is: cached bytes are served directly, a miss reads from the object
//! store and schedules a detached write-back.

use axum::extract::{Path, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tracing::{error, info};

use crate::cache::CacheStore;
use crate::errors::{AppError, AppResult};
use crate::models::{IdKind, ImageExistenceRequest, ImageExistenceResponse, TypedId};
use crate::storage::ImageStorage;

/// Shared state for the image-retriever handlers.
#[derive(Clone)]
pub struct ImageState {
    /// None when caching is disabled by configuration.
    pub cache: Option<CacheStore>,
    pub storage: ImageStorage,
}

impl ImageState {
    fn connected_cache(&self) -> Option<&CacheStore> {
        self.cache.as_ref().filter(|cache| cache.is_connected())
    }
}

fn png_bytes(bytes: Vec<u8>) -> Response {
    ([(header::CONTENT_TYPE, "image/png")], bytes).into_response()
}

/// Retrieve an image by type and id, cache-aside against the object store.
pub async fn get_image(
    Path((image_type, id)): Path<(String, i64)>,
    State(state): State<ImageState>,
) -> AppResult<Response> {
    let kind: IdKind = image_type
        .parse()
        .map_err(|_| AppError::validation(format!("Unknown image type: {image_type}")))?;
    let typed_id = TypedId::new(kind, id);
    let cache_key = format!("{}:{}", kind, id);

    if let Some(cache) = state.connected_cache() {
        if let Some(cached) = cache.get(&cache_key).await {
            info!("Cache hit for {}", cache_key);
            return Ok(png_bytes(cached));
        }
    }

    let data = state.storage.fetch_image(typed_id).await?;
    info!("Fetched {} from object storage", cache_key);

    if let Some(cache) = state.connected_cache().cloned() {
        let payload = data.to_vec();
        tokio::spawn(async move {
            cache.set(&cache_key, &payload, None).await;
        });
    }

    Ok(png_bytes(data.to_vec()))
}

/// Batch image-existence check against the object store.
pub async fn check_images_exist(
    State(state): State<ImageState>,
    Json(request): Json<ImageExistenceRequest>,
) -> Json<ImageExistenceResponse> {
    let results = state.storage.check_exists(&request.images).await;
    Json(ImageExistenceResponse { results })
}

/// Readiness probe; 503 when the object store is unreachable.
pub async fn readiness(State(state): State<ImageState>) -> AppResult<Json<serde_json::Value>> {
    if let Err(e) = state.storage.probe().await {
        error!("Object storage health check failed: {}", e);
        return Err(AppError::downstream(
            axum::http::StatusCode::SERVICE_UNAVAILABLE,
            "Object storage unavailable",
        ));
    }

    let cache_status = match &state.cache {
        None => "disabled",
        Some(cache) if cache.is_connected() => "connected",
        Some(_) => "disconnected",
    };

    Ok(Json(json!({
        "status": "ready",
        "storage": "connected",
        "cache": cache_status,
        "timestamp": chrono::Utc::now().to_rfc3339(),
    })))
}
