//! HTTP clients for the downstream services the aggregator fans out to
//!
//! Each downstream dependency sits behind a trait so the orchestrator can be
//! exercised against fakes; the reqwest-backed implementations live in the
//! submodules. All clients share one [`reqwest::Client`] carrying the
//! configured request timeout, so a hung downstream fails fast instead of
//! stalling the whole aggregation.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use axum::http::StatusCode;

use crate::errors::{AppError, AppResult};
use crate::models::{DropExistence, DropRecord, IdKind, ImageExistence, TypedId};

pub mod drops;
pub mod identity;
pub mod images;

pub use drops::HttpDropService;
pub use identity::HttpNameResolver;
pub use images::HttpImageService;

/// Name resolution against the identity store.
#[async_trait]
pub trait NameResolver: Send + Sync {
    /// Exact-match lookup of a single name. `None` means "no such name",
    /// which is a valid empty result, not an error. When a name maps to
    /// several records the store's own pick wins; no tie-break is applied.
    async fn resolve_name_to_id(&self, name: &str) -> AppResult<Option<TypedId>>;

    /// Batch id-to-name lookup within one keyspace. Empty input returns an
    /// empty map without issuing a request.
    async fn resolve_ids_to_names(
        &self,
        ids: &[i64],
        kind: IdKind,
    ) -> AppResult<HashMap<String, String>>;

    /// Every (kind, id) pair sharing the given name. An empty name returns
    /// an empty list without issuing a request.
    async fn ids_for_name(&self, name: &str) -> AppResult<Vec<TypedId>>;
}

/// Drop lookups against the drop repository service.
#[async_trait]
pub trait DropService: Send + Sync {
    async fn search_drops(&self, typed_id: TypedId) -> AppResult<Vec<DropRecord>>;

    /// Batch existence check; empty input short-circuits with no request.
    async fn check_drops_exist(&self, items: &[TypedId]) -> AppResult<Vec<DropExistence>>;
}

/// Image existence checks against the image retriever service.
#[async_trait]
pub trait ImageService: Send + Sync {
    /// Batch existence check; empty input short-circuits with no request.
    async fn check_images_exist(&self, items: &[TypedId]) -> AppResult<Vec<ImageExistence>>;
}

/// Build the shared HTTP client with the configured downstream timeout.
pub fn build_http_client(timeout: Duration) -> AppResult<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(AppError::from)
}

/// Map a non-success downstream response to [`AppError::Downstream`],
/// keeping the original status and body text.
pub(crate) async fn expect_success(
    response: reqwest::Response,
) -> AppResult<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    tracing::error!("Downstream service error: {} - {}", status, body);
    Err(AppError::downstream(
        StatusCode::from_u16(status.as_u16()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
        body,
    ))
}
