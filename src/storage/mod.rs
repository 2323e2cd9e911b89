//! Image asset storage backed by an S3-compatible object store
//!
//! Assets live under `{kind}/{id}.png` in one bucket. The single-fetch path
//! surfaces a missing object as NotFound (the web layer turns that into a
//! 404); the batch existence path folds every storage error into
//! `exists=false` with a logged warning, because a batch probe must never
//! fail the whole aggregation.

use std::sync::Arc;

use bytes::Bytes;
use futures::future::join_all;
use object_store::aws::AmazonS3Builder;
use object_store::path::Path as ObjectPath;
use object_store::ObjectStore;
use tracing::warn;

use crate::config::StorageConfig;
use crate::errors::{AppError, AppResult};
use crate::models::{ImageExistence, TypedId};

/// Object-store front for image assets.
#[derive(Clone)]
pub struct ImageStorage {
    store: Arc<dyn ObjectStore>,
}

impl ImageStorage {
    /// Connect to the configured S3-compatible endpoint (MinIO in practice).
    pub fn from_config(config: &StorageConfig) -> AppResult<Self> {
        let store = AmazonS3Builder::new()
            .with_endpoint(&config.endpoint)
            .with_bucket_name(&config.bucket)
            .with_access_key_id(&config.access_key)
            .with_secret_access_key(&config.secret_key)
            .with_region("us-east-1")
            .with_allow_http(config.allow_http)
            .build()?;

        Ok(Self {
            store: Arc::new(store),
        })
    }

    /// Wrap an existing store; used by tests with the in-memory backend.
    pub fn new(store: Arc<dyn ObjectStore>) -> Self {
        Self { store }
    }

    /// Cheap reachability probe used by the readiness endpoint.
    pub async fn probe(&self) -> AppResult<()> {
        self.store.list_with_delimiter(None).await?;
        Ok(())
    }

    fn object_path(typed_id: TypedId) -> ObjectPath {
        ObjectPath::from(format!("{}/{}.png", typed_id.kind, typed_id.id))
    }

    /// Fetch the full image bytes; NotFound when the object is absent.
    pub async fn fetch_image(&self, typed_id: TypedId) -> AppResult<Bytes> {
        let path = Self::object_path(typed_id);

        match self.store.get(&path).await {
            Ok(result) => Ok(result.bytes().await?),
            Err(object_store::Error::NotFound { .. }) => Err(AppError::not_found(
                "image",
                format!("{}:{}", typed_id.kind, typed_id.id),
            )),
            Err(e) => Err(AppError::from(e)),
        }
    }

    /// Probe every input concurrently, preserving input order.
    ///
    /// A missing object is a normal negative result; any other storage error
    /// is logged and also reported as `exists=false`, never surfaced.
    pub async fn check_exists(&self, items: &[TypedId]) -> Vec<ImageExistence> {
        let probes = items.iter().map(|&typed_id| {
            let store = Arc::clone(&self.store);
            async move {
                let path = Self::object_path(typed_id);
                let exists = match store.head(&path).await {
                    Ok(_) => true,
                    Err(object_store::Error::NotFound { .. }) => false,
                    Err(e) => {
                        warn!("Storage error probing {}: {}", path, e);
                        false
                    }
                };
                ImageExistence { typed_id, exists }
            }
        });

        join_all(probes).await
    }
}
