//! Router-level tests for the image retriever, backed by the in-memory
//! object store.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use bytes::Bytes;
use object_store::memory::InMemory;
use object_store::path::Path as ObjectPath;
use object_store::ObjectStore;
use serde_json::{json, Value};
use tower::ServiceExt;

use drop_search::cache::{CacheStore, InMemoryBackend};
use drop_search::storage::ImageStorage;
use drop_search::web::{image_router, ImageState};

const PNG_BYTES: &[u8] = b"\x89PNG\r\n\x1a\n";

async fn app_with_objects(paths: &[&str]) -> Router {
    let store = InMemory::new();
    for path in paths {
        store
            .put(&ObjectPath::from(*path), Bytes::from_static(PNG_BYTES).into())
            .await
            .unwrap();
    }
    image_router(ImageState {
        cache: None,
        storage: ImageStorage::new(Arc::new(store)),
    })
}

async fn send_json(app: &Router, method: Method, uri: &str, body: Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_string(&body).unwrap()))
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: Value = serde_json::from_slice(&body_bytes).unwrap_or(json!({}));

    (status, body)
}

#[tokio::test]
async fn get_image_serves_stored_bytes_as_png() {
    let app = app_with_objects(&["mob/100100.png"]).await;

    let request = Request::builder()
        .uri("/images/mob/100100")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        "image/png"
    );
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(body.as_ref(), PNG_BYTES);
}

#[tokio::test]
async fn get_image_returns_404_for_a_missing_object() {
    let app = app_with_objects(&[]).await;

    let request = Request::builder()
        .uri("/images/mob/100100")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn get_image_rejects_an_unknown_image_type() {
    let app = app_with_objects(&["mob/100100.png"]).await;

    let request = Request::builder()
        .uri("/images/npc/100100")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

async fn cached_app_with_objects(paths: &[&str]) -> (Router, CacheStore) {
    let store = InMemory::new();
    for path in paths {
        store
            .put(&ObjectPath::from(*path), Bytes::from_static(PNG_BYTES).into())
            .await
            .unwrap();
    }
    let cache = CacheStore::with_backend(
        Arc::new(InMemoryBackend::default()),
        "image",
        Duration::from_secs(3600),
    );
    let app = image_router(ImageState {
        cache: Some(cache.clone()),
        storage: ImageStorage::new(Arc::new(store)),
    });
    (app, cache)
}

#[tokio::test]
async fn cache_hit_serves_the_image_without_touching_storage() {
    // Empty object store: only the cache can satisfy the request.
    let (app, cache) = cached_app_with_objects(&[]).await;
    cache.set("mob:100100", PNG_BYTES, None).await;

    let request = Request::builder()
        .uri("/images/mob/100100")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(body.as_ref(), PNG_BYTES);
}

#[tokio::test]
async fn cache_miss_fetches_from_storage_and_writes_back() {
    let (app, cache) = cached_app_with_objects(&["mob/100100.png"]).await;

    let request = Request::builder()
        .uri("/images/mob/100100")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // The write-back runs on a detached task after the response; wait for it.
    let mut written = None;
    for _ in 0..100 {
        written = cache.get("mob:100100").await;
        if written.is_some() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert_eq!(written.expect("cache write-back never landed"), PNG_BYTES);
}

#[tokio::test]
async fn existence_check_reports_per_item_flags_in_order() {
    let app = app_with_objects(&["item/2000001.png"]).await;

    let (status, body) = send_json(
        &app,
        Method::POST,
        "/api/images/exist",
        json!({
            "images": [
                {"type": "mob", "id": 100100},
                {"type": "item", "id": 2000001},
            ]
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["results"],
        json!([
            {"type": "mob", "id": 100100, "image_exist": false},
            {"type": "item", "id": 2000001, "image_exist": true},
        ])
    );
}

#[tokio::test]
async fn existence_check_with_no_items_is_empty() {
    let app = app_with_objects(&[]).await;

    let (status, body) =
        send_json(&app, Method::POST, "/api/images/exist", json!({"images": []})).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["results"], json!([]));
}

#[tokio::test]
async fn readiness_reports_storage_and_cache_state() {
    let app = app_with_objects(&[]).await;

    let request = Request::builder()
        .uri("/health/ready")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: Value = serde_json::from_slice(&body_bytes).unwrap();
    assert_eq!(body["status"], "ready");
    assert_eq!(body["storage"], "connected");
    assert_eq!(body["cache"], "disabled");
}
