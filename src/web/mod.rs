//! Web layer
//!
//! Thin axum handlers per service, organized under `handlers/`, plus the
//! shared [`WebServer`] wrapper that binds a router to the configured
//! address. Each service binary assembles its own router and state:
//!
//! - the search aggregator (cache-aside search and existence aggregation)
//! - the drop repo (drop CRUD and batch drop-existence)
//! - the image retriever (cache-aside image fetch and batch image-existence)

use anyhow::Result;
use axum::{
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::config::WebConfig;

pub mod handlers;

pub use handlers::drops::DropRepoState;
pub use handlers::images::ImageState;
pub use handlers::search::SearchState;

/// Router for the search aggregator service.
pub fn search_router(state: SearchState) -> Router {
    Router::new()
        .route("/search/:name", get(handlers::search::search_with_cache))
        .route(
            "/api/search/drops-augmented",
            get(handlers::search::search_drops_augmented),
        )
        .route(
            "/api/existence-check/:name",
            get(handlers::search::existence_check),
        )
        .route("/health/ready", get(handlers::search::readiness))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Router for the drop-repo service.
pub fn drop_repo_router(state: DropRepoState) -> Router {
    Router::new()
        .route("/api/search_drops", get(handlers::drops::search_drops))
        .route("/get_drop/:id", get(handlers::drops::get_drop))
        .route("/add_drop", post(handlers::drops::add_drop))
        .route("/update_drop/:id", axum::routing::put(handlers::drops::update_drop))
        .route(
            "/delete_drop/:id",
            axum::routing::delete(handlers::drops::delete_drop),
        )
        .route("/api/drops/exist", post(handlers::drops::check_drops_exist))
        .route("/health/ready", get(handlers::drops::readiness))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Router for the image-retriever service.
pub fn image_router(state: ImageState) -> Router {
    Router::new()
        .route("/images/:image_type/:id", get(handlers::images::get_image))
        .route(
            "/api/images/exist",
            post(handlers::images::check_images_exist),
        )
        .route("/health/ready", get(handlers::images::readiness))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Web server configuration and setup
pub struct WebServer {
    app: Router,
    addr: SocketAddr,
}

impl WebServer {
    pub fn new(config: &WebConfig, app: Router) -> Result<Self> {
        let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
        Ok(Self { app, addr })
    }

    /// Start the web server
    pub async fn serve(self) -> Result<()> {
        let listener = tokio::net::TcpListener::bind(&self.addr).await?;
        axum::serve(listener, self.app).await?;
        Ok(())
    }

    /// Get the host address
    pub fn host(&self) -> String {
        self.addr.ip().to_string()
    }

    /// Get the port number
    pub fn port(&self) -> u16 {
        self.addr.port()
    }
}
