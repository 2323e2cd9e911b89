use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use drop_search::{
    cache::CacheStore,
    config::Config,
    storage::ImageStorage,
    web::{image_router, ImageState, WebServer},
};

/// Cache key prefix for this service in the shared Redis backend.
const CACHE_PREFIX: &str = "image";

#[derive(Parser)]
#[command(name = "image-retriever")]
#[command(version = "0.1.0")]
#[command(about = "Cache-fronted image retrieval from object storage")]
struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    /// Listening IP address
    #[arg(short = 'H', long, value_name = "IP")]
    host: Option<String>,

    /// Listening port
    #[arg(short, long, value_name = "PORT")]
    port: Option<u16>,

    /// Log level
    #[arg(short = 'v', long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_filter = format!("drop_search={0},image_retriever={0}", cli.log_level);
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| log_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting image retriever v{}", env!("CARGO_PKG_VERSION"));

    std::env::set_var("CONFIG_FILE", &cli.config);
    let mut config = Config::load()?;
    info!("Configuration loaded from: {}", cli.config);

    if let Some(host) = cli.host {
        config.web.host = host;
    }
    if let Some(port) = cli.port {
        config.web.port = port;
    }

    let storage = ImageStorage::from_config(&config.storage)
        .map_err(|e| anyhow::anyhow!("Failed to configure object storage: {e}"))?;
    info!("Connected to object storage at {}", config.storage.endpoint);

    let cache = if config.cache.enabled {
        let mut store = CacheStore::new(
            &config.cache.url,
            CACHE_PREFIX,
            Duration::from_secs(config.cache.ttl_seconds),
        );
        store.connect().await;
        Some(store)
    } else {
        info!("Cache is disabled");
        None
    };

    let mut cache_shutdown = cache.clone();

    let app = image_router(ImageState { cache, storage });
    let server = WebServer::new(&config.web, app)?;

    info!(
        "Starting web server on {}:{}",
        server.host(),
        server.port()
    );
    server.serve().await?;

    if let Some(cache) = cache_shutdown.as_mut() {
        cache.close();
    }
    Ok(())
}
