use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use drop_search::{
    cache::CacheStore,
    clients::{build_http_client, HttpDropService, HttpImageService, HttpNameResolver},
    config::Config,
    services::SearchOrchestrator,
    web::{search_router, SearchState, WebServer},
};

/// Cache key prefix for this service in the shared Redis backend.
const CACHE_PREFIX: &str = "search";

#[derive(Parser)]
#[command(name = "search-aggregator")]
#[command(version = "0.1.0")]
#[command(about = "Cache-aside search aggregation over the drop-data services")]
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

    let log_filter = format!("drop_search={0},search_aggregator={0}", cli.log_level);
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| log_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting search aggregator v{}", env!("CARGO_PKG_VERSION"));

    std::env::set_var("CONFIG_FILE", &cli.config);
    let mut config = Config::load()?;
    info!("Configuration loaded from: {}", cli.config);

    if let Some(host) = cli.host {
        config.web.host = host;
    }
    if let Some(port) = cli.port {
        config.web.port = port;
    }

    let cache = if config.cache.enabled {
        let mut store = CacheStore::new(
            &config.cache.url,
            CACHE_PREFIX,
            Duration::from_secs(config.cache.ttl_seconds),
        );
        // A failed connect is tolerated: the store stays disconnected and
        // every request falls through to the orchestrator.
        store.connect().await;
        Some(store)
    } else {
        info!("Cache is disabled");
        None
    };

    let mut cache_shutdown = cache.clone();

    let http = build_http_client(Duration::from_secs(
        config.downstream.request_timeout_seconds,
    ))?;
    let orchestrator = SearchOrchestrator::new(
        Arc::new(HttpNameResolver::new(
            http.clone(),
            config.downstream.name_resolver_url.clone(),
        )),
        Arc::new(HttpDropService::new(
            http.clone(),
            config.downstream.drop_repo_url.clone(),
        )),
        Arc::new(HttpImageService::new(
            http,
            config.downstream.image_retriever_url.clone(),
        )),
    );

    let app = search_router(SearchState {
        cache,
        orchestrator,
    });
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
