//! poi-search - Nearby facility search service
//!
//! Proxies proximity searches to the Overpass API, ranks category results by
//! OSRM driving distance, and resolves free-text keywords through the keyword
//! analysis service.

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use poi_common::config::{resolve_config_path, ConfigOverrides, ConfigSource, TomlConfig};
use poi_search::services::CategoryDictionary;
use poi_search::{build_router, AppState};
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Command-line arguments for poi-search
#[derive(Parser, Debug)]
#[command(name = "poi-search")]
#[command(about = "Nearby facility search over OpenStreetMap data")]
#[command(version)]
struct Args {
    /// TOML config file
    #[arg(short, long, env = "POI_SEARCH_CONFIG")]
    config: Option<PathBuf>,

    /// Interface to bind
    #[arg(long, env = "POI_SEARCH_BIND")]
    bind: Option<String>,

    /// Port to listen on
    #[arg(short, long, env = "POI_SEARCH_PORT")]
    port: Option<u16>,

    /// Overpass API interpreter URL
    #[arg(long, env = "POI_SEARCH_OVERPASS_URL")]
    overpass_url: Option<String>,

    /// Overpass request timeout in seconds
    #[arg(long, env = "POI_SEARCH_OVERPASS_TIMEOUT_SECS")]
    overpass_timeout_secs: Option<u64>,

    /// OSRM base URL
    #[arg(long, env = "POI_SEARCH_ROUTING_URL")]
    routing_url: Option<String>,

    /// Keyword analysis service base URL
    #[arg(long, env = "POI_SEARCH_KEYWORD_URL")]
    keyword_url: Option<String>,

    /// Category dictionary CSV (defaults to the built-in dictionary)
    #[arg(long, env = "POI_SEARCH_DICTIONARY")]
    dictionary: Option<PathBuf>,

    /// Log level (RUST_LOG takes precedence)
    #[arg(long, env = "POI_SEARCH_LOG_LEVEL")]
    log_level: Option<String>,
}

impl Args {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            bind: self.bind.clone(),
            port: self.port,
            overpass_url: self.overpass_url.clone(),
            overpass_timeout_secs: self.overpass_timeout_secs,
            routing_url: self.routing_url.clone(),
            keyword_url: self.keyword_url.clone(),
            dictionary_path: self.dictionary.clone(),
            log_level: self.log_level.clone(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config_path = resolve_config_path(args.config.as_deref());
    let (config, source) = TomlConfig::load_or_default(config_path.as_deref())
        .context("Failed to load configuration")?;
    let config = config.with_overrides(args.overrides());

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.logging.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Build identification first, before any slow startup work
    info!(
        "Starting poi-search v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    match &source {
        ConfigSource::File(path) => info!("Loaded config from {}", path.display()),
        ConfigSource::Missing(path) => warn!(
            "Config file {} not found, using defaults and overrides",
            path.display()
        ),
        ConfigSource::Defaults => info!("No config file found, using defaults and overrides"),
    }

    config.validate().context("Invalid configuration")?;
    info!(
        overpass = %config.overpass.url,
        routing = %config.routing.url,
        keyword = %config.keyword.url,
        "Upstream services"
    );

    let loaded = match &config.dictionary.path {
        Some(path) => CategoryDictionary::load(path),
        None => CategoryDictionary::built_in(),
    };
    let dictionary = match loaded {
        Ok(dictionary) => dictionary,
        Err(e) => {
            error!("Failed to load category dictionary: {}", e);
            return Err(e.into());
        }
    };
    if dictionary.is_empty() {
        warn!("Category dictionary is empty; category searches will return no results");
    }

    let state = AppState::from_config(&config, dictionary)
        .context("Failed to initialize service clients")?;
    let app = build_router(state);

    let addr: SocketAddr = format!("{}:{}", config.server.bind, config.server.port)
        .parse()
        .with_context(|| format!("Invalid bind address {}:{}", config.server.bind, config.server.port))?;

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("poi-search listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
