//! poi-search library interface
//!
//! Nearby facility search over OpenStreetMap data: Overpass for the data,
//! OSRM for driving distances, and an external keyword analysis service for
//! free-text searches. Exposed as a library so integration tests can build
//! the router directly.

pub mod api;
pub mod error;
pub mod services;
pub mod types;

pub use crate::error::{ApiError, ApiResult};

use axum::Router;
use chrono::{DateTime, Utc};
use poi_common::config::{SearchConfig, TomlConfig};
use std::sync::Arc;

use services::{
    CategoryDictionary, DistanceEnricher, KeywordClient, OverpassClient, QueryBuilder,
    RoutingClient,
};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub overpass: Arc<OverpassClient>,
    pub enricher: Arc<DistanceEnricher>,
    pub keywords: Arc<KeywordClient>,
    /// Loaded once at startup, read-only afterwards
    pub dictionary: Arc<CategoryDictionary>,
    pub query_builder: QueryBuilder,
    /// Request defaults (radius, amenities)
    pub search: Arc<SearchConfig>,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    /// Build clients from validated configuration
    pub fn from_config(
        config: &TomlConfig,
        dictionary: CategoryDictionary,
    ) -> poi_common::Result<Self> {
        let overpass = OverpassClient::new(&config.overpass.url, config.overpass.timeout_secs)
            .map_err(|e| poi_common::Error::Config(e.to_string()))?;
        let routing = RoutingClient::new(&config.routing.url, &config.routing.profile)
            .map_err(|e| poi_common::Error::Config(e.to_string()))?;
        let keywords = KeywordClient::new(&config.keyword.url)
            .map_err(|e| poi_common::Error::Config(e.to_string()))?;

        Ok(Self {
            overpass: Arc::new(overpass),
            enricher: Arc::new(DistanceEnricher::new(routing)),
            keywords: Arc::new(keywords),
            dictionary: Arc::new(dictionary),
            query_builder: QueryBuilder::new(config.overpass.timeout_secs),
            search: Arc::new(config.search.clone()),
            startup_time: Utc::now(),
        })
    }
}

/// Build application router
///
/// CORS and preflight handling wrap every route, including `/health`.
pub fn build_router(state: AppState) -> Router {
    use axum::middleware;
    use tower_http::trace::TraceLayer;

    Router::new()
        .merge(api::search_routes())
        .merge(api::health_routes())
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(api::cors_layer())
        .layer(middleware::from_fn(api::preflight_no_content))
}
