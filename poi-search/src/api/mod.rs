//! HTTP API handlers for poi-search

pub mod categories;
pub mod cors;
pub mod facilities;
pub mod health;
pub mod params;

pub use categories::search_by_category;
pub use cors::{cors_layer, preflight_no_content};
pub use facilities::search_facilities;
pub use health::health_routes;

use axum::{routing::get, Router};

use crate::AppState;

/// Build search routes
pub fn search_routes() -> Router<AppState> {
    Router::new()
        .route("/api/facilities", get(search_facilities))
        .route(
            "/api/category-search",
            get(search_by_category).post(search_by_category),
        )
}
