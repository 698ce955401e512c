//! Category search with driving-distance ranking

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    Json,
};
use poi_common::RankedFacility;
use tracing::Instrument;
use uuid::Uuid;

use super::facilities::{fetch_facilities, TermOrigin};
use super::params::{parse_area, split_list, CategoryQuery};
use crate::error::{ApiError, ApiResult};
use crate::AppState;

/// GET|POST /api/category-search?lat=..&lon=..&categories=a,b[&radius=..]
///
/// Categories are resolved through the dictionary; results are ordered by
/// driving distance from the origin, unknown distances last.
pub async fn search_by_category(
    State(state): State<AppState>,
    query: Result<Query<CategoryQuery>, QueryRejection>,
) -> ApiResult<Json<Vec<RankedFacility>>> {
    let Query(query) = query.map_err(|e| ApiError::BadRequest(e.body_text()))?;

    let request_id = Uuid::new_v4();
    let span = tracing::info_span!("category_search", %request_id);
    category_search(state, query).instrument(span).await.map(Json)
}

async fn category_search(state: AppState, query: CategoryQuery) -> ApiResult<Vec<RankedFacility>> {
    let area = parse_area(
        query.lat.as_deref(),
        query.lon.as_deref(),
        query.radius.as_deref(),
        state.search.default_radius,
    )?;

    let categories = query.categories.as_deref().map(split_list).unwrap_or_default();
    if categories.is_empty() {
        return Err(ApiError::BadRequest(
            "categories query parameter is required".to_string(),
        ));
    }

    let expansion = state.dictionary.expand(&categories);
    if !expansion.unknown.is_empty() {
        tracing::info!(unknown = ?expansion.unknown, "Ignoring unknown categories");
    }
    if expansion.terms.is_empty() {
        return Ok(Vec::new());
    }

    tracing::info!(
        origin = %area.origin,
        radius = area.radius,
        categories = ?categories,
        terms = expansion.terms.len(),
        "Searching categories"
    );

    let facilities = fetch_facilities(&state, &area, &expansion.terms, TermOrigin::Internal).await?;
    let ranked = state.enricher.enrich(area.origin, facilities).await;

    tracing::info!(
        results = ranked.len(),
        unrouted = ranked.iter().filter(|r| r.distance.is_none()).count(),
        "Category search complete"
    );
    Ok(ranked)
}
