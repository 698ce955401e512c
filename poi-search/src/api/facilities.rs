//! Facility search by amenity list or keyword

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    Json,
};
use poi_common::{Facility, SearchTerm};
use tracing::Instrument;
use uuid::Uuid;

use super::params::{parse_area, split_list, FacilityQuery};
use crate::error::{ApiError, ApiResult};
use crate::services::{normalize, KeywordOutcome, QueryBuildError};
use crate::types::SearchArea;
use crate::AppState;

/// Where a set of search terms came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TermOrigin {
    /// Query string
    Caller,
    /// Keyword service, dictionary or configuration
    Internal,
}

/// GET /api/facilities?lat=..&lon=..[&radius=..][&amenities=a,b|&keyword=..]
///
/// `keyword` takes precedence over `amenities`. With neither, the configured
/// default amenities are searched.
pub async fn search_facilities(
    State(state): State<AppState>,
    query: Result<Query<FacilityQuery>, QueryRejection>,
) -> ApiResult<Json<Vec<Facility>>> {
    let Query(query) = query.map_err(|e| ApiError::BadRequest(e.body_text()))?;

    let request_id = Uuid::new_v4();
    let span = tracing::info_span!("facility_search", %request_id);
    facility_search(state, query).instrument(span).await.map(Json)
}

async fn facility_search(state: AppState, query: FacilityQuery) -> ApiResult<Vec<Facility>> {
    let area = parse_area(
        query.lat.as_deref(),
        query.lon.as_deref(),
        query.radius.as_deref(),
        state.search.default_radius,
    )?;

    let (terms, origin) = match query.keyword.as_deref() {
        Some(keyword) => {
            let keyword = keyword.trim();
            if keyword.is_empty() {
                return Err(ApiError::BadRequest("keyword must not be empty".to_string()));
            }
            match state.keywords.analyze(keyword).await? {
                KeywordOutcome::Terms(terms) => (terms, TermOrigin::Internal),
                KeywordOutcome::Unanalyzable(reason) => {
                    tracing::info!(keyword, reason = %reason, "Keyword not analyzable, returning no facilities");
                    return Ok(Vec::new());
                }
            }
        }
        None => {
            let requested = query.amenities.as_deref().map(split_list).unwrap_or_default();
            if requested.is_empty() {
                let defaults = split_list(&state.search.default_amenities.join(","));
                (amenity_terms(&defaults), TermOrigin::Internal)
            } else {
                (amenity_terms(&requested), TermOrigin::Caller)
            }
        }
    };

    tracing::info!(
        origin = %area.origin,
        radius = area.radius,
        terms = terms.len(),
        "Searching facilities"
    );

    let facilities = fetch_facilities(&state, &area, &terms, origin).await?;
    tracing::info!(results = facilities.len(), "Facility search complete");
    Ok(facilities)
}

fn amenity_terms(values: &[String]) -> Vec<SearchTerm> {
    values.iter().map(|v| SearchTerm::amenity(v.as_str())).collect()
}

/// Build the query, run it and normalize the result
pub(crate) async fn fetch_facilities(
    state: &AppState,
    area: &SearchArea,
    terms: &[SearchTerm],
    origin: TermOrigin,
) -> ApiResult<Vec<Facility>> {
    let query = state
        .query_builder
        .build(area, terms)
        .map_err(|e| build_error(e, origin))?;

    let elements = state.overpass.execute(&query).await?;
    Ok(normalize(elements))
}

fn build_error(err: QueryBuildError, origin: TermOrigin) -> ApiError {
    match origin {
        TermOrigin::Caller => ApiError::BadRequest(err.to_string()),
        TermOrigin::Internal => ApiError::Internal(format!("Query construction failed: {}", err)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_error_origin() {
        assert!(matches!(
            build_error(QueryBuildError::EmptyValue(0), TermOrigin::Caller),
            ApiError::BadRequest(_)
        ));
        assert!(matches!(
            build_error(QueryBuildError::NoSearchTerms, TermOrigin::Internal),
            ApiError::Internal(_)
        ));
    }
}
