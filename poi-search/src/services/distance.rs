//! Driving distance enrichment via OSRM
//!
//! One route request per facility, all issued at once and awaited together.
//! A failed lookup only costs that facility its distance.
//!
//! See: <http://project-osrm.org/docs/v5.24.0/api/#route-service>

use futures::future::join_all;
use poi_common::{Facility, RankedFacility};
use serde::Deserialize;
use std::cmp::Ordering;
use thiserror::Error;

use super::USER_AGENT;
use crate::types::Coordinate;

/// Routing client errors
#[derive(Debug, Error)]
pub enum RoutingError {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("API error {0}: {1}")]
    ApiError(u16, String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("OSRM returned {code}: {message}")]
    NoRoute { code: String, message: String },
}

/// OSRM Route API response
#[derive(Debug, Deserialize)]
pub struct RouteResponse {
    /// `"Ok"` on success, otherwise e.g. `"NoRoute"`, `"InvalidQuery"`
    pub code: String,
    pub message: Option<String>,
    #[serde(default)]
    pub routes: Vec<Route>,
}

#[derive(Debug, Deserialize)]
pub struct Route {
    /// Meters
    pub distance: f64,
    /// Seconds
    pub duration: f64,
}

impl RouteResponse {
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.code == "Ok"
    }

    /// Distance of the first route, if the response carries one
    pub fn first_distance(&self) -> Option<f64> {
        if self.is_ok() {
            self.routes.first().map(|r| r.distance)
        } else {
            None
        }
    }
}

/// OSRM route service client
pub struct RoutingClient {
    http_client: reqwest::Client,
    base_url: String,
    profile: String,
}

impl RoutingClient {
    pub fn new(base_url: impl Into<String>, profile: impl Into<String>) -> Result<Self, RoutingError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| RoutingError::NetworkError(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            profile: profile.into(),
        })
    }

    /// Route URL; OSRM takes coordinates as `lon,lat`
    fn route_url(&self, from: Coordinate, to: Coordinate) -> String {
        format!(
            "{}/route/v1/{}/{},{};{},{}?overview=false",
            self.base_url, self.profile, from.lon, from.lat, to.lon, to.lat
        )
    }

    /// Driving distance in meters from `from` to `to`
    pub async fn distance(&self, from: Coordinate, to: Coordinate) -> Result<f64, RoutingError> {
        let response = self
            .http_client
            .get(self.route_url(from, to))
            .send()
            .await
            .map_err(|e| RoutingError::NetworkError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(RoutingError::ApiError(status.as_u16(), error_text));
        }

        let route: RouteResponse = response
            .json()
            .await
            .map_err(|e| RoutingError::ParseError(e.to_string()))?;

        route.first_distance().ok_or_else(|| RoutingError::NoRoute {
            code: route.code.clone(),
            message: route
                .message
                .clone()
                .unwrap_or_else(|| "no routes".to_string()),
        })
    }
}

/// Attaches distances to facilities and ranks them
pub struct DistanceEnricher {
    client: RoutingClient,
}

impl DistanceEnricher {
    pub fn new(client: RoutingClient) -> Self {
        Self { client }
    }

    /// Look up every facility's distance concurrently, then sort nearest first
    pub async fn enrich(&self, origin: Coordinate, facilities: Vec<Facility>) -> Vec<RankedFacility> {
        let lookups = facilities.iter().map(|facility| async move {
            let destination = Coordinate::new(facility.lat, facility.lon);
            match self.client.distance(origin, destination).await {
                Ok(meters) => Some(meters),
                Err(e) => {
                    tracing::warn!(
                        facility_id = facility.id,
                        error = %e,
                        "Distance lookup failed"
                    );
                    None
                }
            }
        });

        // join_all yields results in input order
        let distances = join_all(lookups).await;

        let mut ranked: Vec<RankedFacility> = facilities
            .into_iter()
            .zip(distances)
            .map(|(facility, distance)| RankedFacility { facility, distance })
            .collect();

        sort_by_distance(&mut ranked);
        ranked
    }
}

/// Stable ascending sort; unknown distances go last in their original order
pub fn sort_by_distance(facilities: &mut [RankedFacility]) {
    facilities.sort_by(|a, b| match (a.distance, b.distance) {
        (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
}
