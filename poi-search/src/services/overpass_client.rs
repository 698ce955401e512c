//! Overpass API client
//!
//! Sends Overpass QL as a `text/plain` POST body and decodes the `elements`
//! array of the JSON response. The request is bounded by a client-side
//! timeout; there are no retries.

use reqwest::StatusCode;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;
use thiserror::Error;

use super::USER_AGENT;

/// Overpass client errors
#[derive(Debug, Error)]
pub enum OverpassError {
    #[error("Overpass request timed out after {0} s")]
    Timeout(u64),

    #[error("Overpass rate limit exceeded: {0}")]
    RateLimited(String),

    #[error("Overpass returned HTTP {0}: {1}")]
    Upstream(u16, String),

    #[error("Overpass unreachable: {0}")]
    Unreachable(String),

    #[error("Unexpected Overpass failure: {0}")]
    Unexpected(String),
}

/// Overpass JSON response (only the parts the normalizer reads)
#[derive(Debug, Clone, Deserialize)]
pub struct OverpassResponse {
    pub elements: Vec<OverpassElement>,
}

/// One node, way or relation
///
/// Nodes carry `lat`/`lon` directly; ways and relations carry `center`
/// because the query ends with `out center;`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OverpassElement {
    #[serde(rename = "type")]
    pub element_type: String,
    pub id: i64,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub center: Option<OverpassCenter>,
    pub tags: Option<HashMap<String, String>>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct OverpassCenter {
    pub lat: f64,
    pub lon: f64,
}

/// Overpass API client
pub struct OverpassClient {
    http_client: reqwest::Client,
    url: String,
    timeout_secs: u64,
}

impl OverpassClient {
    pub fn new(url: impl Into<String>, timeout_secs: u64) -> Result<Self, OverpassError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| OverpassError::Unexpected(e.to_string()))?;

        Ok(Self {
            http_client,
            url: url.into(),
            timeout_secs,
        })
    }

    /// Run an Overpass QL query and return its elements
    pub async fn execute(&self, query: &str) -> Result<Vec<OverpassElement>, OverpassError> {
        tracing::debug!(url = %self.url, query_bytes = query.len(), "Querying Overpass API");

        let response = self
            .http_client
            .post(&self.url)
            .header(reqwest::header::CONTENT_TYPE, "text/plain")
            .body(query.to_string())
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(status_error(status, error_text));
        }

        let body: OverpassResponse = response.json().await.map_err(|e| self.classify(e))?;

        tracing::debug!(elements = body.elements.len(), "Overpass query complete");
        Ok(body.elements)
    }

    fn classify(&self, err: reqwest::Error) -> OverpassError {
        if err.is_timeout() {
            OverpassError::Timeout(self.timeout_secs)
        } else if err.is_connect() || err.is_request() {
            OverpassError::Unreachable(err.to_string())
        } else {
            OverpassError::Unexpected(err.to_string())
        }
    }
}

/// Map a non-success HTTP status to an error
fn status_error(status: StatusCode, body: String) -> OverpassError {
    let detail = if body.trim().is_empty() {
        status.canonical_reason().unwrap_or("no body").to_string()
    } else {
        body.trim().to_string()
    };

    if status == StatusCode::TOO_MANY_REQUESTS {
        OverpassError::RateLimited(detail)
    } else {
        OverpassError::Upstream(status.as_u16(), detail)
    }
}
