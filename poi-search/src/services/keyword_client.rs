//! Keyword analysis service client
//!
//! Resolves free text ("ラーメン屋", "cafe") into tag filter sets by calling
//! `POST /api/v1/analyze-keywords`. The service answers HTTP 400 when it
//! cannot map the text to any tags; that is a normal outcome, not a failure.

use poi_common::SearchTerm;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

use super::USER_AGENT;

const ANALYZE_PATH: &str = "/api/v1/analyze-keywords";
const CONNECT_TIMEOUT_SECS: u64 = 5;

/// Keyword client errors
#[derive(Debug, Error)]
pub enum KeywordError {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("API error {0}: {1}")]
    ApiError(u16, String),

    #[error("Parse error: {0}")]
    ParseError(String),
}

/// Result of analyzing one keyword
#[derive(Debug, Clone, PartialEq)]
pub enum KeywordOutcome {
    /// Tag filter sets to search for (never empty)
    Terms(Vec<SearchTerm>),
    /// Service could not interpret the keyword
    Unanalyzable(String),
}

#[derive(Debug, Serialize)]
struct AnalyzeRequest<'a> {
    query: &'a str,
}

#[derive(Debug, Deserialize)]
struct AnalyzeResponse {
    #[serde(rename = "searchTerms")]
    search_terms: Vec<SearchTerm>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// Keyword analysis client
pub struct KeywordClient {
    http_client: reqwest::Client,
    endpoint: String,
}

impl KeywordClient {
    pub fn new(base_url: &str) -> Result<Self, KeywordError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .build()
            .map_err(|e| KeywordError::NetworkError(e.to_string()))?;

        Ok(Self {
            http_client,
            endpoint: format!("{}{}", base_url.trim_end_matches('/'), ANALYZE_PATH),
        })
    }

    /// Analyze `keyword` into search terms
    pub async fn analyze(&self, keyword: &str) -> Result<KeywordOutcome, KeywordError> {
        tracing::debug!(keyword = %keyword, "Analyzing keyword");

        let response = self
            .http_client
            .post(&self.endpoint)
            .json(&AnalyzeRequest { query: keyword })
            .send()
            .await
            .map_err(|e| KeywordError::NetworkError(e.to_string()))?;

        let status = response.status();

        if status == StatusCode::BAD_REQUEST {
            let error_text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorEnvelope>(&error_text)
                .map(|envelope| envelope.error.message)
                .unwrap_or(error_text);
            tracing::info!(keyword = %keyword, message = %message, "Keyword not analyzable");
            return Ok(KeywordOutcome::Unanalyzable(message));
        }

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(KeywordError::ApiError(status.as_u16(), error_text));
        }

        let body: AnalyzeResponse = response
            .json()
            .await
            .map_err(|e| KeywordError::ParseError(e.to_string()))?;

        Ok(into_outcome(body.search_terms))
    }
}

fn into_outcome(terms: Vec<SearchTerm>) -> KeywordOutcome {
    let total = terms.len();
    let terms: Vec<SearchTerm> = terms.into_iter().filter(|t| !t.is_empty()).collect();
    if terms.len() < total {
        tracing::warn!(dropped = total - terms.len(), "Keyword service returned empty search terms");
    }

    if terms.is_empty() {
        KeywordOutcome::Unanalyzable("no search terms returned".to_string())
    } else {
        KeywordOutcome::Terms(terms)
    }
}
