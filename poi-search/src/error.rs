//! Error types for poi-search
//!
//! Every handler failure becomes `{"error": {"code", "message"}}`. Upstream
//! failures keep a status that tells the caller which side broke; internal
//! failures are logged in full and answered with a generic message.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::services::{KeywordError, OverpassError};

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Invalid request parameters (400)
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Overpass rate limit (429)
    #[error("Rate limited: {0}")]
    RateLimited(String),

    /// Upstream answered with an error status (502)
    #[error("Bad gateway: {0}")]
    BadGateway(String),

    /// Upstream could not be reached (503)
    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    /// Upstream did not answer in time (504)
    #[error("Gateway timeout: {0}")]
    GatewayTimeout(String),

    /// Internal server error (500)
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl From<OverpassError> for ApiError {
    fn from(err: OverpassError) -> Self {
        match err {
            OverpassError::Timeout(_) => {
                ApiError::GatewayTimeout("Overpass API did not respond in time".to_string())
            }
            OverpassError::RateLimited(_) => {
                ApiError::RateLimited("Overpass API rate limit exceeded, retry later".to_string())
            }
            OverpassError::Upstream(status, _) => {
                ApiError::BadGateway(format!("Overpass API returned HTTP {}", status))
            }
            OverpassError::Unreachable(_) => {
                ApiError::ServiceUnavailable("Overpass API is unreachable".to_string())
            }
            OverpassError::Unexpected(msg) => ApiError::Internal(msg),
        }
    }
}

impl From<KeywordError> for ApiError {
    fn from(err: KeywordError) -> Self {
        ApiError::Internal(format!("Keyword analysis failed: {}", err))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg),
            ApiError::RateLimited(msg) => (StatusCode::TOO_MANY_REQUESTS, "RATE_LIMITED", msg),
            ApiError::BadGateway(msg) => (StatusCode::BAD_GATEWAY, "BAD_GATEWAY", msg),
            ApiError::ServiceUnavailable(msg) => {
                (StatusCode::SERVICE_UNAVAILABLE, "SERVICE_UNAVAILABLE", msg)
            }
            ApiError::GatewayTimeout(msg) => (StatusCode::GATEWAY_TIMEOUT, "GATEWAY_TIMEOUT", msg),
            ApiError::Internal(msg) => {
                tracing::error!(error = %msg, "Internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "Internal server error".to_string(),
                )
            }
        };

        if status.is_server_error() && status != StatusCode::INTERNAL_SERVER_ERROR {
            tracing::warn!(status = status.as_u16(), message = %message, "Upstream failure");
        }

        let body = Json(json!({
            "error": {
                "code": error_code,
                "message": message,
            }
        }));

        (status, body).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
