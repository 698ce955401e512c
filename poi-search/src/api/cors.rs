//! Cross-origin access
//!
//! Browsers call this service directly from any origin. `CorsLayer` answers
//! every `OPTIONS` request itself with 200; [`preflight_no_content`] wraps it
//! and turns those answers into 204 with no body.

use axum::{
    body::Body,
    extract::Request,
    http::{header, Method, StatusCode},
    middleware::Next,
    response::Response,
};
use tower_http::cors::{Any, CorsLayer};

/// CORS policy: any origin, GET/HEAD/OPTIONS/POST, `Content-Type` header
pub fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::HEAD, Method::OPTIONS, Method::POST])
        .allow_headers([header::CONTENT_TYPE])
}

/// Rewrite successful `OPTIONS` responses to 204 No Content
pub async fn preflight_no_content(request: Request, next: Next) -> Response {
    let is_options = request.method() == Method::OPTIONS;
    let response = next.run(request).await;

    if !is_options || !response.status().is_success() {
        return response;
    }

    let (mut parts, _) = response.into_parts();
    parts.status = StatusCode::NO_CONTENT;
    parts.headers.remove(header::CONTENT_LENGTH);
    parts.headers.remove(header::CONTENT_TYPE);
    Response::from_parts(parts, Body::empty())
}
