//! Test Helper Utilities
//!
//! In-process stand-ins for Overpass, OSRM and the keyword service, plus
//! router construction and request helpers.

#![allow(dead_code)]

use axum::{
    body::Body,
    extract::{Path, State},
    http::{HeaderMap, Request, StatusCode},
    response::IntoResponse,
    routing::post,
    Json, Router,
};
use http_body_util::BodyExt;
use poi_common::config::TomlConfig;
use poi_search::services::CategoryDictionary;
use poi_search::{build_router, AppState};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tower::ServiceExt;

/// Small dictionary used by the router tests
pub const TEST_DICTIONARY: &str = r#"category,tags
カフェ,"[{""tags"":{""amenity"":""cafe""}}]"
ラーメン,"[{""tags"":{""amenity"":""restaurant"",""cuisine"":""ramen""}}]"
パン,"[{""tags"":{""shop"":""bakery""}}]"
"#;

/// Overpass reply with a node, a way (center only), an unnamed node and
/// two more named nodes
pub fn overpass_fixture() -> Value {
    json!({
        "version": 0.6,
        "generator": "Overpass API",
        "elements": [
            {"type": "node", "id": 1, "lat": 35.0, "lon": 139.0,
             "tags": {"name": "Cafe A", "amenity": "cafe"}},
            {"type": "way", "id": 2, "center": {"lat": 35.01, "lon": 139.01},
             "tags": {"name": "Ramen B", "amenity": "restaurant", "cuisine": "ramen"}},
            {"type": "node", "id": 3, "lat": 35.02, "lon": 139.02,
             "tags": {"amenity": "cafe"}},
            {"type": "node", "id": 4, "lat": 35.03, "lon": 139.03,
             "tags": {"name": "Shop D", "shop": "convenience"}},
            {"type": "node", "id": 5, "lat": 35.04, "lon": 139.04,
             "tags": {"name": "Cafe E", "amenity": "cafe"}}
        ]
    })
}

/// Serve `router` on an ephemeral local port, returning its base URL
pub async fn spawn_stub(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}

/// Base URL of a port nothing listens on
pub fn unreachable_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}

/// Request received by the Overpass stub
#[derive(Debug, Clone)]
pub struct RecordedQuery {
    pub content_type: Option<String>,
    pub user_agent: Option<String>,
    pub body: String,
}

/// Overpass stand-in answering every query with one canned reply
#[derive(Clone)]
pub struct OverpassStub {
    pub queries: Arc<Mutex<Vec<RecordedQuery>>>,
    status: StatusCode,
    body: String,
    delay: Duration,
}

impl OverpassStub {
    pub fn new(status: StatusCode, body: impl Into<String>) -> Self {
        Self {
            queries: Arc::new(Mutex::new(Vec::new())),
            status,
            body: body.into(),
            delay: Duration::ZERO,
        }
    }

    pub fn ok(body: Value) -> Self {
        Self::new(StatusCode::OK, body.to_string())
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Start serving; returns the interpreter URL
    pub async fn start(&self) -> String {
        let router = Router::new()
            .route("/api/interpreter", post(overpass_handler))
            .with_state(self.clone());
        format!("{}/api/interpreter", spawn_stub(router).await)
    }

    pub fn recorded(&self) -> Vec<RecordedQuery> {
        self.queries.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.queries.lock().unwrap().len()
    }
}

async fn overpass_handler(
    State(stub): State<OverpassStub>,
    headers: HeaderMap,
    body: String,
) -> impl IntoResponse {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };
    stub.queries.lock().unwrap().push(RecordedQuery {
        content_type: header("content-type"),
        user_agent: header("user-agent"),
        body,
    });
    if !stub.delay.is_zero() {
        tokio::time::sleep(stub.delay).await;
    }
    (stub.status, stub.body.clone())
}

/// Canned OSRM answer for one destination
#[derive(Debug, Clone)]
pub enum StubRoute {
    Distance(f64),
    NoRoute,
}

/// OSRM stand-in keyed by destination `lon,lat`; unknown destinations get 500
#[derive(Clone, Default)]
pub struct RoutingStub {
    routes: Arc<HashMap<String, StubRoute>>,
    pub requests: Arc<Mutex<Vec<(String, String)>>>,
}

impl RoutingStub {
    pub fn new(routes: &[(&str, StubRoute)]) -> Self {
        Self {
            routes: Arc::new(
                routes
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.clone()))
                    .collect(),
            ),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub async fn start(&self) -> String {
        let router = Router::new()
            .route("/route/v1/:profile/*coords", axum::routing::get(routing_handler))
            .with_state(self.clone());
        spawn_stub(router).await
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

async fn routing_handler(
    State(stub): State<RoutingStub>,
    Path((profile, coords)): Path<(String, String)>,
) -> axum::response::Response {
    let coords = coords.trim_start_matches('/').to_string();
    stub.requests
        .lock()
        .unwrap()
        .push((profile, coords.clone()));

    let destination = coords.split(';').nth(1).unwrap_or_default();
    match stub.routes.get(destination) {
        Some(StubRoute::Distance(meters)) => Json(json!({
            "code": "Ok",
            "routes": [{"distance": meters, "duration": meters / 10.0}],
            "waypoints": []
        }))
        .into_response(),
        Some(StubRoute::NoRoute) => Json(json!({
            "code": "NoRoute",
            "message": "Impossible route between points"
        }))
        .into_response(),
        None => (StatusCode::INTERNAL_SERVER_ERROR, "routing failed").into_response(),
    }
}

/// Keyword service stand-in with one canned reply
#[derive(Clone)]
pub struct KeywordStub {
    pub queries: Arc<Mutex<Vec<String>>>,
    status: StatusCode,
    body: Value,
}

impl KeywordStub {
    pub fn new(status: StatusCode, body: Value) -> Self {
        Self {
            queries: Arc::new(Mutex::new(Vec::new())),
            status,
            body,
        }
    }

    /// Answers with the given tag sets
    pub fn terms(tags: Value) -> Self {
        Self::new(StatusCode::OK, json!({ "searchTerms": tags }))
    }

    /// Answers every keyword as unanalyzable
    pub fn unanalyzable() -> Self {
        Self::new(
            StatusCode::BAD_REQUEST,
            json!({"error": {"code": 400, "message": "解析不能なキーワードです。"}}),
        )
    }

    pub async fn start(&self) -> String {
        let router = Router::new()
            .route("/api/v1/analyze-keywords", post(keyword_handler))
            .with_state(self.clone());
        spawn_stub(router).await
    }

    pub fn recorded(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }
}

async fn keyword_handler(State(stub): State<KeywordStub>, Json(body): Json<Value>) -> impl IntoResponse {
    let query = body["query"].as_str().unwrap_or_default().to_string();
    stub.queries.lock().unwrap().push(query);
    (stub.status, Json(stub.body.clone()))
}

/// Configuration pointing every upstream at the given URLs
pub fn test_config(overpass_url: &str, routing_url: &str, keyword_url: &str) -> TomlConfig {
    let mut config = TomlConfig::default();
    config.overpass.url = overpass_url.to_string();
    config.overpass.timeout_secs = 2;
    config.routing.url = routing_url.to_string();
    config.keyword.url = keyword_url.to_string();
    config
}

pub fn test_dictionary() -> CategoryDictionary {
    CategoryDictionary::from_reader(TEST_DICTIONARY.as_bytes()).unwrap()
}

pub fn build_app(config: &TomlConfig) -> Router {
    let state = AppState::from_config(config, test_dictionary()).unwrap();
    build_router(state)
}

/// Upstream stubs started together, with a router wired to them
pub struct TestEnv {
    pub overpass: OverpassStub,
    pub routing: RoutingStub,
    pub keyword: KeywordStub,
    pub app: Router,
}

impl TestEnv {
    pub async fn start(overpass: OverpassStub, routing: RoutingStub, keyword: KeywordStub) -> Self {
        let config = test_config(
            &overpass.start().await,
            &routing.start().await,
            &keyword.start().await,
        );
        let app = build_app(&config);
        Self {
            overpass,
            routing,
            keyword,
            app,
        }
    }

    /// Default stubs: Overpass returns the fixture, no routes, keywords unanalyzable
    pub async fn with_fixture() -> Self {
        Self::start(
            OverpassStub::ok(overpass_fixture()),
            RoutingStub::default(),
            KeywordStub::unanalyzable(),
        )
        .await
    }
}

/// Response pieces the tests look at
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub bytes: Vec<u8>,
}

impl TestResponse {
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.bytes).unwrap()
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

pub async fn send(app: &Router, request: Request<Body>) -> TestResponse {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = response
        .into_body()
        .collect()
        .await
        .unwrap()
        .to_bytes()
        .to_vec();
    TestResponse {
        status,
        headers,
        bytes,
    }
}

pub async fn get(app: &Router, uri: &str) -> TestResponse {
    send(app, Request::builder().uri(uri).body(Body::empty()).unwrap()).await
}
