//! CORS reverse proxy and search scraper for a torrent daemon dashboard.
//!
//! Browsers cannot talk to the daemon directly because of same-origin
//! restrictions; this service forwards dashboard requests to the daemon,
//! answers pre-flight requests, exposes the daemon's session header, and
//! serves scraped search results from a torrent index.

pub mod config;
pub mod proxy;
pub mod search;

use std::time::Duration;

use axum::http::HeaderName;
use axum::response::Json;
use axum::routing::get;
use axum::Router;
use serde::Serialize;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Shared state for the proxy and search handlers.
#[derive(Clone)]
pub struct GatewayContext {
    pub http: reqwest::Client,
    /// Upstream daemon root every non-search request is forwarded to.
    pub upstream: String,
    /// Root of the torrent index scraped by `/search`.
    pub search_base: String,
}

impl GatewayContext {
    pub fn new(upstream: impl Into<String>, search_base: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            upstream: upstream.into().trim_end_matches('/').to_string(),
            search_base: search_base.into().trim_end_matches('/').to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
struct HealthStatus {
    status: &'static str,
}

/// GET /health - Health check endpoint
async fn health_check() -> Json<HealthStatus> {
    Json(HealthStatus { status: "ok" })
}

pub fn router(ctx: GatewayContext) -> Router {
    // Mirror the requesting origin and its requested methods/headers, allow
    // credentials, and expose the daemon's session header so the dashboard
    // can complete its handshake through the proxy.
    let cors = CorsLayer::very_permissive()
        .expose_headers([HeaderName::from_static("x-transmission-session-id")])
        .max_age(Duration::from_secs(600));

    Router::new()
        .route("/health", get(health_check))
        .route("/search", get(search::search))
        .fallback(proxy::proxy)
        .with_state(ctx)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
