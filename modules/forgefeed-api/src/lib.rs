//! HTTP surface of the activity feed.
//!
//! Receives GitHub webhook deliveries on `/webhook`, normalizes the ones the
//! feed tracks (push, opened pull request, merged pull request) into events,
//! and serves the rendered feed on `/api/events`. The router is built here so
//! tests can drive it with an in-memory store instead of Postgres.

pub mod feed;
pub mod github;
pub mod normalize;
pub mod rest;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};

use forgefeed_events::EventStore;

pub struct AppState {
    pub store: Arc<dyn EventStore>,
}

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Health check
        .route("/", get(|| async { "ok" }))
        // Webhook receiver
        .route("/webhook", post(rest::api_webhook))
        // Rendered feed + store diagnostics
        .route("/api/events", get(rest::api_events))
        .route("/health", get(rest::api_health))
        .with_state(state)
        // CORS
        .layer(
            tower_http::cors::CorsLayer::new()
                .allow_origin(tower_http::cors::Any)
                .allow_methods(tower_http::cors::Any)
                .allow_headers(tower_http::cors::Any),
        )
        // Logging layer: method + path + status + latency only
        .layer(
            tower_http::trace::TraceLayer::new_for_http().make_span_with(
                |request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        path = %request.uri().path(),
                    )
                },
            ),
        )
}
