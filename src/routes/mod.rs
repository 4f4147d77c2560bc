//! Router assembly: HTTP endpoints, CORS, and HTTP tracing.

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::state::AppState;

pub mod extract;
pub mod http;

/// Build the application router with:
/// - REST-ish API under `/api/v1/...`
/// - CORS (allow any origin/method/headers), adjust for production if needed
/// - HTTP trace layer (per-request spans w/ method, path, status, latency)
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/v1/health", get(http::http_health))
        .route("/api/v1/profiles", get(http::http_get_profiles))
        .route("/api/v1/plan", get(http::http_get_plan))
        .route("/api/v1/topics", post(http::http_post_topic))
        .route("/api/v1/topics/:topic_id/items", post(http::http_post_item))
        .route("/api/v1/topics/:topic_id/stats", get(http::http_get_topic_stats))
        .route("/api/v1/topics/:topic_id/matching_items", get(http::http_get_matching_items))
        .route(
            "/api/v1/topics/:topic_id/items/:item_id/submissions",
            post(http::http_post_submission),
        )
        .route("/api/v1/templates", post(http::http_post_template))
        .route("/api/v1/sessions", post(http::http_post_session))
        .route("/api/v1/sessions/:session_id", get(http::http_get_session))
        // State + CORS + HTTP tracing
        .with_state(state)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
}
