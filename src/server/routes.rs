//! Router configuration for the web server.

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;

use super::handlers;
use super::AppState;

/// Upper bound on one upload request (several manuals at once).
const MAX_UPLOAD_BYTES: usize = 512 * 1024 * 1024;

/// Create the main router with all routes.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::upload_page))
        .route(
            "/api/extract",
            post(handlers::api_start_extraction).layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
        .route("/api/extract/status", get(handlers::api_extraction_status))
        .route("/api/extract/records", get(handlers::api_extraction_records))
        .route("/api/extract/download", get(handlers::api_download_results))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
