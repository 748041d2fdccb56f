//! Time-Series API Service Library
//!
//! HTTP server for uploading a NetCDF file, browsing its grid on a map and
//! retrieving the time series of every variable at a clicked grid point.

pub mod config;
pub mod error;
pub mod handlers;
pub mod map;
pub mod metrics;
pub mod state;

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Extension, Router,
};
use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};

use crate::state::AppState;

/// Room for multipart boundaries and headers on top of the file itself.
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

/// Build the application router.
pub fn router(state: Arc<AppState>) -> Router {
    let body_limit = state.config.upload.max_upload_bytes() + MULTIPART_OVERHEAD_BYTES;

    Router::new()
        // Page
        .route("/", get(handlers::index::index_handler))
        // Upload and queries
        .route("/upload", post(handlers::upload::upload_handler))
        .route(
            "/get_timeseries",
            post(handlers::timeseries::timeseries_handler),
        )
        .route(
            "/download_timeseries_csv",
            post(handlers::download::download_csv_handler),
        )
        // Health and metrics
        .route("/health", get(handlers::health::health_handler))
        .route("/ready", get(handlers::health::ready_handler))
        .route("/metrics", get(handlers::health::metrics_handler))
        // Middleware
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(Extension(state))
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
}
