pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::optimization::handlers;
use crate::state::AppState;

/// Headroom over the CV size limit for the job text and multipart framing.
const MULTIPART_OVERHEAD_BYTES: usize = 1024 * 1024;

pub fn build_router(state: AppState) -> Router {
    let body_limit = state
        .config
        .max_upload_bytes
        .saturating_add(MULTIPART_OVERHEAD_BYTES);

    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/optimize", post(handlers::handle_optimize))
        .route("/api/download/:filename", get(handlers::handle_download))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}
