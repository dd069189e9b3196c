//! HTTP route handlers

pub mod files;
pub mod health;

use axum::{routing::get, Router};

use crate::state::AppState;

/// Build the application router
pub fn router(state: AppState) -> Router {
    let max_upload_bytes = state.config().server.max_upload_bytes;

    Router::new()
        .route("/health", get(health::health_check))
        .route("/api/v1/health", get(health::health_check))
        .nest("/v1/files", files::router(max_upload_bytes))
        .with_state(state)
}
