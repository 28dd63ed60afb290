use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{files, system};
use crate::state::AppState;

pub fn build_router(state: Arc<AppState>, max_upload_bytes: usize) -> Router {
    Router::new()
        // Files
        .route("/api/v1/files", post(files::upload_file))
        .route("/api/v1/files/", post(files::upload_file))
        .route("/api/v1/files/{name}", get(files::download_file))
        .route("/api/v1/files/{name}/", get(files::download_file))
        // System
        .route("/api/health", get(system::health))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .with_state(state)
}
