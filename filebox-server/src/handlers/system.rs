use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

use crate::state::AppState;

// ── GET /api/health ──

pub async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let base_dir = state.base_dir.display().to_string();
    let uptime_secs = state.started_at.elapsed().as_secs();

    match tokio::fs::metadata(&state.base_dir).await {
        Ok(meta) if meta.is_dir() => (
            StatusCode::OK,
            Json(serde_json::json!({
                "status": "ok",
                "version": env!("CARGO_PKG_VERSION"),
                "base_dir": base_dir,
                "uptime_secs": uptime_secs,
            })),
        ),
        _ => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(serde_json::json!({
                "status": "degraded",
                "version": env!("CARGO_PKG_VERSION"),
                "base_dir": base_dir,
                "uptime_secs": uptime_secs,
            })),
        ),
    }
}
