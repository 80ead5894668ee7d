use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};

use crate::state::AppState;

/// Health check endpoint
///
/// # Returns
///
/// JSON response with status
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, Json(serde_json::json!({"status": "ok"})))
}

/// Room and connection counters
pub async fn stats(State(state): State<AppState>) -> impl IntoResponse {
    let registry = state.registry.read().await;
    (StatusCode::OK, Json(registry.get_stats()))
}
