use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

use crate::api_state::ApiState;

/// Readiness probe: returns 200 if the remote file-search service answers a
/// listing call, else 503.
pub async fn ready(State(state): State<ApiState>) -> impl IntoResponse {
    match state.search.list_stores().await {
        Ok(_) => (
            StatusCode::OK,
            Json(json!({
                "status": "ok",
                "checks": { "file_search": "ok" }
            })),
        ),
        Err(e) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({
                "status": "error",
                "checks": { "file_search": "fail" },
                "reason": e.to_string()
            })),
        ),
    }
}
