use crate::transport::http::types::{ApiResponse, AppState};
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is healthy (DB reachable)", body = ApiResponse),
        (status = 503, description = "Service is unhealthy (DB unreachable)", body = ApiResponse)
    )
)]
pub async fn healthcheck_handler(State(state): State<AppState>) -> impl IntoResponse {
    let store = state.store.lock().await;

    match store.ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(ApiResponse::ok(serde_json::json!({ "status": "ok" }))),
        ),
        Err(e) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ApiResponse {
                success: false,
                data: Some(serde_json::json!({ "status": "unhealthy" })),
                error: Some(format!("DB ping failed: {}", e)),
            }),
        ),
    }
}
