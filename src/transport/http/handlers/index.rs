//! Read-only views: the index listing and a user's posts page.

use crate::domain::model::parse_id;
use crate::transport::http::handlers::common::{path_400, reject, Rejection};
use crate::transport::http::types::{ApiResponse, AppState, IndexData};
use axum::extract::rejection::PathRejection;
use axum::extract::{Path, State};
use axum::Json;

#[utoipa::path(
    get,
    path = "/",
    responses(
        (status = 200, description = "All users plus table counts", body = ApiResponse),
        (status = 500, description = "Internal server error", body = ApiResponse)
    )
)]
pub async fn index_handler(State(state): State<AppState>) -> Result<Json<ApiResponse>, Rejection> {
    let store = state.store.lock().await;
    let counts = store.counts().await.map_err(reject)?;
    let users = store.list_users().await.map_err(reject)?;
    drop(store);

    let data = IndexData { counts, users };
    Ok(Json(ApiResponse::ok(serde_json::json!(data))))
}

#[utoipa::path(
    get,
    path = "/user/{user_id}/posts",
    params(
        ("user_id" = i64, Path, description = "User id, a positive integer")
    ),
    responses(
        (status = 200, description = "The user with its posts and their comments", body = ApiResponse),
        (status = 400, description = "Malformed user id", body = ApiResponse),
        (status = 404, description = "No such user", body = ApiResponse)
    )
)]
pub async fn user_posts_handler(
    State(state): State<AppState>,
    user_id: Result<Path<String>, PathRejection>,
) -> Result<Json<ApiResponse>, Rejection> {
    let Path(raw) = user_id.map_err(path_400)?;
    let user_id = parse_id("user_id", Some(&raw)).map_err(reject)?;
    let page = state
        .store
        .lock()
        .await
        .get_user_with_posts(user_id)
        .await
        .map_err(reject)?;
    Ok(Json(ApiResponse::ok(serde_json::json!(page))))
}
