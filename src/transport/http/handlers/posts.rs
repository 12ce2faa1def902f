use crate::transport::http::handlers::common::{accept_form, redirect_to_index, reject, Rejection};
use crate::transport::http::types::{AddPostForm, ApiResponse, AppState, DeletePostForm, UpdatePostForm};
use axum::extract::rejection::FormRejection;
use axum::extract::State;
use axum::response::Redirect;
use axum::Form;

#[utoipa::path(
    post,
    path = "/add_post",
    request_body(content = AddPostForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 303, description = "Post created; redirects to the index"),
        (status = 400, description = "Missing or malformed field", body = ApiResponse),
        (status = 404, description = "Owner does not exist", body = ApiResponse),
        (status = 422, description = "Undecodable form body", body = ApiResponse)
    )
)]
pub async fn add_post_handler(
    State(state): State<AppState>,
    form: Result<Form<AddPostForm>, FormRejection>,
) -> Result<Redirect, Rejection> {
    let input = accept_form(form, "content, user_id")?
        .validate()
        .map_err(reject)?;
    state
        .store
        .lock()
        .await
        .create_post(input)
        .await
        .map_err(reject)?;
    Ok(redirect_to_index())
}

#[utoipa::path(
    post,
    path = "/update_post",
    request_body(content = UpdatePostForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 303, description = "Post updated; redirects to the index"),
        (status = 400, description = "Missing or malformed field", body = ApiResponse),
        (status = 404, description = "No such post", body = ApiResponse),
        (status = 422, description = "Undecodable form body", body = ApiResponse)
    )
)]
pub async fn update_post_handler(
    State(state): State<AppState>,
    form: Result<Form<UpdatePostForm>, FormRejection>,
) -> Result<Redirect, Rejection> {
    let (id, changes) = accept_form(form, "post_id, new_content")?
        .validate()
        .map_err(reject)?;
    state
        .store
        .lock()
        .await
        .update_post(id, changes)
        .await
        .map_err(reject)?;
    Ok(redirect_to_index())
}

#[utoipa::path(
    post,
    path = "/delete_post",
    request_body(content = DeletePostForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 303, description = "Post and its comments deleted; redirects to the index"),
        (status = 400, description = "Missing or malformed field", body = ApiResponse),
        (status = 404, description = "No such post", body = ApiResponse),
        (status = 422, description = "Undecodable form body", body = ApiResponse)
    )
)]
pub async fn delete_post_handler(
    State(state): State<AppState>,
    form: Result<Form<DeletePostForm>, FormRejection>,
) -> Result<Redirect, Rejection> {
    let id = accept_form(form, "post_id")?.validate().map_err(reject)?;
    state
        .store
        .lock()
        .await
        .delete_post(id)
        .await
        .map_err(reject)?;
    Ok(redirect_to_index())
}
