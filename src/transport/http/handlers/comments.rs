use crate::transport::http::handlers::common::{accept_form, redirect_to_index, reject, Rejection};
use crate::transport::http::types::{
    AddCommentForm, ApiResponse, AppState, DeleteCommentForm, UpdateCommentForm,
};
use axum::extract::rejection::FormRejection;
use axum::extract::State;
use axum::response::Redirect;
use axum::Form;

#[utoipa::path(
    post,
    path = "/add_comment",
    request_body(content = AddCommentForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 303, description = "Comment created; redirects to the index"),
        (status = 400, description = "Missing or malformed field", body = ApiResponse),
        (status = 404, description = "Post does not exist", body = ApiResponse),
        (status = 422, description = "Undecodable form body", body = ApiResponse)
    )
)]
pub async fn add_comment_handler(
    State(state): State<AppState>,
    form: Result<Form<AddCommentForm>, FormRejection>,
) -> Result<Redirect, Rejection> {
    let input = accept_form(form, "comment, post_id")?
        .validate()
        .map_err(reject)?;
    state
        .store
        .lock()
        .await
        .create_comment(input)
        .await
        .map_err(reject)?;
    Ok(redirect_to_index())
}

#[utoipa::path(
    post,
    path = "/update_comment",
    request_body(content = UpdateCommentForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 303, description = "Comment updated; redirects to the index"),
        (status = 400, description = "Missing or malformed field", body = ApiResponse),
        (status = 404, description = "No such comment", body = ApiResponse),
        (status = 422, description = "Undecodable form body", body = ApiResponse)
    )
)]
pub async fn update_comment_handler(
    State(state): State<AppState>,
    form: Result<Form<UpdateCommentForm>, FormRejection>,
) -> Result<Redirect, Rejection> {
    let (id, changes) = accept_form(form, "comment_id, new_comment")?
        .validate()
        .map_err(reject)?;
    state
        .store
        .lock()
        .await
        .update_comment(id, changes)
        .await
        .map_err(reject)?;
    Ok(redirect_to_index())
}

#[utoipa::path(
    post,
    path = "/delete_comment",
    request_body(content = DeleteCommentForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 303, description = "Comment deleted; redirects to the index"),
        (status = 400, description = "Missing or malformed field", body = ApiResponse),
        (status = 404, description = "No such comment", body = ApiResponse),
        (status = 422, description = "Undecodable form body", body = ApiResponse)
    )
)]
pub async fn delete_comment_handler(
    State(state): State<AppState>,
    form: Result<Form<DeleteCommentForm>, FormRejection>,
) -> Result<Redirect, Rejection> {
    let id = accept_form(form, "comment_id")?.validate().map_err(reject)?;
    state
        .store
        .lock()
        .await
        .delete_comment(id)
        .await
        .map_err(reject)?;
    Ok(redirect_to_index())
}
