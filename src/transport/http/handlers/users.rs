use crate::transport::http::handlers::common::{accept_form, redirect_to_index, reject, Rejection};
use crate::transport::http::types::{AddUserForm, ApiResponse, AppState, DeleteUserForm, UpdateUserForm};
use axum::extract::rejection::FormRejection;
use axum::extract::State;
use axum::response::Redirect;
use axum::Form;

#[utoipa::path(
    post,
    path = "/add_user",
    request_body(content = AddUserForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 303, description = "User created; redirects to the index"),
        (status = 400, description = "Missing or malformed field", body = ApiResponse),
        (status = 409, description = "Username or email already taken", body = ApiResponse),
        (status = 422, description = "Undecodable form body", body = ApiResponse)
    )
)]
pub async fn add_user_handler(
    State(state): State<AppState>,
    form: Result<Form<AddUserForm>, FormRejection>,
) -> Result<Redirect, Rejection> {
    let input = accept_form(form, "username, email")?
        .validate()
        .map_err(reject)?;
    state
        .store
        .lock()
        .await
        .create_user(input)
        .await
        .map_err(reject)?;
    Ok(redirect_to_index())
}

#[utoipa::path(
    post,
    path = "/update_user",
    request_body(content = UpdateUserForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 303, description = "User updated; redirects to the index"),
        (status = 400, description = "Missing or malformed field", body = ApiResponse),
        (status = 404, description = "No such user", body = ApiResponse),
        (status = 409, description = "Username or email already taken", body = ApiResponse),
        (status = 422, description = "Undecodable form body", body = ApiResponse)
    )
)]
pub async fn update_user_handler(
    State(state): State<AppState>,
    form: Result<Form<UpdateUserForm>, FormRejection>,
) -> Result<Redirect, Rejection> {
    let (id, changes) = accept_form(form, "user_id, new_username, new_email")?
        .validate()
        .map_err(reject)?;
    state
        .store
        .lock()
        .await
        .update_user(id, changes)
        .await
        .map_err(reject)?;
    Ok(redirect_to_index())
}

#[utoipa::path(
    post,
    path = "/delete_user",
    request_body(content = DeleteUserForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 303, description = "User and its posts deleted; redirects to the index"),
        (status = 400, description = "Missing or malformed field", body = ApiResponse),
        (status = 404, description = "No such user", body = ApiResponse),
        (status = 422, description = "Undecodable form body", body = ApiResponse)
    )
)]
pub async fn delete_user_handler(
    State(state): State<AppState>,
    form: Result<Form<DeleteUserForm>, FormRejection>,
) -> Result<Redirect, Rejection> {
    let id = accept_form(form, "user_id")?.validate().map_err(reject)?;
    state
        .store
        .lock()
        .await
        .delete_user(id)
        .await
        .map_err(reject)?;
    Ok(redirect_to_index())
}
