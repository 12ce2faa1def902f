use crate::domain::StoreError;
use crate::transport::http::types::ApiResponse;
use axum::extract::rejection::{FormRejection, PathRejection};
use axum::http::StatusCode;
use axum::response::Redirect;
use axum::{Form, Json};

/// Error half of every handler result.
pub type Rejection = (StatusCode, Json<ApiResponse>);

/// Where every successful form submission lands.
pub const INDEX_PATH: &str = "/";

pub fn redirect_to_index() -> Redirect {
    Redirect::to(INDEX_PATH)
}

pub fn status_for(err: &StoreError) -> StatusCode {
    match err {
        StoreError::NotFound { .. } => StatusCode::NOT_FOUND,
        StoreError::Conflict { .. } => StatusCode::CONFLICT,
        StoreError::Validation { .. } => StatusCode::BAD_REQUEST,
        StoreError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Converts a store failure into an HTTP error response.
pub fn reject(err: StoreError) -> Rejection {
    let status = status_for(&err);
    if status.is_server_error() {
        tracing::error!(error = %err, "store operation failed");
    } else {
        tracing::debug!(error = %err, "request rejected");
    }

    let data = match &err {
        StoreError::NotFound { entity, id } => {
            serde_json::json!({ "code": err.code(), "entity": entity, "id": id })
        }
        StoreError::Conflict { entity, field, .. } => {
            serde_json::json!({ "code": err.code(), "entity": entity, "field": field })
        }
        StoreError::Validation { field, .. } => {
            serde_json::json!({ "code": err.code(), "field": field })
        }
        StoreError::Database(_) => serde_json::json!({ "code": err.code() }),
    };

    (
        status,
        Json(ApiResponse {
            success: false,
            data: Some(data),
            error: Some(err.to_string()),
        }),
    )
}

/// Unwraps a decoded form body, answering 422 if the body could not be decoded at all.
pub fn accept_form<T>(form: Result<Form<T>, FormRejection>, expected: &str) -> Result<T, Rejection> {
    match form {
        Ok(Form(value)) => Ok(value),
        Err(e) => Err((
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(ApiResponse {
                success: false,
                data: None,
                error: Some(format!("Invalid form body: {} (expected fields: {})", e, expected)),
            }),
        )),
    }
}

pub fn path_400(err: PathRejection) -> Rejection {
    (
        StatusCode::BAD_REQUEST,
        Json(ApiResponse {
            success: false,
            data: Some(serde_json::json!({ "code": "VALIDATION" })),
            error: Some(format!("Invalid path parameter: {}", err)),
        }),
    )
}
