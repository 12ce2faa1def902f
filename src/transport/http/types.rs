use crate::app::ContentStore;
use crate::domain::model::{
    parse_id, CommentChanges, NewComment, NewPost, NewUser, PostChanges, TableCounts, User,
    UserChanges,
};
use crate::domain::{StoreError, StoreResult};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::sync::Arc;
use tokio::sync::Mutex;
use utoipa::ToSchema;

/// Shared handler state.
///
/// The store sits behind a mutex so requests run their store operation one at a time.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<Mutex<ContentStore>>,
}

impl AppState {
    pub fn new(store: ContentStore) -> Self {
        Self {
            store: Arc::new(Mutex::new(store)),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, ToSchema)]
pub struct ApiResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Object)]
    pub data: Option<JsonValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ApiResponse {
    pub fn ok(data: JsonValue) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }
}

/// Payload of `GET /`.
#[derive(Serialize, Debug, ToSchema)]
pub struct IndexData {
    pub counts: TableCounts,
    pub users: Vec<User>,
}

// Form bodies. Every field is optional at the decoding step so a missing field
// turns into a validation error naming it, not a generic decode failure.

/// Reports a validation error under the form field the client sent rather than
/// the domain field it fills.
fn in_form(err: StoreError, renames: &[(&'static str, &'static str)]) -> StoreError {
    match err {
        StoreError::Validation { field, reason } => {
            let field = renames
                .iter()
                .find(|(domain, _)| *domain == field)
                .map_or(field, |(_, form)| *form);
            StoreError::Validation { field, reason }
        }
        other => other,
    }
}

#[derive(Deserialize, Debug, Default, ToSchema)]
pub struct AddUserForm {
    pub username: Option<String>,
    pub email: Option<String>,
}

impl AddUserForm {
    pub fn validate(self) -> StoreResult<NewUser> {
        NewUser::new(self.username, self.email)
    }
}

#[derive(Deserialize, Debug, Default, ToSchema)]
pub struct UpdateUserForm {
    pub user_id: Option<String>,
    pub new_username: Option<String>,
    pub new_email: Option<String>,
}

impl UpdateUserForm {
    pub fn validate(self) -> StoreResult<(i64, UserChanges)> {
        let id = parse_id("user_id", self.user_id.as_deref())?;
        let changes = UserChanges::new(self.new_username, self.new_email)
            .map_err(|e| in_form(e, &[("username", "new_username"), ("email", "new_email")]))?;
        Ok((id, changes))
    }
}

#[derive(Deserialize, Debug, Default, ToSchema)]
pub struct DeleteUserForm {
    pub user_id: Option<String>,
}

impl DeleteUserForm {
    pub fn validate(self) -> StoreResult<i64> {
        parse_id("user_id", self.user_id.as_deref())
    }
}

#[derive(Deserialize, Debug, Default, ToSchema)]
pub struct AddPostForm {
    pub content: Option<String>,
    /// Owner of the new post.
    pub user_id: Option<String>,
}

impl AddPostForm {
    pub fn validate(self) -> StoreResult<NewPost> {
        let owner_id = parse_id("user_id", self.user_id.as_deref())?;
        NewPost::new(self.content, owner_id)
    }
}

#[derive(Deserialize, Debug, Default, ToSchema)]
pub struct UpdatePostForm {
    pub post_id: Option<String>,
    pub new_content: Option<String>,
}

impl UpdatePostForm {
    pub fn validate(self) -> StoreResult<(i64, PostChanges)> {
        let id = parse_id("post_id", self.post_id.as_deref())?;
        let changes = PostChanges::new(self.new_content)
            .map_err(|e| in_form(e, &[("content", "new_content")]))?;
        Ok((id, changes))
    }
}

#[derive(Deserialize, Debug, Default, ToSchema)]
pub struct DeletePostForm {
    pub post_id: Option<String>,
}

impl DeletePostForm {
    pub fn validate(self) -> StoreResult<i64> {
        parse_id("post_id", self.post_id.as_deref())
    }
}

#[derive(Deserialize, Debug, Default, ToSchema)]
pub struct AddCommentForm {
    /// Comment text.
    pub comment: Option<String>,
    pub post_id: Option<String>,
}

impl AddCommentForm {
    pub fn validate(self) -> StoreResult<NewComment> {
        let post_id = parse_id("post_id", self.post_id.as_deref())?;
        NewComment::new(self.comment, post_id).map_err(|e| in_form(e, &[("text", "comment")]))
    }
}

#[derive(Deserialize, Debug, Default, ToSchema)]
pub struct UpdateCommentForm {
    pub comment_id: Option<String>,
    pub new_comment: Option<String>,
}

impl UpdateCommentForm {
    pub fn validate(self) -> StoreResult<(i64, CommentChanges)> {
        let id = parse_id("comment_id", self.comment_id.as_deref())?;
        let changes = CommentChanges::new(self.new_comment)
            .map_err(|e| in_form(e, &[("text", "new_comment")]))?;
        Ok((id, changes))
    }
}

#[derive(Deserialize, Debug, Default, ToSchema)]
pub struct DeleteCommentForm {
    pub comment_id: Option<String>,
}

impl DeleteCommentForm {
    pub fn validate(self) -> StoreResult<i64> {
        parse_id("comment_id", self.comment_id.as_deref())
    }
}
