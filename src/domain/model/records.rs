use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Post {
    pub id: i64,
    pub content: String,
    /// Owning user. Stored in the `user_id` column.
    #[sqlx(rename = "user_id")]
    pub owner_id: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Comment {
    pub id: i64,
    pub text: String,
    pub post_id: i64,
}

/// A post together with its comments, oldest first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct PostThread {
    #[serde(flatten)]
    pub post: Post,
    pub comments: Vec<Comment>,
}

/// A user with every post it owns (insertion order), each carrying its comments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct UserPosts {
    pub user: User,
    pub posts: Vec<PostThread>,
}

/// Dependent records removed alongside a deleted parent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct CascadeSummary {
    pub posts: u64,
    pub comments: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct TableCounts {
    pub users: i64,
    pub posts: i64,
    pub comments: i64,
}
