//! Domain model: the three record types and the typed inputs that create or change them.

pub mod input;
pub mod records;

pub use input::{
    parse_id, CommentChanges, NewComment, NewPost, NewUser, PostChanges, UserChanges, UserFields,
    EMAIL_MAX_LEN, USERNAME_MAX_LEN,
};
pub use records::{CascadeSummary, Comment, Post, PostThread, TableCounts, User, UserPosts};

/// Table-level metadata for a record type.
///
/// The store uses this to create the schema and to run the lookups that are
/// identical for every record type (fetch by id, delete by id, count).
pub trait Entity {
    /// Human readable name, used in error messages and logs.
    const LABEL: &'static str;

    /// Name of the backing table.
    const TABLE: &'static str;

    /// `CREATE TABLE IF NOT EXISTS` statement for the table.
    const CREATE_TABLE_SQL: &'static str;

    /// Secondary indexes (parent id -> children lookups).
    const INDEX_SQL: &'static [&'static str] = &[];
}

impl Entity for User {
    const LABEL: &'static str = "user";
    const TABLE: &'static str = "user";
    const CREATE_TABLE_SQL: &'static str = r#"CREATE TABLE IF NOT EXISTS "user" (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            username VARCHAR(50) NOT NULL UNIQUE,
            email VARCHAR(120) NOT NULL UNIQUE
        )"#;
}

impl Entity for Post {
    const LABEL: &'static str = "post";
    const TABLE: &'static str = "post";
    const CREATE_TABLE_SQL: &'static str = r#"CREATE TABLE IF NOT EXISTS "post" (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            content TEXT NOT NULL,
            user_id INTEGER NOT NULL REFERENCES "user"(id) ON DELETE CASCADE
        )"#;
    const INDEX_SQL: &'static [&'static str] =
        &[r#"CREATE INDEX IF NOT EXISTS idx_post_user_id ON "post"(user_id, id)"#];
}

impl Entity for Comment {
    const LABEL: &'static str = "comment";
    const TABLE: &'static str = "comment";
    const CREATE_TABLE_SQL: &'static str = r#"CREATE TABLE IF NOT EXISTS "comment" (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            text TEXT NOT NULL,
            post_id INTEGER NOT NULL REFERENCES "post"(id) ON DELETE CASCADE
        )"#;
    const INDEX_SQL: &'static [&'static str] =
        &[r#"CREATE INDEX IF NOT EXISTS idx_comment_post_id ON "comment"(post_id, id)"#];
}
