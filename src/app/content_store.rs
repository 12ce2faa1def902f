//! The relational content store.
//!
//! Owns the SQLite pool and is the only place rows are written. It is responsible for:
//! 1.  Creating the `user`, `post` and `comment` tables and their parent-id indexes.
//! 2.  Enforcing references (post owner, comment post) and user uniqueness.
//! 3.  Cascading deletes: a user takes its posts with it, a post takes its comments.
//!
//! Each mutating call runs in its own transaction, and the first statement of every
//! such transaction is a write. SQLite then takes the write lock at once (waiting up to
//! [`BUSY_TIMEOUT`] behind other writers) instead of failing a read-to-write upgrade with
//! `SQLITE_BUSY`. Parent references and user uniqueness are enforced by the schema's
//! FOREIGN KEY and UNIQUE constraints; their failures map onto `NotFound` and `Conflict`.

use crate::domain::model::{
    CascadeSummary, Comment, CommentChanges, Entity, NewComment, NewPost, NewUser, Post,
    PostChanges, PostThread, TableCounts, User, UserChanges, UserPosts,
};
use crate::domain::{StoreError, StoreResult};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow};
use sqlx::{FromRow, Sqlite, SqliteConnection, SqlitePool};
use std::collections::HashMap;
use std::str::FromStr;
use std::time::Duration;

/// How long a writer waits for another connection's write lock.
pub const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// The store handle. Cheap to share by reference; all state lives in the database.
pub struct ContentStore {
    pool: SqlitePool,
}

impl ContentStore {
    /// Connects to the database at `database_url`, creating the file if it does not exist.
    ///
    /// The schema is not touched; call [`ContentStore::init`] afterwards.
    pub async fn open(database_url: &str, max_connections: u32) -> StoreResult<Self> {
        let options = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true)
            .foreign_keys(true)
            .busy_timeout(BUSY_TIMEOUT);

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections.max(1))
            .connect_with(options)
            .await?;

        tracing::info!(database_url, max_connections, "opened content store");
        Ok(Self { pool })
    }

    /// Opens a private in-memory database.
    ///
    /// The pool holds exactly one connection that is never recycled, since every
    /// SQLite in-memory connection is a separate database.
    pub async fn open_in_memory() -> StoreResult<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .min_connections(1)
            .max_connections(1)
            .idle_timeout(None::<Duration>)
            .max_lifetime(None::<Duration>)
            .connect_with(options)
            .await?;

        Ok(Self { pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Creates the tables and indexes if they are missing. Safe to call repeatedly.
    pub async fn init(&self) -> StoreResult<()> {
        let mut tx = self.pool.begin().await?;
        create_table::<User>(&mut tx).await?;
        create_table::<Post>(&mut tx).await?;
        create_table::<Comment>(&mut tx).await?;
        tx.commit().await?;

        tracing::debug!("schema ready");
        Ok(())
    }

    pub async fn ping(&self) -> StoreResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    pub async fn counts(&self) -> StoreResult<TableCounts> {
        let mut conn = self.pool.acquire().await?;
        Ok(TableCounts {
            users: count::<User>(&mut conn).await?,
            posts: count::<Post>(&mut conn).await?,
            comments: count::<Comment>(&mut conn).await?,
        })
    }

    // ---------------------------------------------------------------------
    // Users
    // ---------------------------------------------------------------------

    pub async fn create_user(&self, input: NewUser) -> StoreResult<User> {
        let mut tx = self.pool.begin().await?;
        let id = sqlx::query(r#"INSERT INTO "user" (username, email) VALUES (?, ?)"#)
            .bind(input.username())
            .bind(input.email())
            .execute(&mut *tx)
            .await
            .map_err(|e| user_write_error(e, input.username(), input.email()))?
            .last_insert_rowid();
        tx.commit().await?;

        tracing::info!(user_id = id, username = input.username(), "created user");
        Ok(User {
            id,
            username: input.username().to_string(),
            email: input.email().to_string(),
        })
    }

    pub async fn get_user(&self, id: i64) -> StoreResult<User> {
        let mut conn = self.pool.acquire().await?;
        require::<User>(&mut conn, id).await
    }

    pub async fn list_users(&self) -> StoreResult<Vec<User>> {
        let users = sqlx::query_as::<_, User>(r#"SELECT * FROM "user" ORDER BY id"#)
            .fetch_all(&self.pool)
            .await?;
        Ok(users)
    }

    /// Overwrites username and email. Re-saving a user's own values is not a conflict.
    pub async fn update_user(&self, id: i64, changes: UserChanges) -> StoreResult<User> {
        let mut tx = self.pool.begin().await?;
        let updated = sqlx::query(r#"UPDATE "user" SET username = ?, email = ? WHERE id = ?"#)
            .bind(changes.username())
            .bind(changes.email())
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(|e| user_write_error(e, changes.username(), changes.email()))?
            .rows_affected();
        if updated == 0 {
            return Err(StoreError::not_found(User::LABEL, id));
        }
        tx.commit().await?;

        tracing::info!(user_id = id, "updated user");
        Ok(User {
            id,
            username: changes.username().to_string(),
            email: changes.email().to_string(),
        })
    }

    /// Deletes a user, its posts, and the comments on those posts.
    ///
    /// The user row goes last; if it does not exist the transaction rolls back.
    pub async fn delete_user(&self, id: i64) -> StoreResult<CascadeSummary> {
        let mut tx = self.pool.begin().await?;
        let comments = sqlx::query(
            r#"DELETE FROM "comment" WHERE post_id IN (SELECT id FROM "post" WHERE user_id = ?)"#,
        )
        .bind(id)
        .execute(&mut *tx)
        .await?
        .rows_affected();
        let posts = sqlx::query(r#"DELETE FROM "post" WHERE user_id = ?"#)
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();
        delete_row::<User>(&mut tx, id).await?;
        tx.commit().await?;

        let removed = CascadeSummary { posts, comments };
        tracing::info!(user_id = id, posts, comments, "deleted user");
        Ok(removed)
    }

    /// Posts owned by `user_id`, oldest first.
    pub async fn list_posts_for_user(&self, user_id: i64) -> StoreResult<Vec<Post>> {
        let mut conn = self.pool.acquire().await?;
        require::<User>(&mut conn, user_id).await?;
        posts_of(&mut conn, user_id).await
    }

    /// A user with its posts and each post's comments, read from one snapshot.
    pub async fn get_user_with_posts(&self, user_id: i64) -> StoreResult<UserPosts> {
        let mut tx = self.pool.begin().await?;
        let user = require::<User>(&mut tx, user_id).await?;
        let posts = posts_of(&mut tx, user_id).await?;

        let comments = sqlx::query_as::<_, Comment>(
            r#"SELECT c.* FROM "comment" c
               JOIN "post" p ON c.post_id = p.id
               WHERE p.user_id = ?
               ORDER BY c.id"#,
        )
        .bind(user_id)
        .fetch_all(&mut *tx)
        .await?;
        tx.commit().await?;

        let mut by_post: HashMap<i64, Vec<Comment>> = HashMap::new();
        for comment in comments {
            by_post.entry(comment.post_id).or_default().push(comment);
        }

        let posts = posts
            .into_iter()
            .map(|post| {
                let comments = by_post.remove(&post.id).unwrap_or_default();
                PostThread { post, comments }
            })
            .collect();

        Ok(UserPosts { user, posts })
    }

    // ---------------------------------------------------------------------
    // Posts
    // ---------------------------------------------------------------------

    /// Fails with `NotFound` if the owner does not exist.
    pub async fn create_post(&self, input: NewPost) -> StoreResult<Post> {
        let mut tx = self.pool.begin().await?;
        let id = sqlx::query(r#"INSERT INTO "post" (content, user_id) VALUES (?, ?)"#)
            .bind(input.content())
            .bind(input.owner_id())
            .execute(&mut *tx)
            .await
            .map_err(|e| parent_write_error(e, User::LABEL, input.owner_id()))?
            .last_insert_rowid();
        tx.commit().await?;

        tracing::info!(post_id = id, owner_id = input.owner_id(), "created post");
        Ok(Post {
            id,
            content: input.content().to_string(),
            owner_id: input.owner_id(),
        })
    }

    pub async fn get_post(&self, id: i64) -> StoreResult<Post> {
        let mut conn = self.pool.acquire().await?;
        require::<Post>(&mut conn, id).await
    }

    /// Replaces the content; the owner never changes.
    pub async fn update_post(&self, id: i64, changes: PostChanges) -> StoreResult<Post> {
        let mut tx = self.pool.begin().await?;
        let updated = sqlx::query(r#"UPDATE "post" SET content = ? WHERE id = ?"#)
            .bind(changes.content())
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();
        if updated == 0 {
            return Err(StoreError::not_found(Post::LABEL, id));
        }
        let post = require::<Post>(&mut tx, id).await?;
        tx.commit().await?;

        tracing::info!(post_id = id, "updated post");
        Ok(post)
    }

    /// Deletes a post and its comments.
    pub async fn delete_post(&self, id: i64) -> StoreResult<CascadeSummary> {
        let mut tx = self.pool.begin().await?;
        let comments = sqlx::query(r#"DELETE FROM "comment" WHERE post_id = ?"#)
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();
        delete_row::<Post>(&mut tx, id).await?;
        tx.commit().await?;

        tracing::info!(post_id = id, comments, "deleted post");
        Ok(CascadeSummary { posts: 0, comments })
    }

    /// Comments on `post_id`, oldest first.
    pub async fn list_comments_for_post(&self, post_id: i64) -> StoreResult<Vec<Comment>> {
        let mut conn = self.pool.acquire().await?;
        require::<Post>(&mut conn, post_id).await?;

        let comments =
            sqlx::query_as::<_, Comment>(r#"SELECT * FROM "comment" WHERE post_id = ? ORDER BY id"#)
                .bind(post_id)
                .fetch_all(&mut *conn)
                .await?;
        Ok(comments)
    }

    // ---------------------------------------------------------------------
    // Comments
    // ---------------------------------------------------------------------

    /// Fails with `NotFound` if the post does not exist.
    pub async fn create_comment(&self, input: NewComment) -> StoreResult<Comment> {
        let mut tx = self.pool.begin().await?;
        let id = sqlx::query(r#"INSERT INTO "comment" (text, post_id) VALUES (?, ?)"#)
            .bind(input.text())
            .bind(input.post_id())
            .execute(&mut *tx)
            .await
            .map_err(|e| parent_write_error(e, Post::LABEL, input.post_id()))?
            .last_insert_rowid();
        tx.commit().await?;

        tracing::info!(comment_id = id, post_id = input.post_id(), "created comment");
        Ok(Comment {
            id,
            text: input.text().to_string(),
            post_id: input.post_id(),
        })
    }

    pub async fn get_comment(&self, id: i64) -> StoreResult<Comment> {
        let mut conn = self.pool.acquire().await?;
        require::<Comment>(&mut conn, id).await
    }

    pub async fn update_comment(&self, id: i64, changes: CommentChanges) -> StoreResult<Comment> {
        let mut tx = self.pool.begin().await?;
        let updated = sqlx::query(r#"UPDATE "comment" SET text = ? WHERE id = ?"#)
            .bind(changes.text())
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();
        if updated == 0 {
            return Err(StoreError::not_found(Comment::LABEL, id));
        }
        let comment = require::<Comment>(&mut tx, id).await?;
        tx.commit().await?;

        tracing::info!(comment_id = id, "updated comment");
        Ok(comment)
    }

    pub async fn delete_comment(&self, id: i64) -> StoreResult<()> {
        let mut tx = self.pool.begin().await?;
        delete_row::<Comment>(&mut tx, id).await?;
        tx.commit().await?;

        tracing::info!(comment_id = id, "deleted comment");
        Ok(())
    }
}

async fn create_table<E: Entity>(conn: &mut SqliteConnection) -> StoreResult<()> {
    sqlx::query(E::CREATE_TABLE_SQL).execute(&mut *conn).await?;
    for index in E::INDEX_SQL {
        sqlx::query(*index).execute(&mut *conn).await?;
    }
    Ok(())
}

/// Fetches a record by id, or `NotFound` naming the entity.
async fn require<E>(conn: &mut SqliteConnection, id: i64) -> StoreResult<E>
where
    E: Entity + for<'r> FromRow<'r, SqliteRow> + Send + Unpin,
{
    let sql = format!(r#"SELECT * FROM "{}" WHERE id = ?"#, E::TABLE);
    sqlx::query_as::<Sqlite, E>(&sql)
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| StoreError::not_found(E::LABEL, id))
}

async fn delete_row<E: Entity>(conn: &mut SqliteConnection, id: i64) -> StoreResult<()> {
    let sql = format!(r#"DELETE FROM "{}" WHERE id = ?"#, E::TABLE);
    let affected = sqlx::query(&sql)
        .bind(id)
        .execute(&mut *conn)
        .await?
        .rows_affected();
    if affected == 0 {
        return Err(StoreError::not_found(E::LABEL, id));
    }
    Ok(())
}

async fn count<E: Entity>(conn: &mut SqliteConnection) -> StoreResult<i64> {
    let sql = format!(r#"SELECT COUNT(*) FROM "{}""#, E::TABLE);
    Ok(sqlx::query_scalar::<Sqlite, i64>(&sql).fetch_one(&mut *conn).await?)
}

async fn posts_of(conn: &mut SqliteConnection, user_id: i64) -> StoreResult<Vec<Post>> {
    let posts = sqlx::query_as::<_, Post>(r#"SELECT * FROM "post" WHERE user_id = ? ORDER BY id"#)
        .bind(user_id)
        .fetch_all(&mut *conn)
        .await?;
    Ok(posts)
}

/// Maps a UNIQUE constraint failure from the driver onto `Conflict`.
fn user_write_error(err: sqlx::Error, username: &str, email: &str) -> StoreError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            // SQLite names the column: "UNIQUE constraint failed: user.email"
            if db.message().contains("user.email") {
                StoreError::conflict(User::LABEL, "email", email)
            } else {
                StoreError::conflict(User::LABEL, "username", username)
            }
        }
        _ => StoreError::Database(err),
    }
}

/// Maps a FOREIGN KEY failure on insert onto `NotFound` for the referenced parent.
fn parent_write_error(err: sqlx::Error, parent: &'static str, parent_id: i64) -> StoreError {
    match &err {
        sqlx::Error::Database(db) if db.is_foreign_key_violation() => {
            StoreError::not_found(parent, parent_id)
        }
        _ => StoreError::Database(err),
    }
}
