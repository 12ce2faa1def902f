use crate::domain::model::{CascadeSummary, Comment, Post, PostThread, TableCounts, User, UserPosts};
use crate::transport::http::handlers::{comments, health, index, posts, users};
use crate::transport::http::types::{
    AddCommentForm, AddPostForm, AddUserForm, ApiResponse, AppState, DeleteCommentForm,
    DeletePostForm, DeleteUserForm, IndexData, UpdateCommentForm, UpdatePostForm, UpdateUserForm,
};
use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        health::healthcheck_handler,
        index::index_handler,
        index::user_posts_handler,
        users::add_user_handler,
        users::update_user_handler,
        users::delete_user_handler,
        posts::add_post_handler,
        posts::update_post_handler,
        posts::delete_post_handler,
        comments::add_comment_handler,
        comments::update_comment_handler,
        comments::delete_comment_handler
    ),
    components(schemas(
        ApiResponse,
        IndexData,
        AddUserForm,
        UpdateUserForm,
        DeleteUserForm,
        AddPostForm,
        UpdatePostForm,
        DeletePostForm,
        AddCommentForm,
        UpdateCommentForm,
        DeleteCommentForm,
        User,
        Post,
        Comment,
        PostThread,
        UserPosts,
        CascadeSummary,
        TableCounts
    ))
)]
pub struct ApiDoc;

pub fn create_router(app_state: AppState) -> Router {
    Router::new()
        .route("/", get(index::index_handler))
        .route("/health", get(health::healthcheck_handler))
        .route("/user/:user_id/posts", get(index::user_posts_handler))
        .route("/add_user", post(users::add_user_handler))
        .route("/update_user", post(users::update_user_handler))
        .route("/delete_user", post(users::delete_user_handler))
        .route("/add_post", post(posts::add_post_handler))
        .route("/update_post", post(posts::update_post_handler))
        .route("/delete_post", post(posts::delete_post_handler))
        .route("/add_comment", post(comments::add_comment_handler))
        .route("/update_comment", post(comments::update_comment_handler))
        .route("/delete_comment", post(comments::delete_comment_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}
