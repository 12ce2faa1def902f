pub mod app;
pub mod domain;
pub mod infra;
pub mod transport;

// Convenience re-exports (keeps call-sites clean)
pub use app::ContentStore;
pub use domain::model::{Comment, Post, User, UserPosts};
pub use domain::{StoreError, StoreResult};
