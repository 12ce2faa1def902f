pub mod router;
pub mod types;
pub mod handlers {
    pub mod comments;
    pub mod common;
    pub mod health;
    pub mod index;
    pub mod posts;
    pub mod users;
}

pub use router::{create_router, ApiDoc};
pub use types::AppState;
