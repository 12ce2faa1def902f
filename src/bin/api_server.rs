// src/bin/api_server.rs

use content_manager::infra::{config, logging};
use content_manager::transport;
use content_manager::ContentStore;
use tower_http::cors::{Any, CorsLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    logging::init();

    // --- Store Initialization ---
    let database_url = config::database_url();
    let store = ContentStore::open(&database_url, config::max_connections()?).await?;
    store.init().await?;
    let counts = store.counts().await?;
    tracing::info!(
        users = counts.users,
        posts = counts.posts,
        comments = counts.comments,
        "content store ready"
    );

    let app_state = transport::http::AppState::new(store);

    // --- API Server Initialization ---
    let cors = CorsLayer::new().allow_origin(Any).allow_methods(Any);
    let app = transport::http::create_router(app_state)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", transport::http::ApiDoc::openapi()))
        .layer(cors);

    let addr = config::bind_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "API server listening (Swagger UI at /swagger-ui)");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "failed to listen for Ctrl+C");
            }
            tracing::info!("shutdown signal received");
        })
        .await?;

    tracing::info!("graceful shutdown complete");
    Ok(())
}
