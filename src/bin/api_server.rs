// src/bin/api_server.rs

use content_api::domain::model::content_models;
use content_api::infra::config::{self, ObjectBackend, ObjectStoreConfig, StorageBackend};
use content_api::infra::logging;
use content_api::transport;
use content_api::{EntityStore, MemoryEntityStore, MemoryObjectStore, ObjectStore, PgEntityStore, S3ObjectStore};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    logging::init();

    // --- Entity store ---
    let entity_store: Arc<dyn EntityStore> = match config::storage_backend()? {
        StorageBackend::Postgres => {
            let store = PgEntityStore::connect(
                &config::database_url()?,
                config::database_max_connections()?,
            )
            .await?;
            store.ensure_schema(&content_models()).await?;
            tracing::info!("connected to PostgreSQL, schema ready");
            Arc::new(store)
        }
        StorageBackend::Memory => {
            tracing::warn!("using in-memory entity store; data is lost on restart");
            Arc::new(MemoryEntityStore::new())
        }
    };

    // --- Object store ---
    let object_store: Arc<dyn ObjectStore> = match config::object_backend()? {
        ObjectBackend::S3 => {
            let cfg = ObjectStoreConfig::from_env()?;
            tracing::info!(bucket = %cfg.bucket, region = %cfg.region, "using S3 object store");
            Arc::new(S3ObjectStore::new(cfg).await)
        }
        ObjectBackend::Memory => {
            tracing::warn!("using in-memory object store; uploads are lost on restart");
            Arc::new(MemoryObjectStore::default())
        }
    };

    let app_state = transport::http::AppState::new(entity_store, object_store);

    // --- API Server Initialization ---
    let cors = CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any);
    let app = transport::http::create_router(app_state)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", transport::http::ApiDoc::openapi()))
        .layer(cors);

    let addr = config::bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("API server listening on http://{}", addr);
    tracing::info!("Swagger UI available at /swagger-ui");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "failed to listen for shutdown signal");
            }
            tracing::info!("shutdown signal received");
        })
        .await?;

    Ok(())
}
