//! Application builder: wires services into state and state into an Axum app.

use std::sync::Arc;

use axum::Router;
use tower_http::compression::CompressionLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use userdrive_auth::JwtDecoder;
use userdrive_core::config::AppConfig;
use userdrive_core::error::{AppError, ErrorKind};
use userdrive_service::{DownloadService, TreeService, UploadService};
use userdrive_storage::LocalStorage;

use crate::middleware::cors::build_cors_layer;
use crate::router::build_router;
use crate::state::AppState;

/// Builds the complete Axum application with all routes and middleware.
pub fn build_app(state: AppState) -> Router {
    let cors = build_cors_layer(&state.config.server.cors);
    build_router(state)
        .layer(CompressionLayer::new())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/// Creates the data directories and constructs every service.
pub async fn build_state(config: AppConfig) -> Result<AppState, AppError> {
    for dir in [&config.storage.data_root, &config.storage.temp_dir] {
        tokio::fs::create_dir_all(dir).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Configuration,
                format!("Failed to create directory: {dir}"),
                e,
            )
        })?;
    }

    let storage = Arc::new(LocalStorage::new(&config.storage.root_dir).await?);
    info!(
        root = %config.storage.root_dir,
        temp = %config.storage.temp_dir,
        max_upload_bytes = config.storage.max_upload_size_bytes,
        "Storage ready"
    );

    let tree_service = Arc::new(TreeService::new(Arc::clone(&storage), &config.storage));
    let upload_service = Arc::new(UploadService::new(Arc::clone(&storage), &config.storage));
    let download_service = Arc::new(DownloadService::new(storage));
    let jwt_decoder = Arc::new(JwtDecoder::new(&config.auth));

    Ok(AppState {
        config: Arc::new(config),
        jwt_decoder,
        tree_service,
        upload_service,
        download_service,
    })
}
