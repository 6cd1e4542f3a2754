//! Application state shared across all handlers and middleware.

use std::sync::Arc;

use userdrive_auth::JwtDecoder;
use userdrive_core::config::AppConfig;
use userdrive_service::{DownloadService, TreeService, UploadService};

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
/// All fields are `Arc`-wrapped for cheap cloning across tasks.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<AppConfig>,
    /// JWT token decoder and validator
    pub jwt_decoder: Arc<JwtDecoder>,
    /// List and in-place mutations
    pub tree_service: Arc<TreeService>,
    /// Upload ingest
    pub upload_service: Arc<UploadService>,
    /// Public file reads
    pub download_service: Arc<DownloadService>,
}
