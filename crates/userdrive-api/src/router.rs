//! Route definitions for the UserDrive HTTP API.
//!
//! The router receives `AppState` and passes it to all handlers via Axum's
//! `State` extractor.

use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware as axum_middleware,
    routing::{delete, get, post},
};

use crate::handlers;
use crate::middleware;
use crate::state::AppState;

/// Room for multipart framing and the text fields around the file.
const MULTIPART_OVERHEAD_BYTES: u64 = 1024 * 1024;

/// Build the Axum router with all routes, the body limit and request logging.
pub fn build_router(state: AppState) -> Router {
    let max_body = state
        .config
        .storage
        .max_upload_size_bytes
        .saturating_add(MULTIPART_OVERHEAD_BYTES);
    let max_body = usize::try_from(max_body).unwrap_or(usize::MAX);

    Router::new()
        .merge(file_routes())
        .merge(public_routes())
        .merge(health_routes())
        .layer(DefaultBodyLimit::max(max_body))
        .layer(axum_middleware::from_fn(middleware::logging::request_logging))
        .with_state(state)
}

/// Authenticated tree operations
fn file_routes() -> Router<AppState> {
    Router::new()
        .route("/api/files/list", get(handlers::files::list))
        .route("/api/files/create-folder", post(handlers::files::create_folder))
        .route("/api/files/rename", post(handlers::files::rename))
        .route("/api/files/move", post(handlers::files::move_entry))
        .route("/api/files/delete", delete(handlers::files::delete))
        .route("/api/files/upload", post(handlers::files::upload))
}

/// Unauthenticated file reads
fn public_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/api/files/public/{user_id}/{*path}",
            get(handlers::public::public_file),
        )
        .route("/raw/{user_id}/{*path}", get(handlers::public::public_file))
}

/// Liveness
fn health_routes() -> Router<AppState> {
    Router::new().route("/api/health", get(handlers::health::health))
}
