//! # userdrive-api
//!
//! HTTP API layer for UserDrive built on Axum.
//!
//! Provides the file tree endpoints, the unauthenticated public read
//! routes, middleware (CORS, logging), the `AuthUser` extractor, DTOs, and
//! error mapping.

pub mod app;
pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use app::{build_app, build_state};
pub use error::ApiError;
pub use state::AppState;
