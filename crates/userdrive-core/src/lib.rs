//! # userdrive-core
//!
//! Core crate for UserDrive. Contains configuration schemas, the typed
//! user identifier, the `Entry` record exposed to callers, and the unified
//! error system.
//!
//! This crate has **no** internal dependencies on other UserDrive crates.

pub mod config;
pub mod error;
pub mod result;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
