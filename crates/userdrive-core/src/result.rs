//! Convenience result type alias for UserDrive.

use crate::error::AppError;

/// A specialized `Result` type for UserDrive operations.
pub type AppResult<T> = Result<T, AppError>;
