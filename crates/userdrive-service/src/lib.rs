//! # userdrive-service
//!
//! Business logic for UserDrive's per-user file trees. Every operation
//! resolves caller paths through the storage crate's resolver before the
//! filesystem is touched, and checks that the caller may act on the tree
//! it names.
//!
//! Services follow constructor injection: all dependencies are provided
//! at construction time via `Arc` references and configuration values.

pub mod context;
pub mod tree;

pub use context::RequestContext;
pub use tree::{DownloadService, TreeService, UploadService};
