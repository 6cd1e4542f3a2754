//! Core type definitions used across the UserDrive workspace.

pub mod entry;
pub mod id;

pub use entry::{Breadcrumb, Entry, EntryKind};
pub use id::UserId;
