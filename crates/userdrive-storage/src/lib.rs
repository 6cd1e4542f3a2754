//! # userdrive-storage
//!
//! Filesystem layer for UserDrive: the per-user [`PathResolver`] that proves
//! containment of every caller-supplied path, the extension-based mime
//! table, and [`LocalStorage`], which only ever accepts resolved paths.

pub mod local;
pub mod mime;
pub mod resolver;

pub use local::{ByteStream, DirChild, LocalStorage};
pub use resolver::{PathResolver, ResolvedPath};
