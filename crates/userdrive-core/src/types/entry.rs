//! File and folder records as exposed to callers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Whether an entry is a regular file or a folder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    /// A regular file.
    File,
    /// A directory.
    Folder,
}

/// A file or folder inside a user's tree.
///
/// Entries are derived live from filesystem metadata; nothing here is
/// persisted. The relative `path` doubles as the identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entry {
    /// Same as `path`; kept so clients can key on a stable `id`.
    pub id: String,
    /// Last path segment.
    pub name: String,
    /// File or folder.
    #[serde(rename = "type")]
    pub kind: EntryKind,
    /// Size in bytes (0 for folders).
    pub size: u64,
    /// Mime classification derived from the extension (files only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    /// Public locator (files only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_url: Option<String>,
    /// Filesystem birth time, falling back to modification time.
    pub created_at: DateTime<Utc>,
    /// Slash-separated path relative to the user's root.
    pub path: String,
}

impl Entry {
    /// Returns `true` for folders.
    pub fn is_folder(&self) -> bool {
        self.kind == EntryKind::Folder
    }

    /// Relative path of the containing folder (`""` for the root).
    pub fn parent_path(&self) -> &str {
        self.path.rsplit_once('/').map_or("", |(parent, _)| parent)
    }
}

/// One step of the navigation trail from the root to a folder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Breadcrumb {
    /// Display name (`""` for the root).
    pub name: String,
    /// Cumulative relative path (`""` for the root).
    pub path: String,
}
