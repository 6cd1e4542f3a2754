//! Building [`Entry`] records from filesystem metadata.

use std::fs::Metadata;

use chrono::{DateTime, Utc};

use userdrive_core::types::{Entry, EntryKind, UserId};
use userdrive_storage::ResolvedPath;
use userdrive_storage::mime;

/// Describe `path` from its metadata. Returns `None` for anything that is
/// neither a regular file nor a folder (symlinks, sockets, ...).
pub fn entry_from_metadata(
    path: &ResolvedPath,
    meta: &Metadata,
    public_base_url: &str,
) -> Option<Entry> {
    let kind = if meta.is_dir() {
        EntryKind::Folder
    } else if meta.is_file() {
        EntryKind::File
    } else {
        return None;
    };

    let created_at = meta
        .created()
        .or_else(|_| meta.modified())
        .map(DateTime::<Utc>::from)
        .unwrap_or_else(|_| Utc::now());

    let (size, mime_type, public_url) = match kind {
        EntryKind::Folder => (0, None, None),
        EntryKind::File => (
            meta.len(),
            Some(mime::mime_or_default(path.name()).to_string()),
            Some(public_url(public_base_url, path.user_id(), path.relative())),
        ),
    };

    Some(Entry {
        id: path.relative().to_string(),
        name: path.name().to_string(),
        kind,
        size,
        mime_type,
        public_url,
        created_at,
        path: path.relative().to_string(),
    })
}

/// Public locator of a file: `{base}/api/files/public/{user}/{path}` with
/// every segment percent-encoded.
pub fn public_url(base: &str, user_id: &UserId, relative: &str) -> String {
    let encoded = relative
        .split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/");
    format!(
        "{}/api/files/public/{}/{}",
        base.trim_end_matches('/'),
        urlencoding::encode(user_id.as_str()),
        encoded
    )
}
