//! Per-user path resolution with containment checks.
//!
//! Every caller-supplied relative path goes through [`PathResolver::resolve`]
//! before anything touches the filesystem. Resolution is purely lexical:
//! the input is split into segments, `.` and empty segments are dropped,
//! `..` and absolute prefixes are rejected, and the joined absolute path is
//! then re-expressed relative to the user root as a second, independent
//! proof that it still lies inside that root.

use std::path::{Component, Path, PathBuf};

use tracing::warn;

use userdrive_core::error::AppError;
use userdrive_core::result::AppResult;
use userdrive_core::types::UserId;

/// Generic message returned to callers for any containment failure.
const INVALID_PATH: &str = "Invalid path";

/// Maps `(user id, relative path)` pairs onto absolute locations under a
/// shared storage root.
#[derive(Debug, Clone)]
pub struct PathResolver {
    /// Directory holding one subtree per user.
    root: PathBuf,
}

/// A path that has been proven to lie inside its owner's root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPath {
    user_id: UserId,
    relative: String,
    absolute: PathBuf,
}

impl ResolvedPath {
    /// Owner of the tree this path belongs to.
    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    /// Normalized slash-separated path relative to the user root
    /// (`""` for the root itself).
    pub fn relative(&self) -> &str {
        &self.relative
    }

    /// Absolute filesystem location.
    pub fn absolute(&self) -> &Path {
        &self.absolute
    }

    /// Whether this is the user root.
    pub fn is_root(&self) -> bool {
        self.relative.is_empty()
    }

    /// Last segment (`""` for the root).
    pub fn name(&self) -> &str {
        self.relative
            .rsplit_once('/')
            .map_or(self.relative.as_str(), |(_, name)| name)
    }

    /// Relative path of the containing folder (`""` when the parent is the
    /// root, `None` for the root itself).
    pub fn parent_relative(&self) -> Option<&str> {
        if self.is_root() {
            return None;
        }
        Some(self.relative.rsplit_once('/').map_or("", |(parent, _)| parent))
    }

    /// Whether `other` is this path or lies underneath it.
    pub fn contains(&self, other: &ResolvedPath) -> bool {
        if self.user_id != other.user_id {
            return false;
        }
        self.is_root()
            || other.relative == self.relative
            || other
                .relative
                .strip_prefix(&self.relative)
                .is_some_and(|rest| rest.starts_with('/'))
    }
}

impl PathResolver {
    /// Create a resolver rooted at the given storage directory.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The shared storage root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Absolute location of a user's tree.
    pub fn user_root(&self, user_id: &UserId) -> PathBuf {
        self.root.join(user_id.as_str())
    }

    /// Resolve a slash-separated relative path inside `user_id`'s tree.
    pub fn resolve(&self, user_id: &UserId, relative: &str) -> AppResult<ResolvedPath> {
        let segments = match normalize(relative) {
            Some(segments) => segments,
            None => return Err(self.reject(user_id, relative, None)),
        };

        let user_root = self.user_root(user_id);
        let absolute = segments
            .iter()
            .fold(user_root.clone(), |path, segment| path.join(segment));
        let normalized = segments.join("/");

        match relative_to(&user_root, &absolute) {
            Some(proof) if proof == normalized => Ok(ResolvedPath {
                user_id: user_id.clone(),
                relative: normalized,
                absolute,
            }),
            _ => Err(self.reject(user_id, relative, Some(&absolute))),
        }
    }

    /// Resolve a path that arrives already split into segments, as with
    /// catch-all route parameters.
    pub fn resolve_segments<S: AsRef<str>>(
        &self,
        user_id: &UserId,
        segments: &[S],
    ) -> AppResult<ResolvedPath> {
        let joined = segments
            .iter()
            .map(|s| s.as_ref())
            .collect::<Vec<_>>()
            .join("/");
        self.resolve(user_id, &joined)
    }

    /// Resolve `name` inside an already resolved folder. The combined path
    /// goes through the full containment check again.
    pub fn child(&self, parent: &ResolvedPath, name: &str) -> AppResult<ResolvedPath> {
        if parent.is_root() {
            self.resolve(&parent.user_id, name)
        } else {
            self.resolve(&parent.user_id, &format!("{}/{}", parent.relative, name))
        }
    }

    fn reject(&self, user_id: &UserId, requested: &str, resolved: Option<&Path>) -> AppError {
        warn!(
            user_id = %user_id,
            requested = %requested.escape_debug(),
            resolved = ?resolved,
            root = %self.user_root(user_id).display(),
            "Rejected path outside user root"
        );
        AppError::invalid_path(INVALID_PATH)
    }
}

/// Split a caller path into clean segments. Returns `None` when the input
/// contains a parent marker, an absolute prefix, or a NUL byte.
fn normalize(relative: &str) -> Option<Vec<&str>> {
    if relative.contains('\0') || relative.starts_with(['/', '\\']) {
        return None;
    }

    let mut segments = Vec::new();
    for segment in relative.split(['/', '\\']) {
        match segment {
            "" | "." => continue,
            ".." => return None,
            s if segments.is_empty() && looks_like_drive(s) => return None,
            s => segments.push(s),
        }
    }
    Some(segments)
}

/// `C:` style prefixes are absolute on Windows. Elsewhere `c:notes` is an
/// ordinary file name.
fn looks_like_drive(segment: &str) -> bool {
    let bytes = segment.as_bytes();
    cfg!(windows) && bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':'
}

/// Re-derive the slash-separated form of `path` relative to `root`,
/// accepting only plain name components.
fn relative_to(root: &Path, path: &Path) -> Option<String> {
    let rest = path.strip_prefix(root).ok()?;
    let mut parts = Vec::new();
    for component in rest.components() {
        match component {
            Component::Normal(name) => parts.push(name.to_str()?),
            Component::CurDir => continue,
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => return None,
        }
    }
    Some(parts.join("/"))
}
