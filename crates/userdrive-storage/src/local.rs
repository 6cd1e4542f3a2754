//! Local filesystem storage.
//!
//! [`LocalStorage`] only accepts [`ResolvedPath`]s for anything inside a
//! user tree, so every caller has to go through the resolver first. The
//! one exception is the upload staging file, which lives outside user
//! trees and is addressed by plain [`Path`].

use std::fs::Metadata;
use std::io;
use std::path::{Path, PathBuf};
use std::pin::Pin;

use bytes::Bytes;
use futures::Stream;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio_util::io::ReaderStream;
use tracing::{debug, warn};

use userdrive_core::error::{AppError, ErrorKind};
use userdrive_core::result::AppResult;

use crate::resolver::{PathResolver, ResolvedPath};

/// A stream of file bytes.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, io::Error>> + Send>>;

/// One direct child of a listed folder.
#[derive(Debug)]
pub struct DirChild {
    /// File name of the child.
    pub name: String,
    /// Metadata of the child itself (symlinks are not followed).
    pub metadata: Metadata,
}

/// Local filesystem storage rooted at the directory holding all user trees.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    root: PathBuf,
}

impl LocalStorage {
    /// Create the storage, making sure the root directory exists.
    pub async fn new(root: impl Into<PathBuf>) -> AppResult<Self> {
        let root = root.into();
        fs::create_dir_all(&root).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Configuration,
                format!("Failed to create storage root: {}", root.display()),
                e,
            )
        })?;
        Ok(Self { root })
    }

    /// A resolver for paths under this storage root.
    pub fn resolver(&self) -> PathResolver {
        PathResolver::new(self.root.clone())
    }

    /// Metadata of `path` without following symlinks, or `None` if it does
    /// not exist.
    pub async fn metadata(&self, path: &ResolvedPath) -> AppResult<Option<Metadata>> {
        match fs::symlink_metadata(path.absolute()).await {
            Ok(meta) => Ok(Some(meta)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(internal("Failed to stat path", path, e)),
        }
    }

    /// Direct children of a folder, or `None` if the folder does not exist.
    ///
    /// Children removed while the listing runs are skipped, as are names
    /// that are not valid UTF-8.
    pub async fn read_dir(&self, path: &ResolvedPath) -> AppResult<Option<Vec<DirChild>>> {
        let mut dir = match fs::read_dir(path.absolute()).await {
            Ok(dir) => dir,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) if e.kind() == io::ErrorKind::NotADirectory => {
                return Err(AppError::validation("Path is not a folder"));
            }
            Err(e) => return Err(internal("Failed to list folder", path, e)),
        };

        let mut children = Vec::new();
        while let Some(entry) = dir
            .next_entry()
            .await
            .map_err(|e| internal("Failed to read folder entry", path, e))?
        {
            let Ok(name) = entry.file_name().into_string() else {
                debug!(folder = %path.absolute().display(), "Skipping non UTF-8 name");
                continue;
            };
            let metadata = match entry.metadata().await {
                Ok(meta) => meta,
                Err(e) if e.kind() == io::ErrorKind::NotFound => continue,
                Err(e) => return Err(internal("Failed to stat folder entry", path, e)),
            };
            children.push(DirChild { name, metadata });
        }

        Ok(Some(children))
    }

    /// Create a single folder. The parent must already exist.
    pub async fn create_dir(&self, path: &ResolvedPath) -> AppResult<()> {
        fs::create_dir(path.absolute()).await.map_err(|e| match e.kind() {
            io::ErrorKind::AlreadyExists => {
                AppError::conflict("A file or folder with that name already exists")
            }
            io::ErrorKind::NotFound => AppError::not_found("Parent folder not found"),
            _ => internal("Failed to create folder", path, e),
        })?;
        debug!(path = %path.absolute().display(), "Created folder");
        Ok(())
    }

    /// Create a folder and any missing ancestors.
    pub async fn create_dir_all(&self, path: &ResolvedPath) -> AppResult<()> {
        fs::create_dir_all(path.absolute())
            .await
            .map_err(|e| internal("Failed to create folder", path, e))
    }

    /// Rename `from` to `to` within the same filesystem.
    pub async fn rename(&self, from: &ResolvedPath, to: &ResolvedPath) -> AppResult<()> {
        fs::rename(from.absolute(), to.absolute())
            .await
            .map_err(|e| match e.kind() {
                io::ErrorKind::NotFound => AppError::not_found("File or folder not found"),
                _ => internal("Failed to rename", from, e),
            })?;
        debug!(
            from = %from.absolute().display(),
            to = %to.absolute().display(),
            "Renamed"
        );
        Ok(())
    }

    /// Remove a file, or a folder with everything below it.
    ///
    /// Symlinks are removed themselves, never followed. A missing top-level
    /// path is a not-found error; descendants that disappear concurrently
    /// are ignored.
    pub async fn remove(&self, path: &ResolvedPath) -> AppResult<()> {
        let target = path.absolute().to_path_buf();
        let result = tokio::task::spawn_blocking(move || remove_tree(&target))
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Internal, "Delete task failed", e))?;

        match result {
            Ok(()) => {
                debug!(path = %path.absolute().display(), "Removed");
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                Err(AppError::not_found("File or folder not found"))
            }
            Err(e) => Err(internal("Failed to delete", path, e)),
        }
    }

    /// Exclusively create a new file. Returns `None` if something already
    /// exists at `path`.
    pub async fn create_new(&self, path: &ResolvedPath) -> AppResult<Option<fs::File>> {
        match fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(path.absolute())
            .await
        {
            Ok(file) => Ok(Some(file)),
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => Ok(None),
            Err(e) => Err(internal("Failed to create file", path, e)),
        }
    }

    /// Copy the contents of a staging file into an already opened
    /// destination, returning the number of bytes written.
    pub async fn copy_from(&self, source: &Path, dest: &mut fs::File) -> AppResult<u64> {
        let mut input = fs::File::open(source).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Internal,
                format!("Failed to open staging file: {}", source.display()),
                e,
            )
        })?;
        let written = tokio::io::copy(&mut input, dest)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Internal, "Failed to copy file", e))?;
        dest.flush()
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Internal, "Failed to flush file", e))?;
        Ok(written)
    }

    /// Remove a plain file, treating a missing file as success.
    pub async fn remove_file_if_exists(&self, path: &Path) -> AppResult<()> {
        match fs::remove_file(path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Failed to remove file");
                Err(AppError::with_source(
                    ErrorKind::Internal,
                    "Failed to remove file",
                    e,
                ))
            }
        }
    }

    /// Open a file for streaming reads.
    pub async fn read(&self, path: &ResolvedPath) -> AppResult<ByteStream> {
        let file = fs::File::open(path.absolute()).await.map_err(|e| {
            if e.kind() == io::ErrorKind::NotFound {
                AppError::not_found("File not found")
            } else {
                internal("Failed to open file", path, e)
            }
        })?;
        Ok(Box::pin(ReaderStream::new(file)))
    }
}

fn internal(message: &str, path: &ResolvedPath, err: io::Error) -> AppError {
    warn!(path = %path.absolute().display(), error = %err, "{message}");
    AppError::with_source(ErrorKind::Internal, message, err)
}

/// Depth-first removal that never follows symlinks.
fn remove_tree(path: &Path) -> io::Result<()> {
    let meta = std::fs::symlink_metadata(path)?;
    if !meta.is_dir() {
        return std::fs::remove_file(path);
    }

    for entry in std::fs::read_dir(path)? {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) if e.kind() == io::ErrorKind::NotFound => continue,
            Err(e) => return Err(e),
        };
        match remove_tree(&entry.path()) {
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            other => other?,
        }
    }

    std::fs::remove_dir(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;
    use userdrive_core::types::UserId;

    async fn setup() -> (tempfile::TempDir, LocalStorage, PathResolver, UserId) {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalStorage::new(dir.path().join("users")).await.unwrap();
        let resolver = storage.resolver();
        let user = UserId::parse("u1").unwrap();
        let root = resolver.resolve(&user, "").unwrap();
        storage.create_dir_all(&root).await.unwrap();
        (dir, storage, resolver, user)
    }

    #[tokio::test]
    async fn test_create_dir_reports_conflict_and_missing_parent() {
        let (_dir, storage, resolver, user) = setup().await;
        let docs = resolver.resolve(&user, "docs").unwrap();
        storage.create_dir(&docs).await.unwrap();

        let err = storage.create_dir(&docs).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Conflict);

        let orphan = resolver.resolve(&user, "missing/child").unwrap();
        let err = storage.create_dir(&orphan).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_read_dir_missing_and_present() {
        let (_dir, storage, resolver, user) = setup().await;
        let missing = resolver.resolve(&user, "nope").unwrap();
        assert!(storage.read_dir(&missing).await.unwrap().is_none());

        let root = resolver.resolve(&user, "").unwrap();
        storage
            .create_dir(&resolver.resolve(&user, "a").unwrap())
            .await
            .unwrap();
        std::fs::write(root.absolute().join("b.txt"), b"b").unwrap();

        let mut names: Vec<_> = storage
            .read_dir(&root)
            .await
            .unwrap()
            .unwrap()
            .into_iter()
            .map(|c| c.name)
            .collect();
        names.sort();
        assert_eq!(names, vec!["a", "b.txt"]);
    }

    #[tokio::test]
    async fn test_read_dir_on_file_is_validation_error() {
        let (_dir, storage, resolver, user) = setup().await;
        let file = resolver.resolve(&user, "f.txt").unwrap();
        std::fs::write(file.absolute(), b"x").unwrap();
        let err = storage.read_dir(&file).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
    }

    #[tokio::test]
    async fn test_remove_is_recursive() {
        let (_dir, storage, resolver, user) = setup().await;
        let top = resolver.resolve(&user, "top").unwrap();
        std::fs::create_dir_all(top.absolute().join("a/b")).unwrap();
        std::fs::write(top.absolute().join("a/b/c.txt"), b"c").unwrap();

        storage.remove(&top).await.unwrap();
        assert!(storage.metadata(&top).await.unwrap().is_none());

        let err = storage.remove(&top).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_create_new_is_exclusive() {
        let (_dir, storage, resolver, user) = setup().await;
        let target = resolver.resolve(&user, "x.bin").unwrap();
        assert!(storage.create_new(&target).await.unwrap().is_some());
        assert!(storage.create_new(&target).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_copy_from_staging_then_read() {
        let (dir, storage, resolver, user) = setup().await;
        let staging = dir.path().join("staged");
        std::fs::write(&staging, b"hello world").unwrap();

        let target = resolver.resolve(&user, "hello.txt").unwrap();
        let mut file = storage.create_new(&target).await.unwrap().unwrap();
        let written = storage.copy_from(&staging, &mut file).await.unwrap();
        drop(file);
        assert_eq!(written, 11);

        storage.remove_file_if_exists(&staging).await.unwrap();
        storage.remove_file_if_exists(&staging).await.unwrap();
        assert!(!staging.exists());

        let mut stream = storage.read(&target).await.unwrap();
        let mut body = Vec::new();
        while let Some(chunk) = stream.next().await {
            body.extend_from_slice(&chunk.unwrap());
        }
        assert_eq!(body, b"hello world");
    }
}
