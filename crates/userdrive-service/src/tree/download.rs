//! Public read: streams a file out of a user's tree without credentials.

use std::sync::Arc;

use tracing::debug;

use userdrive_core::error::AppError;
use userdrive_core::types::UserId;
use userdrive_storage::{ByteStream, LocalStorage, PathResolver, mime};

/// A file opened for a public download.
pub struct PublicFile {
    /// File content.
    pub stream: ByteStream,
    /// MIME type for the Content-Type header.
    pub content_type: &'static str,
    /// Filename for Content-Disposition.
    pub file_name: String,
    /// Size in bytes.
    pub size: u64,
}

impl std::fmt::Debug for PublicFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PublicFile")
            .field("content_type", &self.content_type)
            .field("file_name", &self.file_name)
            .field("size", &self.size)
            .finish()
    }
}

/// Serves public file reads.
#[derive(Debug, Clone)]
pub struct DownloadService {
    /// Filesystem adapter.
    storage: Arc<LocalStorage>,
    /// Containment checks for every caller path.
    resolver: PathResolver,
}

impl DownloadService {
    /// Creates a new download service.
    pub fn new(storage: Arc<LocalStorage>) -> Self {
        Self {
            resolver: storage.resolver(),
            storage,
        }
    }

    /// Opens the file at `segments` inside `user_id`'s tree. Folders and
    /// anything that is not a regular file are reported as not found.
    pub async fn open_public<S: AsRef<str>>(
        &self,
        user_id: &str,
        segments: &[S],
    ) -> Result<PublicFile, AppError> {
        let owner = UserId::parse(user_id)?;
        let path = self.resolver.resolve_segments(&owner, segments)?;
        if path.is_root() {
            return Err(AppError::not_found("File not found"));
        }

        let meta = match self.storage.metadata(&path).await? {
            Some(meta) if meta.is_file() => meta,
            _ => return Err(AppError::not_found("File not found")),
        };

        let stream = self.storage.read(&path).await?;
        debug!(
            user_id = %owner,
            path = %path.relative(),
            size = meta.len(),
            "Serving public file"
        );

        Ok(PublicFile {
            stream,
            content_type: mime::mime_or_default(path.name()),
            file_name: path.name().to_string(),
            size: meta.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;
    use userdrive_core::error::ErrorKind;

    async fn setup() -> (tempfile::TempDir, DownloadService) {
        let dir = tempfile::tempdir().unwrap();
        let storage = Arc::new(LocalStorage::new(dir.path().join("users")).await.unwrap());
        let user_root = dir.path().join("users/alice");
        std::fs::create_dir_all(user_root.join("pics")).unwrap();
        std::fs::write(user_root.join("pics/cat.png"), b"meow").unwrap();
        (dir, DownloadService::new(storage))
    }

    #[tokio::test]
    async fn test_streams_file() {
        let (_dir, service) = setup().await;
        let mut file = service
            .open_public("alice", &["pics", "cat.png"])
            .await
            .unwrap();
        assert_eq!(file.content_type, "image/png");
        assert_eq!(file.file_name, "cat.png");
        assert_eq!(file.size, 4);

        let mut body = Vec::new();
        while let Some(chunk) = file.stream.next().await {
            body.extend_from_slice(&chunk.unwrap());
        }
        assert_eq!(body, b"meow");
    }

    #[tokio::test]
    async fn test_folders_and_missing_files_are_not_found() {
        let (_dir, service) = setup().await;
        for segments in [vec!["pics"], vec!["pics", "dog.png"], vec![]] {
            let err = service.open_public("alice", &segments).await.unwrap_err();
            assert_eq!(err.kind, ErrorKind::NotFound, "{segments:?}");
        }
    }

    #[tokio::test]
    async fn test_traversal_is_rejected() {
        let (_dir, service) = setup().await;
        let err = service
            .open_public("alice", &["..", "bob", "secret.txt"])
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidPath);

        let err = service
            .open_public("..", &["etc", "passwd"])
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidPath);
    }
}
