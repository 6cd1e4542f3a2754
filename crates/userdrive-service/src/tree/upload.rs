//! Upload ingest: moves a staged transport file into a user's tree under
//! a collision-free name.

use std::path::PathBuf;
use std::sync::Arc;

use serde::Serialize;
use tracing::{error, info, warn};

use userdrive_core::config::StorageConfig;
use userdrive_core::error::AppError;
use userdrive_core::types::{Entry, UserId};
use userdrive_storage::{LocalStorage, PathResolver, ResolvedPath};

use crate::context::RequestContext;

use super::entry::entry_from_metadata;
use super::naming;

/// A file the transport layer has finished staging.
#[derive(Debug, Clone)]
pub struct PendingUpload {
    /// Staging location written by the transport.
    pub staged_path: PathBuf,
    /// Original filename as declared by the client.
    pub file_name: String,
    /// Size in bytes.
    pub size: u64,
    /// Destination folder, relative to the user root.
    pub parent_path: String,
}

/// Where an upload ended up.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredUpload {
    /// Final (possibly disambiguated) filename.
    pub filename: String,
    /// Final relative path.
    pub path: String,
    /// Normalized destination folder.
    pub parent_path: String,
    /// The stored file.
    pub entry: Entry,
}

/// Ingests staged uploads.
#[derive(Debug, Clone)]
pub struct UploadService {
    /// Filesystem adapter.
    storage: Arc<LocalStorage>,
    /// Containment checks for every caller path.
    resolver: PathResolver,
    /// Per-upload size limit in bytes.
    max_upload_size: u64,
    /// Bound on the collision-avoidance loop.
    max_name_attempts: u32,
    /// Prefix for public file locators.
    public_base_url: String,
}

impl UploadService {
    /// Creates a new upload service.
    pub fn new(storage: Arc<LocalStorage>, config: &StorageConfig) -> Self {
        Self {
            resolver: storage.resolver(),
            storage,
            max_upload_size: config.max_upload_size_bytes,
            max_name_attempts: config.max_name_attempts,
            public_base_url: config.public_base_url.clone(),
        }
    }

    /// Maximum accepted upload size in bytes.
    pub fn max_upload_size(&self) -> u64 {
        self.max_upload_size
    }

    /// Stores `upload` in `owner`'s tree. The staging file is removed
    /// whether or not ingest succeeds.
    pub async fn ingest(
        &self,
        ctx: &RequestContext,
        owner: &UserId,
        upload: PendingUpload,
    ) -> Result<StoredUpload, AppError> {
        let result = match ctx.authorize(owner) {
            Ok(()) => self.store(owner, &upload).await,
            Err(e) => Err(e),
        };

        if let Err(e) = self
            .storage
            .remove_file_if_exists(&upload.staged_path)
            .await
        {
            warn!(
                staged = %upload.staged_path.display(),
                error = %e,
                "Failed to remove staging file"
            );
        }

        if let Ok(stored) = &result {
            info!(
                user_id = %owner,
                actor = %ctx.user_id,
                path = %stored.path,
                size = upload.size,
                "Stored upload"
            );
        }
        result
    }

    async fn store(
        &self,
        owner: &UserId,
        upload: &PendingUpload,
    ) -> Result<StoredUpload, AppError> {
        if upload.size > self.max_upload_size {
            return Err(AppError::payload_too_large(format!(
                "File size exceeds the per-upload limit of {} bytes",
                self.max_upload_size
            )));
        }
        naming::validate_segment(&upload.file_name)?;

        let parent = self.resolver.resolve(owner, &upload.parent_path)?;
        if let Some(meta) = self.storage.metadata(&parent).await? {
            if !meta.is_dir() {
                return Err(AppError::validation("Upload destination is not a folder"));
            }
        }
        self.storage.create_dir_all(&parent).await?;

        for attempt in 0..self.max_name_attempts {
            let candidate = naming::candidate_name(&upload.file_name, attempt);
            let dest = self.resolver.child(&parent, &candidate)?;
            let Some(mut file) = self.storage.create_new(&dest).await? else {
                continue;
            };

            let copied = self.storage.copy_from(&upload.staged_path, &mut file).await;
            drop(file);
            if let Err(e) = copied {
                self.discard_partial(&dest).await;
                return Err(e);
            }

            let entry = self
                .storage
                .metadata(&dest)
                .await?
                .and_then(|meta| entry_from_metadata(&dest, &meta, &self.public_base_url))
                .ok_or_else(|| AppError::internal("Stored upload vanished"))?;

            return Ok(StoredUpload {
                filename: candidate,
                path: dest.relative().to_string(),
                parent_path: parent.relative().to_string(),
                entry,
            });
        }

        Err(AppError::conflict(format!(
            "No free name for {} after {} attempts",
            upload.file_name, self.max_name_attempts
        )))
    }

    async fn discard_partial(&self, dest: &ResolvedPath) {
        error!(path = %dest.absolute().display(), "Upload copy failed");
        if let Err(e) = self.storage.remove_file_if_exists(dest.absolute()).await {
            warn!(
                path = %dest.absolute().display(),
                error = %e,
                "Failed to remove truncated upload"
            );
        }
    }
}
