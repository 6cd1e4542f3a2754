//! Listing and in-place mutations of a user's tree.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info};

use userdrive_core::config::StorageConfig;
use userdrive_core::error::AppError;
use userdrive_core::types::{Breadcrumb, Entry, UserId};
use userdrive_storage::{LocalStorage, PathResolver, ResolvedPath};

use crate::context::RequestContext;

use super::breadcrumb::breadcrumbs;
use super::entry::entry_from_metadata;
use super::naming;

/// Contents of one folder.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Listing {
    /// Direct children, folders first, then by path.
    pub items: Vec<Entry>,
    /// Number of items.
    pub total: usize,
    /// Normalized path of the listed folder.
    pub parent_path: String,
    /// Trail from the root to the listed folder.
    pub breadcrumbs: Vec<Breadcrumb>,
    /// Always 0; quotas are not tracked.
    pub used_quota: u64,
    /// Always 0, meaning unlimited.
    pub quota: u64,
}

/// Result of a rename.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Renamed {
    /// Final name, including any preserved extension.
    pub new_name: String,
    /// New relative path.
    pub new_path: String,
}

/// Result of a move.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Moved {
    /// New relative path.
    pub new_path: String,
}

/// List, create-folder, rename, move and delete within a user's tree.
#[derive(Debug, Clone)]
pub struct TreeService {
    /// Filesystem adapter.
    storage: Arc<LocalStorage>,
    /// Containment checks for every caller path.
    resolver: PathResolver,
    /// Prefix for public file locators.
    public_base_url: String,
}

impl TreeService {
    /// Creates a new tree service.
    pub fn new(storage: Arc<LocalStorage>, config: &StorageConfig) -> Self {
        Self {
            resolver: storage.resolver(),
            storage,
            public_base_url: config.public_base_url.clone(),
        }
    }

    /// Lists the direct children of `parent_path`. A folder that does not
    /// exist yields an empty listing.
    pub async fn list(
        &self,
        ctx: &RequestContext,
        owner: &UserId,
        parent_path: &str,
    ) -> Result<Listing, AppError> {
        ctx.authorize(owner)?;
        let parent = self.resolver.resolve(owner, parent_path)?;

        let children = self.storage.read_dir(&parent).await?.unwrap_or_default();
        let mut items = Vec::with_capacity(children.len());
        for child in children {
            let Ok(path) = self.resolver.child(&parent, &child.name) else {
                continue;
            };
            // Names that do not survive resolution intact are not addressable.
            if path.name() != child.name {
                debug!(name = %child.name.escape_debug(), "Skipping unaddressable entry");
                continue;
            }
            if let Some(entry) = entry_from_metadata(&path, &child.metadata, &self.public_base_url)
            {
                items.push(entry);
            }
        }

        items.sort_by(|a, b| {
            b.is_folder()
                .cmp(&a.is_folder())
                .then_with(|| a.path.cmp(&b.path))
        });

        Ok(Listing {
            total: items.len(),
            items,
            parent_path: parent.relative().to_string(),
            breadcrumbs: breadcrumbs(parent.relative()),
            used_quota: 0,
            quota: 0,
        })
    }

    /// Creates a single folder named `name` inside `parent_path`.
    pub async fn create_folder(
        &self,
        ctx: &RequestContext,
        owner: &UserId,
        parent_path: &str,
        name: &str,
    ) -> Result<Entry, AppError> {
        ctx.authorize(owner)?;
        let name = name.trim();
        if name.is_empty() {
            return Err(AppError::validation("Folder name is required"));
        }

        let parent = self.resolver.resolve(owner, parent_path)?;
        let target = self.resolver.child(&parent, name)?;
        naming::validate_segment(name)?;

        if parent.is_root() {
            self.storage.create_dir_all(&parent).await?;
        } else {
            match self.storage.metadata(&parent).await? {
                None => return Err(AppError::not_found("Parent folder not found")),
                Some(meta) if !meta.is_dir() => {
                    return Err(AppError::validation("Parent path is not a folder"));
                }
                Some(_) => {}
            }
        }

        self.storage.create_dir(&target).await?;
        info!(
            user_id = %owner,
            actor = %ctx.user_id,
            path = %target.relative(),
            "Created folder"
        );

        self.describe(&target)
            .await?
            .ok_or_else(|| AppError::internal("Created folder vanished"))
    }

    /// Renames the entry at `path` to `new_name` within its folder.
    pub async fn rename(
        &self,
        ctx: &RequestContext,
        owner: &UserId,
        path: &str,
        new_name: &str,
    ) -> Result<Renamed, AppError> {
        ctx.authorize(owner)?;
        let new_name = new_name.trim();
        if new_name.is_empty() {
            return Err(AppError::validation("New name is required"));
        }

        let source = self.resolver.resolve(owner, path)?;
        if source.is_root() {
            return Err(AppError::invalid_path("Cannot rename the root folder"));
        }

        let meta = self
            .storage
            .metadata(&source)
            .await?
            .ok_or_else(|| AppError::not_found("File or folder not found"))?;

        let final_name = if meta.is_dir() {
            new_name.to_string()
        } else {
            naming::renamed_file_name(source.name(), new_name)?
        };

        let parent = self
            .resolver
            .resolve(owner, source.parent_relative().unwrap_or_default())?;
        let dest = self.resolver.child(&parent, &final_name)?;
        naming::validate_segment(&final_name)?;

        if dest == source {
            return Ok(Renamed {
                new_name: final_name,
                new_path: dest.relative().to_string(),
            });
        }
        if self.storage.metadata(&dest).await?.is_some() {
            return Err(AppError::conflict(
                "A file or folder with that name already exists",
            ));
        }

        self.storage.rename(&source, &dest).await?;
        info!(
            user_id = %owner,
            actor = %ctx.user_id,
            from = %source.relative(),
            to = %dest.relative(),
            "Renamed entry"
        );

        Ok(Renamed {
            new_name: final_name,
            new_path: dest.relative().to_string(),
        })
    }

    /// Moves the entry at `source_path` into the folder `target_path`,
    /// keeping its name.
    pub async fn move_entry(
        &self,
        ctx: &RequestContext,
        owner: &UserId,
        source_path: &str,
        target_path: &str,
    ) -> Result<Moved, AppError> {
        ctx.authorize(owner)?;
        let source = self.resolver.resolve(owner, source_path)?;
        if source.is_root() {
            return Err(AppError::invalid_operation("Cannot move the root folder"));
        }

        let target = self.resolver.resolve(owner, target_path)?;
        let dest = self.resolver.child(&target, source.name())?;
        if source.contains(&dest) {
            return Err(AppError::invalid_operation(
                "Cannot move an item into itself or one of its descendants",
            ));
        }

        if self.storage.metadata(&source).await?.is_none() {
            return Err(AppError::not_found("Source item not found"));
        }
        if !target.is_root() {
            match self.storage.metadata(&target).await? {
                None => return Err(AppError::not_found("Target folder not found")),
                Some(meta) if !meta.is_dir() => {
                    return Err(AppError::invalid_operation("Target is not a folder"));
                }
                Some(_) => {}
            }
        }
        if self.storage.metadata(&dest).await?.is_some() {
            return Err(AppError::conflict(
                "An item with the same name already exists in the target folder",
            ));
        }

        self.storage.rename(&source, &dest).await?;
        info!(
            user_id = %owner,
            actor = %ctx.user_id,
            from = %source.relative(),
            to = %dest.relative(),
            "Moved entry"
        );

        Ok(Moved {
            new_path: dest.relative().to_string(),
        })
    }

    /// Deletes the entry at `path`, recursively for folders.
    pub async fn delete(
        &self,
        ctx: &RequestContext,
        owner: &UserId,
        path: &str,
    ) -> Result<(), AppError> {
        ctx.authorize(owner)?;
        let target = self.resolver.resolve(owner, path)?;
        if target.is_root() {
            return Err(AppError::invalid_operation("Cannot delete the root folder"));
        }

        self.storage.remove(&target).await?;
        info!(
            user_id = %owner,
            actor = %ctx.user_id,
            path = %target.relative(),
            "Deleted entry"
        );
        Ok(())
    }

    async fn describe(&self, path: &ResolvedPath) -> Result<Option<Entry>, AppError> {
        Ok(self
            .storage
            .metadata(path)
            .await?
            .and_then(|meta| entry_from_metadata(path, &meta, &self.public_base_url)))
    }
}
