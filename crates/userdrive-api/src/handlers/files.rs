//! File tree handlers: list, create-folder, rename, move, delete, upload.

use std::path::{Path, PathBuf};

use axum::Json;
use axum::extract::multipart::{Field, MultipartError};
use axum::extract::{Multipart, Query, State};
use axum::http::StatusCode;
use tokio::io::AsyncWriteExt;
use tracing::warn;
use uuid::Uuid;

use userdrive_core::error::AppError;
use userdrive_service::tree::PendingUpload;

use crate::dto::request::{
    CreateFolderRequest, DeleteQuery, ListQuery, MoveRequest, RenameRequest, validated,
};
use crate::dto::response::{ApiResponse, DeletedResponse};
use crate::error::ApiError;
use crate::extractors::AuthUser;
use crate::state::AppState;

/// GET /api/files/list?userId=...&parentPath=...
pub async fn list(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<ListQuery>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let owner = auth.owner(query.user_id.as_deref())?;
    let listing = state
        .tree_service
        .list(&auth, &owner, &query.parent_path)
        .await?;
    Ok(Json(serde_json::json!({ "success": true, "data": listing })))
}

/// POST /api/files/create-folder
pub async fn create_folder(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<CreateFolderRequest>,
) -> Result<(StatusCode, Json<serde_json::Value>), ApiError> {
    let req = validated(req)?;
    let owner = auth.owner(req.user_id.as_deref())?;
    let entry = state
        .tree_service
        .create_folder(
            &auth,
            &owner,
            req.parent_path.as_deref().unwrap_or_default(),
            &req.name,
        )
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({ "success": true, "data": entry })),
    ))
}

/// POST /api/files/rename
pub async fn rename(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<RenameRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let req = validated(req)?;
    let owner = auth.owner(req.user_id.as_deref())?;
    let renamed = state
        .tree_service
        .rename(&auth, &owner, &req.file_path, &req.new_name)
        .await?;
    Ok(Json(serde_json::json!({ "success": true, "data": renamed })))
}

/// POST /api/files/move
pub async fn move_entry(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<MoveRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let req = validated(req)?;
    let owner = auth.owner(req.user_id.as_deref())?;
    let moved = state
        .tree_service
        .move_entry(&auth, &owner, &req.source_path, &req.target_path)
        .await?;
    Ok(Json(serde_json::json!({ "success": true, "data": moved })))
}

/// DELETE /api/files/delete?userId=...&filePath=...
pub async fn delete(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<DeleteQuery>,
) -> Result<Json<ApiResponse<DeletedResponse>>, ApiError> {
    let owner = auth.owner(query.user_id.as_deref())?;
    state
        .tree_service
        .delete(&auth, &owner, &query.file_path)
        .await?;
    Ok(Json(ApiResponse::ok(DeletedResponse {
        path: query.file_path,
    })))
}

/// Fields collected from an upload form.
#[derive(Debug, Default)]
struct UploadForm {
    user_id: Option<String>,
    parent_path: String,
    staged: Option<StagedFile>,
}

/// The `file` field, already written to the staging directory.
#[derive(Debug)]
struct StagedFile {
    path: PathBuf,
    file_name: String,
    size: u64,
}

/// POST /api/files/upload (multipart: `parentId`/`parentPath`, `userId`, `file`)
pub async fn upload(
    State(state): State<AppState>,
    auth: AuthUser,
    mut multipart: Multipart,
) -> Result<Json<serde_json::Value>, ApiError> {
    let mut form = UploadForm::default();
    if let Err(e) = read_upload_form(&state, &mut multipart, &mut form).await {
        if let Some(staged) = form.staged {
            discard_staged(&staged.path).await;
        }
        return Err(e.into());
    }

    let staged = form
        .staged
        .ok_or_else(|| AppError::validation("No file uploaded"))?;
    let owner = match auth.owner(form.user_id.as_deref()) {
        Ok(owner) => owner,
        Err(e) => {
            discard_staged(&staged.path).await;
            return Err(e.into());
        }
    };

    let stored = state
        .upload_service
        .ingest(
            &auth,
            &owner,
            PendingUpload {
                staged_path: staged.path,
                file_name: staged.file_name,
                size: staged.size,
                parent_path: form.parent_path,
            },
        )
        .await?;

    Ok(Json(serde_json::json!({ "success": true, "data": stored })))
}

async fn read_upload_form(
    state: &AppState,
    multipart: &mut Multipart,
    form: &mut UploadForm,
) -> Result<(), AppError> {
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "parentId" | "parentPath" => {
                form.parent_path = field.text().await.map_err(multipart_error)?;
            }
            "userId" => {
                form.user_id = Some(field.text().await.map_err(multipart_error)?);
            }
            "file" if form.staged.is_none() => {
                let file_name = field
                    .file_name()
                    .filter(|n| !n.trim().is_empty())
                    .map(String::from)
                    .ok_or_else(|| AppError::validation("Uploaded file is missing a name"))?;
                let staging_dir = Path::new(&state.config.storage.temp_dir);
                let limit = state.upload_service.max_upload_size();
                let (path, size) = stage_field(field, staging_dir, limit).await?;
                form.staged = Some(StagedFile {
                    path,
                    file_name,
                    size,
                });
            }
            _ => {}
        }
    }
    Ok(())
}

/// Streams a multipart field into a fresh staging file, stopping as soon as
/// more than `limit` bytes have arrived.
async fn stage_field(
    mut field: Field<'_>,
    staging_dir: &Path,
    limit: u64,
) -> Result<(PathBuf, u64), AppError> {
    let path = staging_dir.join(Uuid::new_v4().to_string());
    let mut file = tokio::fs::File::create(&path).await?;

    let written = async {
        let mut size = 0u64;
        while let Some(chunk) = field.chunk().await.map_err(multipart_error)? {
            size += chunk.len() as u64;
            if size > limit {
                return Err(AppError::payload_too_large(format!(
                    "File size exceeds the per-upload limit of {limit} bytes"
                )));
            }
            file.write_all(&chunk).await?;
        }
        file.flush().await?;
        Ok::<u64, AppError>(size)
    }
    .await;
    drop(file);

    match written {
        Ok(size) => Ok((path, size)),
        Err(e) => {
            discard_staged(&path).await;
            Err(e)
        }
    }
}

fn multipart_error(err: MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::payload_too_large("Upload exceeds the request size limit")
    } else {
        AppError::validation(format!("Invalid multipart body: {}", err.body_text()))
    }
}

async fn discard_staged(path: &Path) {
    match tokio::fs::remove_file(path).await {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => warn!(path = %path.display(), error = %e, "Failed to remove staging file"),
    }
}
