//! Request DTOs with validation.

use serde::{Deserialize, Serialize};
use validator::Validate;

use userdrive_core::error::AppError;

/// Run a DTO's declared validation rules.
pub fn validated<T: Validate>(req: T) -> Result<T, AppError> {
    req.validate()
        .map_err(|e| AppError::validation(e.to_string()))?;
    Ok(req)
}

/// Query for `GET /api/files/list`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    /// Tree to list (defaults to the caller's own).
    pub user_id: Option<String>,
    /// Folder to list (defaults to the root).
    #[serde(default)]
    pub parent_path: String,
}

/// Body of `POST /api/files/create-folder`.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateFolderRequest {
    /// Tree to modify (defaults to the caller's own).
    pub user_id: Option<String>,
    /// Folder to create the new folder in.
    #[serde(default, alias = "parentId")]
    pub parent_path: Option<String>,
    /// Name of the new folder.
    #[validate(length(min = 1, message = "Folder name is required"))]
    pub name: String,
}

/// Body of `POST /api/files/rename`.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RenameRequest {
    /// Tree to modify (defaults to the caller's own).
    pub user_id: Option<String>,
    /// Entry to rename.
    #[validate(length(min = 1, message = "filePath is required"))]
    pub file_path: String,
    /// New name for the entry.
    #[validate(length(min = 1, message = "newName is required"))]
    pub new_name: String,
}

/// Body of `POST /api/files/move`.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct MoveRequest {
    /// Tree to modify (defaults to the caller's own).
    pub user_id: Option<String>,
    /// Entry to move.
    #[validate(length(min = 1, message = "sourcePath is required"))]
    pub source_path: String,
    /// Destination folder (empty for the root).
    #[serde(default)]
    pub target_path: String,
}

/// Query for `DELETE /api/files/delete`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteQuery {
    /// Tree to modify (defaults to the caller's own).
    pub user_id: Option<String>,
    /// Entry to delete. Absent or empty names the root, which is refused.
    #[serde(default)]
    pub file_path: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use userdrive_core::error::ErrorKind;

    #[test]
    fn test_create_folder_accepts_parent_id_alias() {
        let req: CreateFolderRequest =
            serde_json::from_str(r#"{"parentId": "docs", "name": "new"}"#).unwrap();
        assert_eq!(req.parent_path.as_deref(), Some("docs"));
        assert!(req.user_id.is_none());
    }

    #[test]
    fn test_empty_fields_fail_validation() {
        let req: RenameRequest =
            serde_json::from_str(r#"{"filePath": "a.txt", "newName": ""}"#).unwrap();
        let err = validated(req).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
        assert!(err.message.contains("newName is required"));
    }
}
