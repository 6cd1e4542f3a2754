//! Unauthenticated file reads.

use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::{StatusCode, header};
use axum::response::Response;

use userdrive_core::error::AppError;

use crate::error::ApiError;
use crate::state::AppState;

/// Cache policy for public reads.
const PUBLIC_CACHE_CONTROL: &str = "public, max-age=31536000";

/// GET /api/files/public/{user_id}/{*path} and GET /raw/{user_id}/{*path}
pub async fn public_file(
    State(state): State<AppState>,
    Path((user_id, path)): Path<(String, String)>,
) -> Result<Response, ApiError> {
    let segments: Vec<&str> = path.split('/').collect();
    let file = state
        .download_service
        .open_public(&user_id, &segments)
        .await?;

    let response = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, file.content_type)
        .header(header::CONTENT_LENGTH, file.size)
        .header(
            header::CONTENT_DISPOSITION,
            inline_disposition(&file.file_name),
        )
        .header(header::CACHE_CONTROL, PUBLIC_CACHE_CONTROL)
        .body(Body::from_stream(file.stream))
        .map_err(|e| AppError::internal(format!("Response build failed: {e}")))?;

    Ok(response)
}

/// `inline` disposition with an ASCII fallback name and the exact UTF-8 name.
fn inline_disposition(file_name: &str) -> String {
    let fallback: String = file_name
        .chars()
        .map(|c| match c {
            '"' | '\\' => '_',
            c if c.is_ascii() && !c.is_ascii_control() => c,
            _ => '_',
        })
        .collect();
    format!(
        "inline; filename=\"{fallback}\"; filename*=UTF-8''{}",
        urlencoding::encode(file_name)
    )
}
