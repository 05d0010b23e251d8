//! Image upload.

use axum::Json;
use axum::extract::{Multipart, State};
use bytes::Bytes;

use fleetdesk_core::error::AppError;
use fleetdesk_storage::UploadedMedia;

use crate::dto::response::ApiResponse;
use crate::error::ApiResult;
use crate::extractors::AuthUser;
use crate::state::AppState;

/// POST /media
///
/// Multipart form with a `file` part and an optional `folder` text part.
pub async fn upload(
    State(state): State<AppState>,
    auth: AuthUser,
    mut multipart: Multipart,
) -> ApiResult<Json<ApiResponse<UploadedMedia>>> {
    let mut folder: Option<String> = None;
    let mut file: Option<(Bytes, String)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::validation(format!("Multipart error: {e}")))?
    {
        match field.name().unwrap_or_default() {
            "folder" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::validation(format!("Read error: {e}")))?;
                folder = Some(text);
            }
            "file" => {
                let content_type = field
                    .content_type()
                    .map(str::to_string)
                    .ok_or_else(|| AppError::invalid_field("file", "Missing content type"))?;
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::validation(format!("Read error: {e}")))?;
                file = Some((data, content_type));
            }
            _ => {}
        }
    }

    let (data, content_type) =
        file.ok_or_else(|| AppError::invalid_field("file", "No file was uploaded"))?;
    let media = state
        .services
        .media
        .upload(&auth, folder.as_deref(), data, &content_type)
        .await?;
    Ok(Json(ApiResponse::ok(media)))
}
