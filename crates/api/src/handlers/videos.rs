//! Handlers for the `/videos` resource.
//!
//! Every handler is scoped to the authenticated caller. A video owned by
//! someone else answers 404, the same as a missing one.

use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::Json;
use innovate_core::error::CoreError;
use innovate_core::format::format_file_size;
use innovate_core::types::DbId;
use innovate_db::models::script::{CreateScriptFromVideo, Script};
use innovate_db::models::video::{RecordDuration, UpdateThumbnail, Video};

use crate::error::{AppError, AppResult};
use crate::lifecycle::Upload;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// MIME type assumed when the file part carries none. Fails validation.
const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

/// GET /api/v1/videos
///
/// The caller's videos, newest first.
pub async fn list_videos(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<Json<DataResponse<Vec<Video>>>> {
    let videos = state.videos.get_user_videos(auth.user_id).await?;
    Ok(Json(DataResponse { data: videos }))
}

/// POST /api/v1/videos
///
/// Multipart upload. Parts: `file` (required), `title`, `description`, and
/// `size` (the byte count the client expects to send).
pub async fn upload_video(
    State(state): State<AppState>,
    auth: AuthUser,
    mut multipart: Multipart,
) -> AppResult<(StatusCode, Json<DataResponse<Video>>)> {
    let max_bytes = state.videos.max_upload_bytes();

    let mut file: Option<(String, String, Vec<u8>)> = None;
    let mut title = None;
    let mut description = None;
    let mut declared_size = None;

    while let Some(mut field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                let file_name = field.file_name().unwrap_or("video").to_string();
                let mime_type = field
                    .content_type()
                    .unwrap_or(FALLBACK_CONTENT_TYPE)
                    .to_string();

                // Read chunk by chunk so an oversized body is refused early.
                let mut bytes = Vec::new();
                while let Some(chunk) = field
                    .chunk()
                    .await
                    .map_err(|e| AppError::BadRequest(e.to_string()))?
                {
                    if (bytes.len() + chunk.len()) as u64 > max_bytes {
                        return Err(AppError::Core(CoreError::Validation(format!(
                            "Video file size should be less than {}",
                            format_file_size(max_bytes)
                        ))));
                    }
                    bytes.extend_from_slice(&chunk);
                }
                file = Some((file_name, mime_type, bytes));
            }
            "title" => title = Some(read_text(field).await?),
            "description" => description = Some(read_text(field).await?),
            "size" => {
                let raw = read_text(field).await?;
                let size = raw.trim().parse::<u64>().map_err(|_| {
                    AppError::Core(CoreError::Validation(format!(
                        "Invalid size value: {raw}"
                    )))
                })?;
                declared_size = Some(size);
            }
            other => tracing::debug!(field = other, "Ignoring unknown multipart field"),
        }
    }

    let (file_name, mime_type, bytes) = file.ok_or_else(|| {
        AppError::Core(CoreError::Validation("Please select a video file".into()))
    })?;

    let uploaded = state
        .videos
        .upload_video(
            auth.user_id,
            Upload {
                file_name,
                mime_type,
                declared_size,
                bytes,
                title,
                description,
            },
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: uploaded.video,
        }),
    ))
}

/// GET /api/v1/videos/{id}
pub async fn get_video(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Video>>> {
    let video = state.videos.owned_video(id, auth.user_id).await?;
    Ok(Json(DataResponse { data: video }))
}

/// DELETE /api/v1/videos/{id}
///
/// Removes the row, then its stored objects. Linked scripts stay, unlinked.
pub async fn delete_video(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    state.videos.owned_video(id, auth.user_id).await?;
    if state.videos.delete_video(id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::Core(CoreError::NotFound { entity: "Video", id }))
    }
}

/// PUT /api/v1/videos/{id}/thumbnail
///
/// Body: `{ "data_url": "data:image/jpeg;base64,..." }`.
pub async fn update_thumbnail(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateThumbnail>,
) -> AppResult<Json<DataResponse<Video>>> {
    state.videos.owned_video(id, auth.user_id).await?;
    let video = state
        .videos
        .update_video_thumbnail(id, &input.data_url)
        .await?;
    Ok(Json(DataResponse { data: video }))
}

/// PUT /api/v1/videos/{id}/duration
///
/// Body: `{ "duration": 12.5 }`. Marks the video completed.
pub async fn record_duration(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
    Json(input): Json<RecordDuration>,
) -> AppResult<Json<DataResponse<Video>>> {
    state.videos.owned_video(id, auth.user_id).await?;
    let video = state
        .videos
        .record_video_duration(id, input.duration)
        .await?;
    Ok(Json(DataResponse { data: video }))
}

/// GET /api/v1/videos/{id}/scripts
pub async fn list_video_scripts(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<Script>>>> {
    let scripts = state.scripts.get_video_scripts(id, auth.user_id).await?;
    Ok(Json(DataResponse { data: scripts }))
}

/// POST /api/v1/videos/{id}/scripts
///
/// Create a completed script attached to this video.
pub async fn create_video_script(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
    Json(input): Json<CreateScriptFromVideo>,
) -> AppResult<(StatusCode, Json<DataResponse<Script>>)> {
    let script = state
        .scripts
        .create_script_from_video(id, auth.user_id, input)
        .await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: script })))
}

async fn read_text(field: axum::extract::multipart::Field<'_>) -> AppResult<String> {
    field
        .text()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))
}
