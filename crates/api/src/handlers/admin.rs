//! Admin-only handlers.

use axum::extract::State;
use axum::Json;
use innovate_db::models::video::Video;

use crate::error::AppResult;
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/admin/videos
///
/// Every user's videos, newest first. Unpaginated.
pub async fn list_all_videos(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
) -> AppResult<Json<DataResponse<Vec<Video>>>> {
    let videos = state.videos.get_all_videos().await?;
    tracing::debug!(admin_id = %admin.user_id, count = videos.len(), "Admin listed all videos");
    Ok(Json(DataResponse { data: videos }))
}
