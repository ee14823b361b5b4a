//! Route definitions for the `/videos` resource.

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, put};
use axum::Router;

use crate::handlers::videos;
use crate::state::AppState;

/// Routes mounted at `/videos`.
///
/// ```text
/// GET    /                 -> list_videos
/// POST   /                 -> upload_video (multipart)
/// GET    /{id}             -> get_video
/// DELETE /{id}             -> delete_video
/// PUT    /{id}/thumbnail   -> update_thumbnail
/// PUT    /{id}/duration    -> record_duration
/// GET    /{id}/scripts     -> list_video_scripts
/// POST   /{id}/scripts     -> create_video_script
/// ```
///
/// The upload handler enforces its own size cap, so axum's default body
/// limit is lifted on `/`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(videos::list_videos)
                .post(videos::upload_video)
                .layer(DefaultBodyLimit::disable()),
        )
        .route("/{id}", get(videos::get_video).delete(videos::delete_video))
        .route("/{id}/thumbnail", put(videos::update_thumbnail))
        .route("/{id}/duration", put(videos::record_duration))
        .route(
            "/{id}/scripts",
            get(videos::list_video_scripts).post(videos::create_video_script),
        )
}
