//! Route definitions for `/admin` (admin role required by each handler).

use axum::routing::get;
use axum::Router;

use crate::handlers::admin;
use crate::state::AppState;

/// ```text
/// GET /videos  -> list_all_videos
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/videos", get(admin::list_all_videos))
}
