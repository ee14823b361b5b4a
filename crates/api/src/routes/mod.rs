pub mod admin;
pub mod auth;
pub mod dashboard;
pub mod health;
pub mod scripts;
pub mod videos;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/signup                         signup (public)
/// /auth/login                          login (public)
/// /auth/logout                         logout (requires auth)
/// /auth/session                        current user (requires auth)
///
/// /videos                              list, upload
/// /videos/{id}                         get, delete
/// /videos/{id}/thumbnail               set thumbnail (PUT)
/// /videos/{id}/duration                record duration (PUT)
/// /videos/{id}/scripts                 list, create from video
///
/// /scripts                             list (?view=), create
/// /scripts/{id}                        get, update, delete
/// /scripts/{id}/favorite               toggle favorite (PUT)
/// /scripts/{id}/clone                  clone (POST)
/// /scripts/{id}/executions             record execution (POST)
///
/// /admin/videos                        all videos (admin only)
///
/// /dashboard/summary                   totals for the caller
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/videos", videos::router())
        .nest("/scripts", scripts::router())
        .nest("/admin", admin::router())
        .nest("/dashboard", dashboard::router())
}
