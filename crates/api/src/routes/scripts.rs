//! Route definitions for the `/scripts` resource.

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::scripts;
use crate::state::AppState;

/// Routes mounted at `/scripts`.
///
/// ```text
/// GET    /                  -> list_scripts (?view=)
/// POST   /                  -> create_script
/// GET    /{id}              -> get_script
/// PUT    /{id}              -> update_script
/// DELETE /{id}              -> delete_script
/// PUT    /{id}/favorite     -> toggle_favorite
/// POST   /{id}/clone        -> clone_script
/// POST   /{id}/executions   -> record_execution
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(scripts::list_scripts).post(scripts::create_script))
        .route(
            "/{id}",
            get(scripts::get_script)
                .put(scripts::update_script)
                .delete(scripts::delete_script),
        )
        .route("/{id}/favorite", put(scripts::toggle_favorite))
        .route("/{id}/clone", post(scripts::clone_script))
        .route("/{id}/executions", post(scripts::record_execution))
}
