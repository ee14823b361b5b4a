//! Handlers for the `/scripts` resource.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use innovate_core::error::CoreError;
use innovate_core::types::DbId;
use innovate_db::models::script::{
    CloneScript, CreateScriptRequest, Script, ToggleFavorite, UpdateScript,
};
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::query::ScriptListParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// Receipt for `POST /scripts/{id}/executions`.
#[derive(Debug, Serialize)]
pub struct ExecutionReceipt {
    pub script: Script,
    /// Always `false`: the server records executions but never runs scripts.
    pub executed: bool,
    pub message: &'static str,
}

/// GET /api/v1/scripts?view=all|favorites|recent|completed|draft
pub async fn list_scripts(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(params): Query<ScriptListParams>,
) -> AppResult<Json<DataResponse<Vec<Script>>>> {
    let scripts = state
        .scripts
        .get_user_scripts(auth.user_id, params.view()?)
        .await?;
    Ok(Json(DataResponse { data: scripts }))
}

/// POST /api/v1/scripts
pub async fn create_script(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(input): Json<CreateScriptRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<Script>>)> {
    let script = state.scripts.create_script(auth.user_id, input).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: script })))
}

/// GET /api/v1/scripts/{id}
pub async fn get_script(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Script>>> {
    let script = state.scripts.owned_script(id, auth.user_id).await?;
    Ok(Json(DataResponse { data: script }))
}

/// PUT /api/v1/scripts/{id}
///
/// Partial update; absent fields are left alone, `"video_id": null` unlinks.
pub async fn update_script(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateScript>,
) -> AppResult<Json<DataResponse<Script>>> {
    let script = state.scripts.update_script(id, auth.user_id, input).await?;
    Ok(Json(DataResponse { data: script }))
}

/// DELETE /api/v1/scripts/{id}
pub async fn delete_script(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if state.scripts.delete_script(id, auth.user_id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::Core(CoreError::NotFound { entity: "Script", id }))
    }
}

/// PUT /api/v1/scripts/{id}/favorite
pub async fn toggle_favorite(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
    Json(input): Json<ToggleFavorite>,
) -> AppResult<Json<DataResponse<Script>>> {
    let script = state
        .scripts
        .toggle_favorite(id, auth.user_id, input.is_favorite)
        .await?;
    Ok(Json(DataResponse { data: script }))
}

/// POST /api/v1/scripts/{id}/clone
///
/// Body is optional; `{ "title": "..." }` overrides the `"(Copy)"` title.
pub async fn clone_script(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
    input: Option<Json<CloneScript>>,
) -> AppResult<(StatusCode, Json<DataResponse<Script>>)> {
    let title = input.and_then(|Json(body)| body.title);
    let script = state
        .scripts
        .clone_script(id, auth.user_id, title.as_deref())
        .await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: script })))
}

/// POST /api/v1/scripts/{id}/executions
///
/// Records an execution. Nothing is run server side.
pub async fn record_execution(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<ExecutionReceipt>>> {
    let script = state
        .scripts
        .increment_execution_count(id, auth.user_id)
        .await?;
    Ok(Json(DataResponse {
        data: ExecutionReceipt {
            script,
            executed: false,
            message: "Execution recorded. Scripts run on the client, not on the server.",
        },
    }))
}
