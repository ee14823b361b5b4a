//! Handler for the dashboard summary cards.

use axum::extract::State;
use axum::Json;
use innovate_core::format::{format_duration, format_file_size};
use innovate_db::models::dashboard::DashboardStats;
use innovate_db::repositories::DashboardRepo;
use serde::Serialize;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// Raw totals plus their display strings.
#[derive(Debug, Serialize)]
pub struct DashboardSummary {
    #[serde(flatten)]
    pub stats: DashboardStats,
    /// e.g. `1.5 GB`.
    pub total_size_display: String,
    /// `MM:SS`, or `HH:MM:SS` past an hour.
    pub total_duration_display: String,
}

/// GET /api/v1/dashboard/summary
pub async fn summary(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<Json<DataResponse<DashboardSummary>>> {
    let stats = DashboardRepo::stats_for_user(&state.pool, auth.user_id).await?;
    let summary = DashboardSummary {
        total_size_display: format_file_size(stats.total_bytes.max(0) as u64),
        total_duration_display: format_duration(stats.total_duration),
        stats,
    };
    Ok(Json(DataResponse { data: summary }))
}
