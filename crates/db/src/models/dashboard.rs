//! Aggregates shown on the dashboard summary.

use serde::Serialize;
use sqlx::FromRow;

/// Per-user totals across videos and scripts.
#[derive(Debug, Clone, Default, FromRow, Serialize)]
pub struct DashboardStats {
    pub video_count: i64,
    pub total_bytes: i64,
    pub total_duration: f64,
    pub script_count: i64,
    pub favorite_count: i64,
    pub total_executions: i64,
}
