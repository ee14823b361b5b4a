//! Read-only aggregates for the dashboard.

use innovate_core::types::DbId;
use sqlx::PgPool;

use crate::models::dashboard::DashboardStats;

pub struct DashboardRepo;

impl DashboardRepo {
    /// Totals across one user's videos and scripts in a single round trip.
    pub async fn stats_for_user(pool: &PgPool, user_id: DbId) -> Result<DashboardStats, sqlx::Error> {
        sqlx::query_as::<_, DashboardStats>(
            "SELECT
                v.video_count, v.total_bytes, v.total_duration,
                s.script_count, s.favorite_count, s.total_executions
             FROM
                (SELECT COUNT(*) AS video_count,
                        COALESCE(SUM(file_size), 0)::BIGINT AS total_bytes,
                        COALESCE(SUM(duration), 0)::DOUBLE PRECISION AS total_duration
                 FROM videos WHERE user_id = $1) v,
                (SELECT COUNT(*) AS script_count,
                        COUNT(*) FILTER (WHERE is_favorite) AS favorite_count,
                        COALESCE(SUM(execution_count), 0)::BIGINT AS total_executions
                 FROM scripts WHERE user_id = $1) s",
        )
        .bind(user_id)
        .fetch_one(pool)
        .await
    }
}
