//! Repository for the `videos` table.

use innovate_core::types::DbId;
use innovate_core::video::VideoStatus;
use sqlx::PgPool;

use crate::models::video::{CreateVideo, Video, VideoEnrichment};

const COLUMNS: &str = "id, user_id, title, description, file_name, file_path, storage_url, \
                       file_size, mime_type, duration, thumbnail_url, status, metadata, \
                       created_at, updated_at";

/// Provides CRUD operations for videos.
pub struct VideoRepo;

impl VideoRepo {
    /// Insert a video row. `status` takes the column default (`pending`).
    pub async fn create(pool: &PgPool, input: &CreateVideo) -> Result<Video, sqlx::Error> {
        let query = format!(
            "INSERT INTO videos
                (id, user_id, title, description, file_name, file_path, storage_url,
                 file_size, mime_type)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Video>(&query)
            .bind(input.id)
            .bind(input.user_id)
            .bind(&input.title)
            .bind(&input.description)
            .bind(&input.file_name)
            .bind(&input.file_path)
            .bind(&input.storage_url)
            .bind(input.file_size)
            .bind(&input.mime_type)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Video>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM videos WHERE id = $1");
        sqlx::query_as::<_, Video>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// All videos owned by `user_id`, newest first.
    pub async fn list_by_user(pool: &PgPool, user_id: DbId) -> Result<Vec<Video>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM videos
             WHERE user_id = $1
             ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, Video>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    /// Every video in the system, newest first. Unpaginated.
    pub async fn list_all(pool: &PgPool) -> Result<Vec<Video>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM videos ORDER BY created_at DESC, id DESC");
        sqlx::query_as::<_, Video>(&query).fetch_all(pool).await
    }

    /// Set the thumbnail URL. Returns `None` if the video does not exist.
    pub async fn set_thumbnail_url(
        pool: &PgPool,
        id: DbId,
        thumbnail_url: &str,
    ) -> Result<Option<Video>, sqlx::Error> {
        let query = format!(
            "UPDATE videos SET thumbnail_url = $2
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Video>(&query)
            .bind(id)
            .bind(thumbnail_url)
            .fetch_optional(pool)
            .await
    }

    /// Record the duration and mark the video `completed`.
    pub async fn record_duration(
        pool: &PgPool,
        id: DbId,
        duration: f64,
    ) -> Result<Option<Video>, sqlx::Error> {
        let query = format!(
            "UPDATE videos SET duration = $2, status = $3
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Video>(&query)
            .bind(id)
            .bind(duration)
            .bind(VideoStatus::Completed.as_str())
            .fetch_optional(pool)
            .await
    }

    /// Apply whatever enrichment succeeded. Status becomes `completed` only
    /// when a duration is supplied; otherwise it is left as it was.
    pub async fn apply_enrichment(
        pool: &PgPool,
        id: DbId,
        input: &VideoEnrichment,
    ) -> Result<Option<Video>, sqlx::Error> {
        let query = format!(
            "UPDATE videos SET
                duration = COALESCE($2, duration),
                thumbnail_url = COALESCE($3, thumbnail_url),
                status = CASE WHEN $2 IS NULL THEN status ELSE $4 END
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Video>(&query)
            .bind(id)
            .bind(input.duration)
            .bind(&input.thumbnail_url)
            .bind(VideoStatus::Completed.as_str())
            .fetch_optional(pool)
            .await
    }

    /// Delete a video, returning the removed row so its objects can be
    /// cleaned up. Linked scripts keep existing with `video_id = NULL`.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<Option<Video>, sqlx::Error> {
        let query = format!("DELETE FROM videos WHERE id = $1 RETURNING {COLUMNS}");
        sqlx::query_as::<_, Video>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }
}
