//! Repository for the `scripts` table.
//!
//! The create-from-video and clone operations run as single transactions so a
//! concurrent delete of the source row cannot produce a half-copied script.

use innovate_core::script::{clone_title, ScriptStatus, ScriptView, RECENT_VIEW_LIMIT};
use innovate_core::types::{new_id, DbId};
use sqlx::PgPool;

use crate::models::script::{CreateScript, CreateScriptFromVideo, Script, UpdateScript};

const COLUMNS: &str = "id, user_id, video_id, title, description, script, status, tags, \
                       is_favorite, execution_count, last_executed_at, created_at, updated_at";

/// Provides CRUD and lifecycle operations for scripts.
pub struct ScriptRepo;

impl ScriptRepo {
    /// Insert a new script, returning the created row. Status defaults to `draft`.
    pub async fn create(pool: &PgPool, input: &CreateScript) -> Result<Script, sqlx::Error> {
        let query = format!(
            "INSERT INTO scripts (id, user_id, video_id, title, description, script, status, tags)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Script>(&query)
            .bind(new_id())
            .bind(input.user_id)
            .bind(input.video_id)
            .bind(&input.title)
            .bind(&input.description)
            .bind(&input.script)
            .bind(input.status.unwrap_or(ScriptStatus::Draft).as_str())
            .bind(&input.tags)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Script>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM scripts WHERE id = $1");
        sqlx::query_as::<_, Script>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// A user's scripts filtered by a dashboard view.
    ///
    /// Every view is newest-created first except `recent`, which is the
    /// [`RECENT_VIEW_LIMIT`] most recently updated.
    pub async fn list_by_user(
        pool: &PgPool,
        user_id: DbId,
        view: ScriptView,
    ) -> Result<Vec<Script>, sqlx::Error> {
        let query = match view {
            ScriptView::All => format!(
                "SELECT {COLUMNS} FROM scripts
                 WHERE user_id = $1
                 ORDER BY created_at DESC, id DESC"
            ),
            ScriptView::Favorites => format!(
                "SELECT {COLUMNS} FROM scripts
                 WHERE user_id = $1 AND is_favorite = true
                 ORDER BY created_at DESC, id DESC"
            ),
            ScriptView::Recent => format!(
                "SELECT {COLUMNS} FROM scripts
                 WHERE user_id = $1
                 ORDER BY updated_at DESC, id DESC
                 LIMIT {RECENT_VIEW_LIMIT}"
            ),
            ScriptView::Completed | ScriptView::Draft => format!(
                "SELECT {COLUMNS} FROM scripts
                 WHERE user_id = $1 AND status = $2
                 ORDER BY created_at DESC, id DESC"
            ),
        };

        let mut q = sqlx::query_as::<_, Script>(&query).bind(user_id);
        if let Some(status) = view.status_filter() {
            q = q.bind(status.as_str());
        }
        q.fetch_all(pool).await
    }

    /// Scripts linked to a video, newest first.
    pub async fn list_by_video(pool: &PgPool, video_id: DbId) -> Result<Vec<Script>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM scripts
             WHERE video_id = $1
             ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, Script>(&query)
            .bind(video_id)
            .fetch_all(pool)
            .await
    }

    /// Update a script. Only non-`None` fields in `input` are applied;
    /// `description` and `video_id` can also be cleared.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateScript,
    ) -> Result<Option<Script>, sqlx::Error> {
        let query = format!(
            "UPDATE scripts SET
                title = COALESCE($2, title),
                description = CASE WHEN $3 THEN $4 ELSE description END,
                script = COALESCE($5, script),
                status = COALESCE($6, status),
                tags = COALESCE($7, tags),
                video_id = CASE WHEN $8 THEN $9 ELSE video_id END
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Script>(&query)
            .bind(id)
            .bind(&input.title)
            .bind(input.description.is_some())
            .bind(input.description.as_ref().and_then(|d| d.as_deref()))
            .bind(&input.script)
            .bind(input.status.map(ScriptStatus::as_str))
            .bind(&input.tags)
            .bind(input.video_id.is_some())
            .bind(input.video_id.flatten())
            .fetch_optional(pool)
            .await
    }

    /// Set the favorite flag. Returns `None` if the script does not exist.
    pub async fn set_favorite(
        pool: &PgPool,
        id: DbId,
        is_favorite: bool,
    ) -> Result<Option<Script>, sqlx::Error> {
        let query = format!(
            "UPDATE scripts SET is_favorite = $2
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Script>(&query)
            .bind(id)
            .bind(is_favorite)
            .fetch_optional(pool)
            .await
    }

    /// Atomically bump `execution_count` and stamp `last_executed_at`.
    ///
    /// Concurrent callers each observe a distinct count; none is lost.
    pub async fn increment_execution_count(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<Script>, sqlx::Error> {
        let query = format!(
            "UPDATE scripts SET
                execution_count = execution_count + 1,
                last_executed_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Script>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Delete a script. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM scripts WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Create a `completed` script linked to a video, owned by the video's
    /// owner. Returns the new script id, or `None` if the video is missing.
    pub async fn create_from_video(
        pool: &PgPool,
        video_id: DbId,
        input: &CreateScriptFromVideo,
    ) -> Result<Option<DbId>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let owner = sqlx::query_scalar::<_, DbId>(
            "SELECT user_id FROM videos WHERE id = $1 FOR UPDATE",
        )
        .bind(video_id)
        .fetch_optional(&mut *tx)
        .await?;
        let Some(user_id) = owner else {
            return Ok(None);
        };

        let id = new_id();
        sqlx::query(
            "INSERT INTO scripts (id, user_id, video_id, title, description, script, status, tags)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
        )
        .bind(id)
        .bind(user_id)
        .bind(video_id)
        .bind(&input.title)
        .bind(&input.description)
        .bind(&input.script)
        .bind(ScriptStatus::Completed.as_str())
        .bind(input.tags.clone().unwrap_or_default())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(Some(id))
    }

    /// Copy a script under a new id. The copy keeps owner, video link,
    /// description, body, status and tags; it starts unfavorited with a zero
    /// execution count. Returns `None` if the source is missing.
    pub async fn clone(
        pool: &PgPool,
        id: DbId,
        new_title: Option<&str>,
    ) -> Result<Option<DbId>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let original = sqlx::query_scalar::<_, String>(
            "SELECT title FROM scripts WHERE id = $1 FOR SHARE",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;
        let Some(original) = original else {
            return Ok(None);
        };

        let clone_id = new_id();
        sqlx::query(
            "INSERT INTO scripts (id, user_id, video_id, title, description, script, status, tags)
             SELECT $1, user_id, video_id, $3, description, script, status, tags
             FROM scripts WHERE id = $2",
        )
        .bind(clone_id)
        .bind(id)
        .bind(clone_title(&original, new_title))
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(Some(clone_id))
    }
}
