//! Script CRUD, list views, and the clone / from-video / execution-count
//! operations. Every operation is scoped to the calling user: another user's
//! script or video behaves exactly like a missing one.

use innovate_core::error::CoreError;
use innovate_core::script::{
    normalize_tags, validate_body, validate_tags, validate_title, ScriptView,
};
use innovate_core::types::DbId;
use innovate_db::models::script::{
    CreateScript, CreateScriptFromVideo, CreateScriptRequest, Script, UpdateScript,
};
use innovate_db::repositories::{ScriptRepo, VideoRepo};
use sqlx::PgPool;

use crate::error::{AppError, AppResult};

fn script_not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound { entity: "Script", id })
}

fn video_not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound { entity: "Video", id })
}

pub struct ScriptLifecycle {
    pool: PgPool,
}

impl ScriptLifecycle {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn get_user_scripts(&self, user_id: DbId, view: ScriptView) -> AppResult<Vec<Script>> {
        Ok(ScriptRepo::list_by_user(&self.pool, user_id, view).await?)
    }

    /// Scripts linked to one of the caller's videos.
    pub async fn get_video_scripts(&self, video_id: DbId, user_id: DbId) -> AppResult<Vec<Script>> {
        self.ensure_video_owned(video_id, user_id).await?;
        Ok(ScriptRepo::list_by_video(&self.pool, video_id).await?)
    }

    pub async fn get_script(&self, id: DbId, user_id: DbId) -> AppResult<Option<Script>> {
        Ok(ScriptRepo::find_by_id(&self.pool, id)
            .await?
            .filter(|s| s.user_id == user_id))
    }

    pub async fn create_script(&self, user_id: DbId, input: CreateScriptRequest) -> AppResult<Script> {
        validate_title(&input.title)?;
        validate_body(&input.script)?;
        validate_tags(&input.tags)?;
        if let Some(video_id) = input.video_id {
            self.ensure_video_owned(video_id, user_id).await?;
        }

        let script = ScriptRepo::create(
            &self.pool,
            &CreateScript {
                user_id,
                video_id: input.video_id,
                title: input.title.trim().to_string(),
                description: input.description,
                script: input.script,
                status: input.status,
                tags: normalize_tags(&input.tags),
            },
        )
        .await?;

        tracing::info!(script_id = %script.id, %user_id, "Script created");
        Ok(script)
    }

    /// Partial update. Concurrent updates are last-write-wins.
    pub async fn update_script(
        &self,
        id: DbId,
        user_id: DbId,
        mut patch: UpdateScript,
    ) -> AppResult<Script> {
        self.owned_script(id, user_id).await?;

        if let Some(title) = &patch.title {
            validate_title(title)?;
            patch.title = Some(title.trim().to_string());
        }
        if let Some(body) = &patch.script {
            validate_body(body)?;
        }
        if let Some(tags) = &patch.tags {
            validate_tags(tags)?;
            patch.tags = Some(normalize_tags(tags));
        }
        if let Some(Some(video_id)) = patch.video_id {
            self.ensure_video_owned(video_id, user_id).await?;
        }

        let script = ScriptRepo::update(&self.pool, id, &patch)
            .await?
            .ok_or_else(|| script_not_found(id))?;
        tracing::debug!(script_id = %id, "Script updated");
        Ok(script)
    }

    /// Returns `false` when there was nothing of the caller's to delete.
    pub async fn delete_script(&self, id: DbId, user_id: DbId) -> AppResult<bool> {
        if self.get_script(id, user_id).await?.is_none() {
            return Ok(false);
        }
        let deleted = ScriptRepo::delete(&self.pool, id).await?;
        if deleted {
            tracing::info!(script_id = %id, %user_id, "Script deleted");
        }
        Ok(deleted)
    }

    /// New `completed` script attached to one of the caller's videos.
    pub async fn create_script_from_video(
        &self,
        video_id: DbId,
        user_id: DbId,
        mut input: CreateScriptFromVideo,
    ) -> AppResult<Script> {
        validate_title(&input.title)?;
        validate_body(&input.script)?;
        if let Some(tags) = &input.tags {
            validate_tags(tags)?;
            input.tags = Some(normalize_tags(tags));
        }
        input.title = input.title.trim().to_string();
        self.ensure_video_owned(video_id, user_id).await?;

        let id = ScriptRepo::create_from_video(&self.pool, video_id, &input)
            .await?
            .ok_or_else(|| video_not_found(video_id))?;

        tracing::info!(script_id = %id, %video_id, "Script created from video");
        self.owned_script(id, user_id).await
    }

    /// Copy a script; the copy starts unfavorited with zero executions.
    pub async fn clone_script(
        &self,
        id: DbId,
        user_id: DbId,
        new_title: Option<&str>,
    ) -> AppResult<Script> {
        if let Some(title) = new_title.filter(|t| !t.trim().is_empty()) {
            validate_title(title)?;
        }
        self.owned_script(id, user_id).await?;

        let clone_id = ScriptRepo::clone(&self.pool, id, new_title)
            .await?
            .ok_or_else(|| script_not_found(id))?;

        tracing::info!(script_id = %clone_id, source_id = %id, "Script cloned");
        self.owned_script(clone_id, user_id).await
    }

    pub async fn toggle_favorite(&self, id: DbId, user_id: DbId, value: bool) -> AppResult<Script> {
        self.owned_script(id, user_id).await?;
        ScriptRepo::set_favorite(&self.pool, id, value)
            .await?
            .ok_or_else(|| script_not_found(id))
    }

    /// Atomic `+1`. The returned row carries the authoritative count.
    pub async fn increment_execution_count(&self, id: DbId, user_id: DbId) -> AppResult<Script> {
        self.owned_script(id, user_id).await?;
        let script = ScriptRepo::increment_execution_count(&self.pool, id)
            .await?
            .ok_or_else(|| script_not_found(id))?;
        tracing::info!(
            script_id = %id,
            execution_count = script.execution_count,
            "Script execution recorded"
        );
        Ok(script)
    }

    pub async fn owned_script(&self, id: DbId, user_id: DbId) -> AppResult<Script> {
        self.get_script(id, user_id)
            .await?
            .ok_or_else(|| script_not_found(id))
    }

    async fn ensure_video_owned(&self, video_id: DbId, user_id: DbId) -> AppResult<()> {
        match VideoRepo::find_by_id(&self.pool, video_id).await? {
            Some(video) if video.user_id == user_id => Ok(()),
            _ => Err(video_not_found(video_id)),
        }
    }
}
