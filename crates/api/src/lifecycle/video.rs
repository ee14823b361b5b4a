//! Upload, lookup, enrichment results and deletion of videos.

use std::sync::Arc;

use chrono::Utc;
use innovate_core::data_url::decode_image_data_url;
use innovate_core::error::CoreError;
use innovate_core::types::{new_id, DbId};
use innovate_core::video::{
    default_title, thumbnail_object_path, validate_duration, validate_title, validate_upload,
    video_object_path, THUMBNAIL_CONTENT_TYPE,
};
use innovate_db::models::video::{CreateVideo, Video};
use innovate_db::repositories::VideoRepo;
use innovate_storage::ObjectStore;
use sqlx::PgPool;
use tokio::task::JoinHandle;

use crate::enrichment::{
    spawn_enrichment, EnrichmentError, EnrichmentJob, EnrichmentOutcome, MediaProbe,
};
use crate::error::{AppError, AppResult};

fn video_not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound { entity: "Video", id })
}

/// A video file as received from the client.
#[derive(Debug)]
pub struct Upload {
    pub file_name: String,
    pub mime_type: String,
    /// Size the client claimed; `None` trusts the received byte count.
    pub declared_size: Option<u64>,
    pub bytes: Vec<u8>,
    pub title: Option<String>,
    pub description: Option<String>,
}

/// The inserted row plus the handle of its enrichment task, if one started.
#[derive(Debug)]
pub struct UploadedVideo {
    pub video: Video,
    pub enrichment: Option<JoinHandle<Result<EnrichmentOutcome, EnrichmentError>>>,
}

pub struct VideoLifecycle {
    pool: PgPool,
    storage: Arc<dyn ObjectStore>,
    probe: Option<Arc<dyn MediaProbe>>,
    max_upload_bytes: u64,
}

impl VideoLifecycle {
    pub fn new(
        pool: PgPool,
        storage: Arc<dyn ObjectStore>,
        probe: Option<Arc<dyn MediaProbe>>,
        max_upload_bytes: u64,
    ) -> Self {
        Self {
            pool,
            storage,
            probe,
            max_upload_bytes,
        }
    }

    pub fn max_upload_bytes(&self) -> u64 {
        self.max_upload_bytes
    }

    /// Store the file, then insert its row.
    ///
    /// A failed insert deletes the stored object again. Enrichment, when
    /// enabled, starts after the row exists and never affects the result.
    pub async fn upload_video(&self, user_id: DbId, upload: Upload) -> AppResult<UploadedVideo> {
        let received = upload.bytes.len() as u64;
        validate_upload(
            &upload.mime_type,
            upload.declared_size.unwrap_or(received),
            received,
            self.max_upload_bytes,
        )?;

        let title = match upload.title.as_deref().map(str::trim) {
            Some(t) if !t.is_empty() => {
                validate_title(t)?;
                t.to_string()
            }
            _ => default_title(&upload.file_name),
        };
        let description = upload
            .description
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty());

        let video_id = new_id();
        let file_path = video_object_path(
            user_id,
            video_id,
            Utc::now().timestamp_millis(),
            &upload.file_name,
        );

        let scratch = self.probe.is_some().then(|| upload.bytes.clone());
        self.storage
            .put(&file_path, upload.bytes, &upload.mime_type, false)
            .await
            .inspect_err(|e| {
                tracing::error!(%user_id, path = %file_path, error = %e, "Video object write failed");
            })?;

        let input = CreateVideo {
            id: video_id,
            user_id,
            title,
            description,
            file_name: upload.file_name,
            storage_url: self.storage.public_url(&file_path),
            file_path,
            file_size: received as i64,
            mime_type: upload.mime_type,
        };

        let video = match VideoRepo::create(&self.pool, &input).await {
            Ok(video) => video,
            Err(e) => {
                if let Err(cleanup) = self.storage.delete(&input.file_path).await {
                    tracing::error!(
                        path = %input.file_path,
                        error = %cleanup,
                        "Failed to remove object after insert failure"
                    );
                }
                return Err(e.into());
            }
        };

        tracing::info!(
            video_id = %video.id,
            %user_id,
            file_size = video.file_size,
            "Video uploaded"
        );

        let enrichment = match (&self.probe, scratch) {
            (Some(probe), Some(bytes)) => Some(spawn_enrichment(EnrichmentJob {
                pool: self.pool.clone(),
                storage: Arc::clone(&self.storage),
                probe: Arc::clone(probe),
                video: video.clone(),
                bytes,
            })),
            _ => None,
        };

        Ok(UploadedVideo { video, enrichment })
    }

    /// Lookup by id. `None` when absent.
    pub async fn get_video_metadata(&self, id: DbId) -> AppResult<Option<Video>> {
        Ok(VideoRepo::find_by_id(&self.pool, id).await?)
    }

    /// Lookup that treats another user's video as missing.
    pub async fn owned_video(&self, id: DbId, user_id: DbId) -> AppResult<Video> {
        self.get_video_metadata(id)
            .await?
            .filter(|v| v.user_id == user_id)
            .ok_or_else(|| video_not_found(id))
    }

    pub async fn get_user_videos(&self, user_id: DbId) -> AppResult<Vec<Video>> {
        Ok(VideoRepo::list_by_user(&self.pool, user_id).await?)
    }

    pub async fn get_all_videos(&self) -> AppResult<Vec<Video>> {
        Ok(VideoRepo::list_all(&self.pool).await?)
    }

    /// Store a client-rendered thumbnail and point the row at it. The object
    /// path is fixed per video, so a new thumbnail replaces the old one.
    pub async fn update_video_thumbnail(&self, id: DbId, data_url: &str) -> AppResult<Video> {
        let image = decode_image_data_url(data_url)?;
        let video = self
            .get_video_metadata(id)
            .await?
            .ok_or_else(|| video_not_found(id))?;

        // Stored at a fixed `.jpg` path, so every thumbnail is JPEG.
        let source_format = image.content_type();
        let jpeg = image.into_jpeg()?;
        let path = thumbnail_object_path(video.user_id, video.id);
        self.storage.put(&path, jpeg, THUMBNAIL_CONTENT_TYPE, true).await?;

        let updated = VideoRepo::set_thumbnail_url(&self.pool, id, &self.storage.public_url(&path))
            .await?
            .ok_or_else(|| video_not_found(id))?;

        tracing::info!(video_id = %id, source_format, "Video thumbnail updated");
        Ok(updated)
    }

    /// Duration reported by a client that probed the file itself.
    pub async fn record_video_duration(&self, id: DbId, seconds: f64) -> AppResult<Video> {
        validate_duration(seconds)?;
        let video = VideoRepo::record_duration(&self.pool, id, seconds)
            .await?
            .ok_or_else(|| video_not_found(id))?;
        tracing::debug!(video_id = %id, seconds, "Video duration recorded");
        Ok(video)
    }

    /// Delete the row, then its objects. Object cleanup is best effort.
    pub async fn delete_video(&self, id: DbId) -> AppResult<bool> {
        let Some(video) = VideoRepo::delete(&self.pool, id).await? else {
            return Ok(false);
        };

        let thumbnail_path = video
            .thumbnail_url
            .as_deref()
            .and_then(|url| self.storage.path_from_public_url(url));

        for path in std::iter::once(video.file_path.clone()).chain(thumbnail_path) {
            if let Err(e) = self.storage.delete(&path).await {
                tracing::warn!(video_id = %id, %path, error = %e, "Failed to delete video object");
            }
        }

        tracing::info!(video_id = %id, user_id = %video.user_id, "Video deleted");
        Ok(true)
    }
}
