//! Best-effort post-upload enrichment: duration and poster thumbnail.
//!
//! Runs detached from the upload request. Each step that fails is logged and
//! skipped, so a video row never loses the state it had after upload.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use innovate_core::ffmpeg::{self, FfmpegError, THUMBNAIL_WIDTH};
use innovate_core::video::{thumbnail_object_path, validate_duration, THUMBNAIL_CONTENT_TYPE};
use innovate_db::models::video::{Video, VideoEnrichment};
use innovate_db::repositories::VideoRepo;
use innovate_storage::{ObjectStore, StorageError};
use sqlx::PgPool;
use tokio::task::JoinHandle;

/// Offset of the poster frame, clamped to the middle of short videos.
const THUMBNAIL_OFFSET_SECS: f64 = 1.0;

#[derive(Debug, thiserror::Error)]
pub enum EnrichmentError {
    #[error(transparent)]
    Ffmpeg(#[from] FfmpegError),

    #[error("probe reported no usable duration")]
    NoDuration,

    #[error("scratch file error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Derives media facts from a video file on disk.
#[async_trait]
pub trait MediaProbe: Send + Sync {
    /// Duration in seconds.
    async fn probe_duration(&self, path: &Path) -> Result<f64, EnrichmentError>;

    /// A JPEG poster frame. `duration` bounds the frame offset when known.
    async fn extract_thumbnail(
        &self,
        path: &Path,
        duration: Option<f64>,
    ) -> Result<Vec<u8>, EnrichmentError>;
}

/// [`MediaProbe`] backed by the `ffprobe` and `ffmpeg` binaries.
pub struct FfmpegProbe;

#[async_trait]
impl MediaProbe for FfmpegProbe {
    async fn probe_duration(&self, path: &Path) -> Result<f64, EnrichmentError> {
        let probe = ffmpeg::probe_video(path).await?;
        ffmpeg::parse_duration(&probe).ok_or(EnrichmentError::NoDuration)
    }

    async fn extract_thumbnail(
        &self,
        path: &Path,
        duration: Option<f64>,
    ) -> Result<Vec<u8>, EnrichmentError> {
        let dir = tempfile::tempdir()?;
        let output = dir.path().join("thumbnail.jpg");
        let at = ffmpeg::thumbnail_timestamp(duration, THUMBNAIL_OFFSET_SECS);
        ffmpeg::extract_frame_thumbnail(path, &output, at, THUMBNAIL_WIDTH).await?;
        Ok(tokio::fs::read(&output).await?)
    }
}

/// What enrichment managed to record.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EnrichmentOutcome {
    pub duration: Option<f64>,
    pub thumbnail_url: Option<String>,
}

/// Everything the detached task needs, owned.
pub struct EnrichmentJob {
    pub pool: PgPool,
    pub storage: Arc<dyn ObjectStore>,
    pub probe: Arc<dyn MediaProbe>,
    pub video: Video,
    pub bytes: Vec<u8>,
}

/// Spawn enrichment for a freshly uploaded video. Callers may drop the handle.
pub fn spawn_enrichment(job: EnrichmentJob) -> JoinHandle<Result<EnrichmentOutcome, EnrichmentError>> {
    tokio::spawn(async move {
        let video_id = job.video.id;
        let result = job.run().await;
        match &result {
            Ok(outcome) => tracing::info!(
                %video_id,
                duration = ?outcome.duration,
                has_thumbnail = outcome.thumbnail_url.is_some(),
                "Video enrichment finished"
            ),
            Err(e) => tracing::warn!(%video_id, error = %e, "Video enrichment aborted"),
        }
        result
    })
}

impl EnrichmentJob {
    async fn run(self) -> Result<EnrichmentOutcome, EnrichmentError> {
        let video_id = self.video.id;

        // Probes read from disk. Keep the extension for ffprobe's demuxer guess.
        let suffix = Path::new(&self.video.file_name)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| format!(".{e}"))
            .unwrap_or_default();
        let scratch = tempfile::Builder::new()
            .prefix("innovate-enrich-")
            .suffix(&suffix)
            .tempfile()?;
        tokio::fs::write(scratch.path(), &self.bytes).await?;

        let duration = match self.probe.probe_duration(scratch.path()).await {
            Ok(secs) if validate_duration(secs).is_ok() => Some(secs),
            Ok(secs) => {
                tracing::warn!(%video_id, secs, "Ignoring invalid probed duration");
                None
            }
            Err(e) => {
                tracing::warn!(%video_id, error = %e, "Duration probe failed");
                None
            }
        };

        let thumbnail_path = match self.probe.extract_thumbnail(scratch.path(), duration).await {
            Ok(jpeg) => self.store_thumbnail(jpeg).await,
            Err(e) => {
                tracing::warn!(%video_id, error = %e, "Thumbnail extraction failed");
                None
            }
        };

        let outcome = EnrichmentOutcome {
            duration,
            thumbnail_url: thumbnail_path.as_deref().map(|p| self.storage.public_url(p)),
        };
        if outcome.duration.is_none() && outcome.thumbnail_url.is_none() {
            return Ok(outcome);
        }

        let patch = VideoEnrichment {
            duration: outcome.duration,
            thumbnail_url: outcome.thumbnail_url.clone(),
        };
        if VideoRepo::apply_enrichment(&self.pool, video_id, &patch)
            .await?
            .is_some()
        {
            return Ok(outcome);
        }

        // Deleted mid-run: that delete never saw this thumbnail.
        tracing::info!(%video_id, "Video deleted during enrichment");
        if let Some(path) = thumbnail_path {
            if let Err(e) = self.storage.delete(&path).await {
                tracing::warn!(%video_id, %path, error = %e, "Failed to delete orphaned thumbnail");
            }
        }
        Ok(EnrichmentOutcome::default())
    }

    /// Upload the poster frame. Returns its object path.
    async fn store_thumbnail(&self, jpeg: Vec<u8>) -> Option<String> {
        let path = thumbnail_object_path(self.video.user_id, self.video.id);
        match self
            .storage
            .put(&path, jpeg, THUMBNAIL_CONTENT_TYPE, true)
            .await
        {
            Ok(()) => Some(path),
            Err(e) => {
                tracing::warn!(video_id = %self.video.id, error = %e, "Thumbnail upload failed");
                None
            }
        }
    }
}
