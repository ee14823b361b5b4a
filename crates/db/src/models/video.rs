//! Video entity model and DTOs.

use innovate_core::types::{DbId, Timestamp};
use innovate_core::video::VideoStatus;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `videos` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Video {
    pub id: DbId,
    pub user_id: DbId,
    pub title: String,
    pub description: Option<String>,
    pub file_name: String,
    /// Object path inside the storage bucket.
    pub file_path: String,
    /// Public URL of the stored object.
    pub storage_url: String,
    pub file_size: i64,
    pub mime_type: String,
    /// Seconds; unknown until enrichment or the client reports it.
    pub duration: Option<f64>,
    pub thumbnail_url: Option<String>,
    #[sqlx(try_from = "String")]
    pub status: VideoStatus,
    pub metadata: serde_json::Value,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for inserting a video after its object has been written.
///
/// The id is generated by the caller because it is part of the object path.
#[derive(Debug, Clone)]
pub struct CreateVideo {
    pub id: DbId,
    pub user_id: DbId,
    pub title: String,
    pub description: Option<String>,
    pub file_name: String,
    pub file_path: String,
    pub storage_url: String,
    pub file_size: i64,
    pub mime_type: String,
}

/// Result of post-upload enrichment. `None` fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct VideoEnrichment {
    pub duration: Option<f64>,
    pub thumbnail_url: Option<String>,
}

/// Request body for `PUT /videos/{id}/thumbnail`.
#[derive(Debug, Deserialize)]
pub struct UpdateThumbnail {
    /// `data:<mime>;base64,<payload>`
    pub data_url: String,
}

/// Request body for `PUT /videos/{id}/duration`.
#[derive(Debug, Deserialize)]
pub struct RecordDuration {
    pub duration: f64,
}
