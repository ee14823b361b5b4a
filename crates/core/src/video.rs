//! Video upload rules, lifecycle statuses, and object storage paths.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::DbId;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Default upper bound for a single upload (100 MiB).
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 100 * 1024 * 1024;

/// Maximum length of a video title in characters.
pub const MAX_TITLE_LENGTH: usize = 255;

/// Required prefix of an uploaded file's MIME type.
const VIDEO_MIME_PREFIX: &str = "video/";

/// Content type used for every stored thumbnail.
pub const THUMBNAIL_CONTENT_TYPE: &str = "image/jpeg";

/// Characters that survive file name sanitization unchanged.
static UNSAFE_FILE_NAME_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-zA-Z0-9.\-]").expect("valid regex"));

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

/// Lifecycle status of a video row (`videos.status`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VideoStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

impl VideoStatus {
    /// All statuses, in lifecycle order.
    pub const ALL: [VideoStatus; 4] = [
        Self::Pending,
        Self::Processing,
        Self::Completed,
        Self::Failed,
    ];

    /// The value stored in the database.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    /// Parse from the database value.
    pub fn from_name(name: &str) -> Result<Self, CoreError> {
        Self::ALL
            .into_iter()
            .find(|s| s.as_str() == name)
            .ok_or_else(|| CoreError::Validation(format!("Unknown video status '{name}'")))
    }
}

impl fmt::Display for VideoStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lets row models decode the `status` TEXT column directly.
impl TryFrom<String> for VideoStatus {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_name(&value)
    }
}

// ---------------------------------------------------------------------------
// Upload validation
// ---------------------------------------------------------------------------

/// Validate an incoming upload before anything is written.
///
/// `declared_size` is what the client claimed, `received` is the byte count
/// actually read from the request body.
pub fn validate_upload(
    mime_type: &str,
    declared_size: u64,
    received: u64,
    max_bytes: u64,
) -> Result<(), CoreError> {
    if !mime_type.starts_with(VIDEO_MIME_PREFIX) {
        return Err(CoreError::Validation(
            "Please select a valid video file".into(),
        ));
    }
    if received == 0 {
        return Err(CoreError::Validation("Video file is empty".into()));
    }
    if declared_size != received {
        return Err(CoreError::Validation(format!(
            "Declared size {declared_size} does not match received size {received}"
        )));
    }
    if received > max_bytes {
        return Err(CoreError::Validation(format!(
            "Video file size should be less than {}",
            crate::format::format_file_size(max_bytes)
        )));
    }
    Ok(())
}

/// Validate an optional title.
pub fn validate_title(title: &str) -> Result<(), CoreError> {
    if title.trim().is_empty() {
        return Err(CoreError::Validation("Title must not be empty".into()));
    }
    if title.chars().count() > MAX_TITLE_LENGTH {
        return Err(CoreError::Validation(format!(
            "Title must be at most {MAX_TITLE_LENGTH} characters"
        )));
    }
    Ok(())
}

/// Validate a duration reported by a client or by ffprobe.
pub fn validate_duration(seconds: f64) -> Result<(), CoreError> {
    if !seconds.is_finite() || seconds < 0.0 {
        return Err(CoreError::Validation(format!(
            "Duration must be a non-negative number of seconds, got {seconds}"
        )));
    }
    Ok(())
}

/// Title used when the uploader did not supply one: the file name without
/// its last extension.
pub fn default_title(file_name: &str) -> String {
    let stem = match file_name.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem,
        _ => file_name,
    };
    if stem.trim().is_empty() {
        "Untitled video".to_string()
    } else {
        stem.to_string()
    }
}

// ---------------------------------------------------------------------------
// Storage paths
// ---------------------------------------------------------------------------

/// Replace every character outside `[A-Za-z0-9.-]` with `_`.
pub fn safe_file_name(file_name: &str) -> String {
    UNSAFE_FILE_NAME_CHARS
        .replace_all(file_name, "_")
        .into_owned()
}

/// Object path for an uploaded video: `{user}/{video}/{millis}-{safe_name}`.
pub fn video_object_path(user_id: DbId, video_id: DbId, unix_millis: i64, file_name: &str) -> String {
    format!(
        "{user_id}/{video_id}/{unix_millis}-{}",
        safe_file_name(file_name)
    )
}

/// Deterministic object path of a video's thumbnail. Re-uploads overwrite it.
pub fn thumbnail_object_path(user_id: DbId, video_id: DbId) -> String {
    format!("{user_id}/thumbnails/{video_id}.jpg")
}
