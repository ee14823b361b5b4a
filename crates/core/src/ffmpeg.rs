//! Thin wrappers around the `ffprobe` and `ffmpeg` binaries.
//!
//! Used by the post-upload enrichment task to derive a video's duration and
//! a poster-frame thumbnail. Both binaries must be on `PATH`; their absence is
//! reported as [`FfmpegError::NotFound`] so callers can skip enrichment.

use std::path::Path;

use serde::Deserialize;

/// Width of server-generated thumbnails; height keeps the aspect ratio.
pub const THUMBNAIL_WIDTH: u32 = 640;

/// Error type for FFmpeg/FFprobe operations.
#[derive(Debug, thiserror::Error)]
pub enum FfmpegError {
    #[error("ffprobe/ffmpeg binary not found: {0}")]
    NotFound(std::io::Error),

    #[error("ffprobe/ffmpeg execution failed (exit code {exit_code:?}): {stderr}")]
    ExecutionFailed {
        exit_code: Option<i32>,
        stderr: String,
    },

    #[error("failed to parse ffprobe output: {0}")]
    ParseError(String),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("video file not found: {0}")]
    VideoNotFound(String),
}

// ---------------------------------------------------------------------------
// ffprobe JSON output structures
// ---------------------------------------------------------------------------

/// Top-level ffprobe JSON output (`-print_format json -show_format -show_streams`).
#[derive(Debug, Deserialize)]
pub struct FfprobeOutput {
    #[serde(default)]
    pub streams: Vec<FfprobeStream>,
    pub format: FfprobeFormat,
}

/// The subset of a stream entry this crate reads.
#[derive(Debug, Deserialize)]
pub struct FfprobeStream {
    pub codec_type: Option<String>,
    pub duration: Option<String>,
}

/// Format-level metadata from ffprobe.
#[derive(Debug, Deserialize)]
pub struct FfprobeFormat {
    pub duration: Option<String>,
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

/// Run `ffprobe` on a video file and return the parsed JSON output.
pub async fn probe_video(path: &Path) -> Result<FfprobeOutput, FfmpegError> {
    if !path.exists() {
        return Err(FfmpegError::VideoNotFound(
            path.to_string_lossy().to_string(),
        ));
    }

    let output = tokio::process::Command::new("ffprobe")
        .args([
            "-v",
            "quiet",
            "-print_format",
            "json",
            "-show_format",
            "-show_streams",
        ])
        .arg(path)
        .output()
        .await
        .map_err(FfmpegError::NotFound)?;

    if !output.status.success() {
        return Err(FfmpegError::ExecutionFailed {
            exit_code: output.status.code(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        });
    }

    parse_probe_json(&String::from_utf8_lossy(&output.stdout))
}

/// Extract a single frame as a JPEG at the given timestamp.
pub async fn extract_frame_thumbnail(
    video_path: &Path,
    output_path: &Path,
    timestamp_secs: f64,
    width: u32,
) -> Result<(), FfmpegError> {
    if !video_path.exists() {
        return Err(FfmpegError::VideoNotFound(
            video_path.to_string_lossy().to_string(),
        ));
    }

    let output = tokio::process::Command::new("ffmpeg")
        .args(["-y", "-ss", &format!("{timestamp_secs:.3}"), "-i"])
        .arg(video_path)
        .args([
            "-vframes",
            "1",
            "-vf",
            &format!("scale={width}:-2"),
            "-q:v",
            "3",
        ])
        .arg(output_path)
        .output()
        .await
        .map_err(FfmpegError::NotFound)?;

    if !output.status.success() {
        return Err(FfmpegError::ExecutionFailed {
            exit_code: output.status.code(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        });
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Parsing helpers
// ---------------------------------------------------------------------------

/// Parse raw ffprobe JSON.
pub fn parse_probe_json(json: &str) -> Result<FfprobeOutput, FfmpegError> {
    serde_json::from_str::<FfprobeOutput>(json)
        .map_err(|e| FfmpegError::ParseError(format!("{e}: {json}")))
}

/// Video duration in seconds, from the container first and the first video
/// stream second. `None` when neither carries a usable value.
pub fn parse_duration(probe: &FfprobeOutput) -> Option<f64> {
    let from_format = probe.format.duration.as_deref().and_then(parse_seconds);
    from_format.or_else(|| {
        probe
            .streams
            .iter()
            .find(|s| s.codec_type.as_deref() == Some("video"))
            .and_then(|s| s.duration.as_deref())
            .and_then(parse_seconds)
    })
}

fn parse_seconds(raw: &str) -> Option<f64> {
    raw.parse::<f64>()
        .ok()
        .filter(|secs| secs.is_finite() && *secs >= 0.0)
}

/// Timestamp of the poster frame: the requested offset, but never past the
/// middle of the video.
pub fn thumbnail_timestamp(duration_secs: Option<f64>, requested_secs: f64) -> f64 {
    match duration_secs {
        Some(d) if d > 0.0 => requested_secs.min(d / 2.0),
        _ => 0.0,
    }
}
