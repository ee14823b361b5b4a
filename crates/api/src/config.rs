use innovate_core::video::DEFAULT_MAX_UPLOAD_BYTES;
use innovate_storage::StorageConfig;

use crate::auth::token::TokenConfig;

/// Server configuration loaded from environment variables.
///
/// All fields have defaults suitable for local development except the
/// database URL and token secret.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Seconds to wait for background tasks after the listener closes.
    pub shutdown_timeout_secs: u64,
    /// Token signing secret and session lifetime.
    pub tokens: TokenConfig,
    /// Minimum password length accepted at signup.
    pub password_min_length: usize,
    /// Largest accepted video upload in bytes.
    pub max_upload_bytes: u64,
    /// Run ffprobe/ffmpeg enrichment after each upload.
    pub enrichment_enabled: bool,
    /// Interval of the expired-session cleanup job.
    pub session_cleanup_interval_secs: u64,
    pub storage: StorageConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                         | Default                 |
    /// |---------------------------------|-------------------------|
    /// | `HOST`                          | `0.0.0.0`               |
    /// | `PORT`                          | `3000`                  |
    /// | `CORS_ORIGINS`                  | `http://localhost:3000` |
    /// | `REQUEST_TIMEOUT_SECS`          | `30`                    |
    /// | `SHUTDOWN_TIMEOUT_SECS`         | `30`                    |
    /// | `PASSWORD_MIN_LENGTH`           | `8`                     |
    /// | `MAX_UPLOAD_BYTES`              | `104857600`             |
    /// | `ENRICHMENT_ENABLED`            | `true`                  |
    /// | `SESSION_CLEANUP_INTERVAL_SECS` | `3600`                  |
    ///
    /// Token settings come from [`TokenConfig::from_env`] and storage settings
    /// from [`StorageConfig::from_env`].
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:3000".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let shutdown_timeout_secs: u64 = std::env::var("SHUTDOWN_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("SHUTDOWN_TIMEOUT_SECS must be a valid u64");

        let password_min_length: usize = std::env::var("PASSWORD_MIN_LENGTH")
            .unwrap_or_else(|_| "8".into())
            .parse()
            .expect("PASSWORD_MIN_LENGTH must be a valid usize");

        let max_upload_bytes: u64 = std::env::var("MAX_UPLOAD_BYTES")
            .unwrap_or_else(|_| DEFAULT_MAX_UPLOAD_BYTES.to_string())
            .parse()
            .expect("MAX_UPLOAD_BYTES must be a valid u64");

        let enrichment_enabled: bool = std::env::var("ENRICHMENT_ENABLED")
            .unwrap_or_else(|_| "true".into())
            .parse()
            .expect("ENRICHMENT_ENABLED must be true or false");

        let session_cleanup_interval_secs: u64 = std::env::var("SESSION_CLEANUP_INTERVAL_SECS")
            .unwrap_or_else(|_| "3600".into())
            .parse()
            .expect("SESSION_CLEANUP_INTERVAL_SECS must be a valid u64");

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            shutdown_timeout_secs,
            tokens: TokenConfig::from_env(),
            password_min_length,
            max_upload_bytes,
            enrichment_enabled,
            session_cleanup_interval_secs,
            storage: StorageConfig::from_env(),
        }
    }
}
