//! Object storage for uploaded videos and thumbnails.
//!
//! Every backend implements [`ObjectStore`]. The API holds one as
//! `Arc<dyn ObjectStore>`, picked at startup from [`StorageConfig`]:
//!
//! - [`s3::S3ObjectStore`] -- any S3-compatible service.
//! - [`local::LocalObjectStore`] -- files on disk, served by the API itself.
//! - [`memory::MemoryObjectStore`] -- in-process map for tests.

pub mod local;
pub mod memory;
pub mod s3;

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;

/// Default bucket holding every object.
pub const DEFAULT_BUCKET: &str = "videos";

/// Errors reported by an object store backend.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("object already exists: {0}")]
    AlreadyExists(String),

    #[error("invalid object path: {0}")]
    InvalidPath(String),

    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("storage backend error: {0}")]
    Backend(String),
}

/// A bucket of blobs addressed by slash-separated relative paths.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Name of the bucket this store writes into.
    fn bucket(&self) -> &str;

    /// Write an object. When `upsert` is false an existing object at `path`
    /// fails with [`StorageError::AlreadyExists`].
    async fn put(
        &self,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
        upsert: bool,
    ) -> Result<(), StorageError>;

    /// Remove an object. Removing a missing object succeeds.
    async fn delete(&self, path: &str) -> Result<(), StorageError>;

    /// Whether an object exists at `path`.
    async fn exists(&self, path: &str) -> Result<bool, StorageError>;

    /// Publicly resolvable URL of the object at `path`.
    fn public_url(&self, path: &str) -> String;

    /// Inverse of [`public_url`](Self::public_url) for URLs this store issued.
    fn path_from_public_url(&self, url: &str) -> Option<String>;
}

/// Reject paths that could escape the bucket or that no backend can store.
pub fn validate_object_path(path: &str) -> Result<(), StorageError> {
    let invalid = path.is_empty()
        || path.starts_with('/')
        || path.contains('\\')
        || path
            .split('/')
            .any(|seg| seg.is_empty() || seg == "." || seg == "..");
    if invalid {
        return Err(StorageError::InvalidPath(path.to_string()));
    }
    Ok(())
}

/// Builds and parses `{base}/{bucket}/{path}` URLs.
#[derive(Debug, Clone)]
pub struct PublicUrls {
    prefix: String,
}

impl PublicUrls {
    pub fn new(base_url: &str, bucket: &str) -> Self {
        Self {
            prefix: format!("{}/{bucket}/", base_url.trim_end_matches('/')),
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.prefix)
    }

    pub fn path_of(&self, url: &str) -> Option<String> {
        url.strip_prefix(&self.prefix)
            .filter(|p| validate_object_path(p).is_ok())
            .map(str::to_string)
    }
}

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Which backend to construct.
#[derive(Debug, Clone)]
pub enum StorageBackend {
    /// Files under `root`.
    Local { root: PathBuf },
    /// An S3-compatible endpoint.
    S3(S3Settings),
}

/// Connection settings for [`s3::S3ObjectStore`].
#[derive(Debug, Clone)]
pub struct S3Settings {
    /// Custom endpoint (MinIO, R2, ...). `None` uses AWS.
    pub endpoint: Option<String>,
    pub region: String,
    pub force_path_style: bool,
    /// Static credentials; when absent the default AWS provider chain is used.
    pub access_key_id: Option<String>,
    pub secret_access_key: Option<String>,
}

/// Object storage configuration loaded from the environment.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    pub bucket: String,
    /// Prefix of every public URL, without the bucket.
    pub public_base_url: String,
}

impl StorageConfig {
    /// Load storage configuration from environment variables.
    ///
    /// | Env Var                   | Default                         |
    /// |---------------------------|---------------------------------|
    /// | `STORAGE_BACKEND`         | `local` (`local` or `s3`)       |
    /// | `STORAGE_BUCKET`          | `videos`                        |
    /// | `STORAGE_LOCAL_DIR`       | `storage`                       |
    /// | `STORAGE_PUBLIC_BASE_URL` | `http://localhost:3000/storage` |
    /// | `S3_ENDPOINT`             | --                              |
    /// | `S3_REGION`               | `us-east-1`                     |
    /// | `S3_FORCE_PATH_STYLE`     | `false`                         |
    /// | `S3_ACCESS_KEY_ID`        | --                              |
    /// | `S3_SECRET_ACCESS_KEY`    | --                              |
    ///
    /// # Panics
    ///
    /// Panics on an unknown `STORAGE_BACKEND` or a malformed boolean.
    pub fn from_env() -> Self {
        let bucket = std::env::var("STORAGE_BUCKET").unwrap_or_else(|_| DEFAULT_BUCKET.into());
        let public_base_url = std::env::var("STORAGE_PUBLIC_BASE_URL")
            .unwrap_or_else(|_| "http://localhost:3000/storage".into());

        let backend_name = std::env::var("STORAGE_BACKEND").unwrap_or_else(|_| "local".into());
        let backend = match backend_name.as_str() {
            "local" => StorageBackend::Local {
                root: std::env::var("STORAGE_LOCAL_DIR")
                    .unwrap_or_else(|_| "storage".into())
                    .into(),
            },
            "s3" => StorageBackend::S3(S3Settings {
                endpoint: std::env::var("S3_ENDPOINT").ok().filter(|s| !s.is_empty()),
                region: std::env::var("S3_REGION").unwrap_or_else(|_| "us-east-1".into()),
                force_path_style: std::env::var("S3_FORCE_PATH_STYLE")
                    .unwrap_or_else(|_| "false".into())
                    .parse()
                    .expect("S3_FORCE_PATH_STYLE must be true or false"),
                access_key_id: std::env::var("S3_ACCESS_KEY_ID").ok(),
                secret_access_key: std::env::var("S3_SECRET_ACCESS_KEY").ok(),
            }),
            other => panic!("Unknown STORAGE_BACKEND '{other}'. Expected 'local' or 's3'"),
        };

        Self {
            backend,
            bucket,
            public_base_url,
        }
    }
}

/// Construct the configured backend.
pub async fn connect(config: &StorageConfig) -> Result<Arc<dyn ObjectStore>, StorageError> {
    let store: Arc<dyn ObjectStore> = match &config.backend {
        StorageBackend::Local { root } => Arc::new(
            local::LocalObjectStore::new(root.clone(), &config.bucket, &config.public_base_url)
                .await?,
        ),
        StorageBackend::S3(settings) => Arc::new(
            s3::S3ObjectStore::connect(settings, &config.bucket, &config.public_base_url).await,
        ),
    };
    tracing::info!(bucket = %config.bucket, "Object store ready");
    Ok(store)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn object_path_validation() {
        assert!(validate_object_path("u/v/1-a.mp4").is_ok());
        assert!(validate_object_path("").is_err());
        assert!(validate_object_path("/abs").is_err());
        assert!(validate_object_path("a/../b").is_err());
        assert!(validate_object_path("a//b").is_err());
        assert!(validate_object_path("a\\b").is_err());
        assert!(validate_object_path("./a").is_err());
    }

    #[test]
    fn public_urls_round_trip() {
        let urls = PublicUrls::new("http://cdn.test/storage/", "videos");
        let url = urls.url("u/v/clip.mp4");
        assert_eq!(url, "http://cdn.test/storage/videos/u/v/clip.mp4");
        assert_eq!(urls.path_of(&url).as_deref(), Some("u/v/clip.mp4"));
        assert_eq!(urls.path_of("http://elsewhere/videos/u/v/clip.mp4"), None);
        assert_eq!(urls.path_of("http://cdn.test/storage/videos/../x"), None);
    }
}
