//! Filesystem object store.
//!
//! Objects live at `{root}/{bucket}/{path}`. The API serves `{root}` under
//! `/storage`, so the default public base URL lines up with the layout.

use std::io::ErrorKind;
use std::path::PathBuf;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;

use crate::{validate_object_path, ObjectStore, PublicUrls, StorageError};

pub struct LocalObjectStore {
    root: PathBuf,
    bucket: String,
    urls: PublicUrls,
}

impl LocalObjectStore {
    /// Create the store, making sure the bucket directory exists.
    pub async fn new(
        root: PathBuf,
        bucket: &str,
        public_base_url: &str,
    ) -> Result<Self, StorageError> {
        tokio::fs::create_dir_all(root.join(bucket)).await?;
        Ok(Self {
            root,
            bucket: bucket.to_string(),
            urls: PublicUrls::new(public_base_url, bucket),
        })
    }

    /// Directory served as the public storage root.
    pub fn root(&self) -> &PathBuf {
        &self.root
    }

    fn resolve(&self, path: &str) -> Result<PathBuf, StorageError> {
        validate_object_path(path)?;
        Ok(self.root.join(&self.bucket).join(path))
    }
}

#[async_trait]
impl ObjectStore for LocalObjectStore {
    fn bucket(&self) -> &str {
        &self.bucket
    }

    async fn put(
        &self,
        path: &str,
        bytes: Vec<u8>,
        _content_type: &str,
        upsert: bool,
    ) -> Result<(), StorageError> {
        let full = self.resolve(path)?;
        if let Some(parent) = full.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let mut options = tokio::fs::OpenOptions::new();
        options.write(true);
        if upsert {
            options.create(true).truncate(true);
        } else {
            options.create_new(true);
        }

        let mut file = options.open(&full).await.map_err(|e| match e.kind() {
            ErrorKind::AlreadyExists => StorageError::AlreadyExists(path.to_string()),
            _ => StorageError::Io(e),
        })?;
        file.write_all(&bytes).await?;
        file.flush().await?;

        tracing::debug!(path = %full.display(), bytes = bytes.len(), "Wrote object");
        Ok(())
    }

    async fn delete(&self, path: &str) -> Result<(), StorageError> {
        let full = self.resolve(path)?;
        match tokio::fs::remove_file(&full).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    async fn exists(&self, path: &str) -> Result<bool, StorageError> {
        let full = self.resolve(path)?;
        Ok(tokio::fs::try_exists(&full).await?)
    }

    fn public_url(&self, path: &str) -> String {
        self.urls.url(path)
    }

    fn path_from_public_url(&self, url: &str) -> Option<String> {
        self.urls.path_of(url)
    }
}
