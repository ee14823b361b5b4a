//! In-process object store for tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::{validate_object_path, ObjectStore, PublicUrls, StorageError};

/// A stored blob and the content type it was written with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub bytes: Vec<u8>,
    pub content_type: String,
}

pub struct MemoryObjectStore {
    bucket: String,
    urls: PublicUrls,
    objects: Mutex<HashMap<String, StoredObject>>,
    fail_next_put: AtomicBool,
}

impl MemoryObjectStore {
    pub fn new(bucket: &str, public_base_url: &str) -> Self {
        Self {
            bucket: bucket.to_string(),
            urls: PublicUrls::new(public_base_url, bucket),
            objects: Mutex::new(HashMap::new()),
            fail_next_put: AtomicBool::new(false),
        }
    }

    /// Make the next `put` fail with a backend error.
    pub fn fail_next_put(&self) {
        self.fail_next_put.store(true, Ordering::SeqCst);
    }

    pub fn get(&self, path: &str) -> Option<StoredObject> {
        self.lock().get(path).cloned()
    }

    /// Paths of every stored object, sorted.
    pub fn paths(&self) -> Vec<String> {
        let mut paths: Vec<String> = self.lock().keys().cloned().collect();
        paths.sort();
        paths
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, StoredObject>> {
        // A panic while holding the lock cannot leave the map half-written.
        self.objects.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    fn bucket(&self) -> &str {
        &self.bucket
    }

    async fn put(
        &self,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
        upsert: bool,
    ) -> Result<(), StorageError> {
        validate_object_path(path)?;
        if self.fail_next_put.swap(false, Ordering::SeqCst) {
            return Err(StorageError::Backend("injected put failure".into()));
        }

        let mut objects = self.lock();
        if !upsert && objects.contains_key(path) {
            return Err(StorageError::AlreadyExists(path.to_string()));
        }
        objects.insert(
            path.to_string(),
            StoredObject {
                bytes,
                content_type: content_type.to_string(),
            },
        );
        Ok(())
    }

    async fn delete(&self, path: &str) -> Result<(), StorageError> {
        validate_object_path(path)?;
        self.lock().remove(path);
        Ok(())
    }

    async fn exists(&self, path: &str) -> Result<bool, StorageError> {
        validate_object_path(path)?;
        Ok(self.lock().contains_key(path))
    }

    fn public_url(&self, path: &str) -> String {
        self.urls.url(path)
    }

    fn path_from_public_url(&self, url: &str) -> Option<String> {
        self.urls.path_of(url)
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[tokio::test]
    async fn injected_failure_affects_one_put() {
        let store = MemoryObjectStore::new("videos", "http://mem");
        store.fail_next_put();
        assert_matches!(
            store.put("a", vec![1], "video/mp4", false).await,
            Err(StorageError::Backend(_))
        );
        store.put("a", vec![1], "video/mp4", false).await.unwrap();
        assert_eq!(store.get("a").unwrap().content_type, "video/mp4");
    }

    #[tokio::test]
    async fn upsert_semantics() {
        let store = MemoryObjectStore::new("videos", "http://mem");
        store.put("a", vec![1], "image/jpeg", false).await.unwrap();
        assert_matches!(
            store.put("a", vec![2], "image/jpeg", false).await,
            Err(StorageError::AlreadyExists(_))
        );
        store.put("a", vec![3], "image/jpeg", true).await.unwrap();
        assert_eq!(store.get("a").unwrap().bytes, vec![3]);
        assert_eq!(store.paths(), vec!["a".to_string()]);
    }
}
