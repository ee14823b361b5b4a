//! S3-compatible object store (AWS, MinIO, R2).

use async_trait::async_trait;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;

use crate::{validate_object_path, ObjectStore, PublicUrls, S3Settings, StorageError};

/// HTTP status S3 returns when an `If-None-Match: *` write finds an object.
const PRECONDITION_FAILED: u16 = 412;

pub struct S3ObjectStore {
    client: Client,
    bucket: String,
    urls: PublicUrls,
}

impl S3ObjectStore {
    /// Build a client from explicit settings, falling back to the default
    /// AWS credential chain when no static keys are configured.
    pub async fn connect(settings: &S3Settings, bucket: &str, public_base_url: &str) -> Self {
        let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(aws_config::Region::new(settings.region.clone()));

        if let (Some(key), Some(secret)) = (&settings.access_key_id, &settings.secret_access_key) {
            loader = loader.credentials_provider(aws_credential_types::Credentials::new(
                key.clone(),
                secret.clone(),
                None,
                None,
                "innovate-static",
            ));
        }
        if let Some(endpoint) = &settings.endpoint {
            loader = loader.endpoint_url(endpoint.clone());
        }

        let shared = loader.load().await;
        let config = aws_sdk_s3::config::Builder::from(&shared)
            .force_path_style(settings.force_path_style)
            .build();

        tracing::info!(
            bucket,
            region = %settings.region,
            endpoint = ?settings.endpoint,
            "S3 object store configured"
        );

        Self {
            client: Client::from_conf(config),
            bucket: bucket.to_string(),
            urls: PublicUrls::new(public_base_url, bucket),
        }
    }
}

fn backend_error(op: &str, path: &str, err: impl std::fmt::Display) -> StorageError {
    StorageError::Backend(format!("S3 {op} '{path}' failed: {err}"))
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
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

        let mut request = self
            .client
            .put_object()
            .bucket(&self.bucket)
            .key(path)
            .content_type(content_type)
            .body(ByteStream::from(bytes));
        if !upsert {
            request = request.if_none_match("*");
        }

        request.send().await.map_err(|e| {
            let status = e.raw_response().map(|r| r.status().as_u16());
            if status == Some(PRECONDITION_FAILED) {
                StorageError::AlreadyExists(path.to_string())
            } else {
                backend_error("put", path, aws_sdk_s3::error::DisplayErrorContext(e))
            }
        })?;

        tracing::debug!(bucket = %self.bucket, path, "Uploaded object to S3");
        Ok(())
    }

    async fn delete(&self, path: &str) -> Result<(), StorageError> {
        validate_object_path(path)?;
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(path)
            .send()
            .await
            .map_err(|e| backend_error("delete", path, aws_sdk_s3::error::DisplayErrorContext(e)))?;
        Ok(())
    }

    async fn exists(&self, path: &str) -> Result<bool, StorageError> {
        validate_object_path(path)?;
        match self
            .client
            .head_object()
            .bucket(&self.bucket)
            .key(path)
            .send()
            .await
        {
            Ok(_) => Ok(true),
            Err(e) if e.as_service_error().is_some_and(|se| se.is_not_found()) => Ok(false),
            Err(e) => Err(backend_error(
                "head",
                path,
                aws_sdk_s3::error::DisplayErrorContext(e),
            )),
        }
    }

    fn public_url(&self, path: &str) -> String {
        self.urls.url(path)
    }

    fn path_from_public_url(&self, url: &str) -> Option<String> {
        self.urls.path_of(url)
    }
}
