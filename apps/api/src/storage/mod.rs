//! Blob store collaborator — the only module that talks to S3.
//!
//! The matching pipeline never calls this directly; it only ever receives
//! already-fetched bytes. Handlers own the store/fetch/delete lifecycle.

use aws_config::Region;
use aws_sdk_s3::config::Credentials;
use aws_sdk_s3::primitives::ByteStream;
use bytes::Bytes;
use tracing::info;

use crate::config::Config;
use crate::errors::AppError;
use crate::retry::{retry, RetryPolicy};

/// Explicit collaborator instance, created once per process and injected into
/// `AppState` — no lazily-initialized global handle.
#[derive(Clone)]
pub struct BlobStore {
    client: aws_sdk_s3::Client,
    bucket: String,
    retry: RetryPolicy,
}

impl BlobStore {
    pub async fn from_config(config: &Config) -> Self {
        let credentials = Credentials::new(
            &config.aws_access_key_id,
            &config.aws_secret_access_key,
            None,
            None,
            "blob-store-static",
        );

        let s3_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(Region::new("us-east-1"))
            .credentials_provider(credentials)
            .endpoint_url(&config.s3_endpoint)
            .load()
            .await;

        Self {
            client: aws_sdk_s3::Client::new(&s3_config),
            bucket: config.s3_bucket.clone(),
            retry: RetryPolicy::default(),
        }
    }

    /// Uploads document bytes under the given key. The caller must only create
    /// a database record after this returns `Ok`.
    pub async fn store(&self, key: &str, bytes: Bytes, content_type: &str) -> Result<(), AppError> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(bytes))
            .content_type(content_type)
            .send()
            .await
            .map_err(|e| AppError::Storage(format!("upload of '{key}' failed: {e}")))?;

        info!("Stored blob s3://{}/{}", self.bucket, key);
        Ok(())
    }

    /// Fetches the full contents of a stored document.
    pub async fn fetch(&self, key: &str) -> Result<Bytes, AppError> {
        let object = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| AppError::Storage(format!("fetch of '{key}' failed: {e}")))?;

        let body = object
            .body
            .collect()
            .await
            .map_err(|e| AppError::Storage(format!("read of '{key}' failed: {e}")))?;

        Ok(body.into_bytes())
    }

    /// Deletes a stored document, retrying transient failures per the bounded
    /// retry policy.
    pub async fn delete(&self, key: &str) -> Result<(), AppError> {
        retry(self.retry, "blob delete", || async {
            self.client
                .delete_object()
                .bucket(&self.bucket)
                .key(key)
                .send()
                .await
                .map_err(|e| AppError::Storage(format!("delete of '{key}' failed: {e}")))
        })
        .await?;

        info!("Deleted blob s3://{}/{}", self.bucket, key);
        Ok(())
    }
}
