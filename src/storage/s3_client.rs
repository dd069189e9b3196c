//! S3-compatible storage client
//!
//! Wraps the AWS SDK for S3-compatible storage access.

use std::path::Path;

use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_s3::{
    config::{Credentials, Region},
    error::DisplayErrorContext,
    primitives::ByteStream,
    Client,
};

use crate::config::S3Config;
use crate::remote::{RemoteStore, RemoteStoreError};

use super::types::{ObjectMetadata, StorageError};

/// Key prefix for uploaded files
const UPLOAD_PREFIX: &str = "uploads";

/// S3-compatible storage client
#[derive(Clone)]
pub struct S3Client {
    client: Client,
    bucket: String,
}

impl S3Client {
    /// Create a new S3 client from configuration
    pub async fn new(config: &S3Config) -> Result<Self, StorageError> {
        let bucket = config
            .bucket
            .clone()
            .ok_or_else(|| StorageError::NotConfigured("S3_BUCKET_NAME not set".to_string()))?;

        let region = Region::new(config.region.clone());

        let mut builder = match (&config.access_key_id, &config.secret_access_key) {
            (Some(access_key), Some(secret_key)) => {
                let credentials =
                    Credentials::new(access_key, secret_key, None, None, "upcache");
                aws_sdk_s3::Config::builder()
                    .behavior_version(BehaviorVersion::latest())
                    .region(region)
                    .credentials_provider(credentials)
            }
            _ => {
                // Default provider chain: env, profile, instance metadata
                let shared = aws_config::defaults(BehaviorVersion::latest())
                    .region(region)
                    .load()
                    .await;
                aws_sdk_s3::config::Builder::from(&shared)
            }
        };

        if let Some(endpoint) = &config.endpoint_url {
            // Path-style addressing is required for MinIO and other S3-compatible services
            builder = builder.endpoint_url(endpoint).force_path_style(true);
        }

        let client = Client::from_conf(builder.build());

        match client.head_bucket().bucket(&bucket).send().await {
            Ok(_) => {
                tracing::info!("Connected to S3 bucket: {}", bucket);
            }
            Err(e) => {
                tracing::warn!(
                    "Could not verify bucket {}: {}. Will attempt operations anyway.",
                    bucket,
                    DisplayErrorContext(&e)
                );
            }
        }

        Ok(Self { client, bucket })
    }

    /// Reference URI for a key in this bucket
    pub fn reference(&self, key: &str) -> String {
        format!("s3://{}/{}", self.bucket, key)
    }

    /// Store a local file under `key` without reading it into memory
    pub async fn put_file(
        &self,
        key: &str,
        path: &Path,
        content_type: &str,
    ) -> Result<ObjectMetadata, StorageError> {
        let size = tokio::fs::metadata(path)
            .await
            .map_err(|e| StorageError::LocalFile(format!("{}: {}", path.display(), e)))?
            .len() as i64;

        let body = ByteStream::from_path(path)
            .await
            .map_err(|e| StorageError::LocalFile(format!("{}: {}", path.display(), e)))?;

        let response = self
            .client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(body)
            .content_type(content_type)
            .send()
            .await
            .map_err(|e| {
                StorageError::SdkError(format!(
                    "Failed to put object {}: {}",
                    key,
                    DisplayErrorContext(&e)
                ))
            })?;

        tracing::debug!(bucket = %self.bucket, key = %key, size, "Stored object");

        Ok(ObjectMetadata {
            key: key.to_string(),
            size,
            content_type: Some(content_type.to_string()),
            etag: response.e_tag().map(|s| s.to_string()),
        })
    }

    /// Check the bucket is reachable; never fails
    pub async fn ping(&self) -> bool {
        match self.client.head_bucket().bucket(&self.bucket).send().await {
            Ok(_) => true,
            Err(e) => {
                tracing::error!("S3 ping error: {}", DisplayErrorContext(&e));
                false
            }
        }
    }
}

/// Object key for a new upload; unique per call
fn upload_key(display_name: &str) -> String {
    let name: String = display_name
        .chars()
        .map(|c| if c == '/' || c == '\\' { '_' } else { c })
        .collect();
    format!("{}/{}/{}", UPLOAD_PREFIX, uuid::Uuid::new_v4(), name)
}

#[async_trait]
impl RemoteStore for S3Client {
    fn backend_name(&self) -> &'static str {
        "s3"
    }

    async fn upload(
        &self,
        path: &Path,
        display_name: &str,
        content_type: &str,
    ) -> Result<String, RemoteStoreError> {
        let key = upload_key(display_name);

        let stored = self
            .put_file(&key, path, content_type)
            .await
            .map_err(|e| match e {
                StorageError::LocalFile(message) => RemoteStoreError::StagedFile(message),
                other => RemoteStoreError::UploadFailed(other.to_string()),
            })?;

        Ok(self.reference(&stored.key))
    }

    async fn ping(&self) -> bool {
        S3Client::ping(self).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upload_key_layout() {
        let key = upload_key("report.pdf");
        let parts: Vec<&str> = key.split('/').collect();

        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "uploads");
        assert!(uuid::Uuid::parse_str(parts[1]).is_ok());
        assert_eq!(parts[2], "report.pdf");
    }

    #[test]
    fn test_upload_key_flattens_separators() {
        let key = upload_key("../etc/passwd");
        assert!(key.ends_with("/.._etc_passwd"));
        assert_ne!(upload_key("same"), upload_key("same"));
    }

    #[tokio::test]
    async fn test_new_requires_bucket() {
        let config = S3Config {
            bucket: None,
            ..S3Config::default()
        };

        let result = S3Client::new(&config).await;
        assert!(matches!(result, Err(StorageError::NotConfigured(_))));
    }
}
