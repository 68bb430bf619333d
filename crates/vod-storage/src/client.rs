//! S3 client implementation.

use std::path::Path;
use std::time::Duration;

use aws_config::BehaviorVersion;
use aws_credential_types::Credentials;
use aws_sdk_s3::config::{Builder, Region};
use aws_sdk_s3::presigning::PresigningConfig;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use tracing::{debug, info};

use crate::error::{StorageError, StorageResult};

/// Validity window for client-facing upload handles.
pub const UPLOAD_HANDLE_TTL: Duration = Duration::from_secs(300);

/// Validity window for general download handles.
pub const DOWNLOAD_HANDLE_TTL: Duration = Duration::from_secs(3600);

/// Validity window for the worker's source-fetch handle. Longer than the
/// general download window since transcoding may be slow to start and run.
pub const SOURCE_FETCH_TTL: Duration = Duration::from_secs(7200);

/// Configuration for the S3 client.
#[derive(Debug, Clone)]
pub struct S3Config {
    /// AWS region
    pub region: String,
    /// Static access key; falls back to the default provider chain when absent
    pub access_key_id: Option<String>,
    /// Static secret key; falls back to the default provider chain when absent
    pub secret_access_key: Option<String>,
}

impl S3Config {
    /// Create config from environment variables.
    pub fn from_env() -> StorageResult<Self> {
        Ok(Self {
            region: std::env::var("BUCKET_REGION")
                .map_err(|_| StorageError::config_error("BUCKET_REGION not set"))?,
            access_key_id: std::env::var("AMAZON_ACCESS_KEY").ok(),
            secret_access_key: std::env::var("AMAZON_SECRET_ACCESS_KEY").ok(),
        })
    }
}

/// S3 object store client.
#[derive(Clone)]
pub struct S3Client {
    client: Client,
}

impl S3Client {
    /// Create a new client from configuration.
    ///
    /// Uses static credentials when both keys are configured, otherwise
    /// the default provider chain (instance/task role).
    pub async fn new(config: S3Config) -> StorageResult<Self> {
        let region = Region::new(config.region.clone());

        let client = match (&config.access_key_id, &config.secret_access_key) {
            (Some(access_key), Some(secret_key)) => {
                let credentials =
                    Credentials::new(access_key, secret_key, None, None, "vodforge-env");
                let sdk_config = Builder::new()
                    .behavior_version(BehaviorVersion::latest())
                    .region(region)
                    .credentials_provider(credentials)
                    .build();
                Client::from_conf(sdk_config)
            }
            _ => {
                let sdk_config = aws_config::defaults(BehaviorVersion::latest())
                    .region(region)
                    .load()
                    .await;
                Client::new(&sdk_config)
            }
        };

        Ok(Self { client })
    }

    /// Create from environment variables.
    pub async fn from_env() -> StorageResult<Self> {
        let config = S3Config::from_env()?;
        Self::new(config).await
    }

    /// Issue a presigned upload handle for a single object.
    pub async fn presign_put(
        &self,
        key: &str,
        bucket: &str,
        content_type: &str,
        expires_in: Duration,
    ) -> StorageResult<String> {
        validate(key, bucket)?;

        let presign_config = PresigningConfig::expires_in(expires_in)
            .map_err(|e| StorageError::presign_failed(e.to_string()))?;

        let presigned = self
            .client
            .put_object()
            .bucket(bucket)
            .key(key)
            .content_type(content_type)
            .presigned(presign_config)
            .await
            .map_err(|e| StorageError::presign_failed(e.to_string()))?;

        debug!(bucket, key, "Issued upload handle");
        Ok(presigned.uri().to_string())
    }

    /// Issue a presigned download handle for a single object.
    pub async fn presign_get(
        &self,
        key: &str,
        bucket: &str,
        expires_in: Duration,
    ) -> StorageResult<String> {
        validate(key, bucket)?;

        let presign_config = PresigningConfig::expires_in(expires_in)
            .map_err(|e| StorageError::presign_failed(e.to_string()))?;

        let presigned = self
            .client
            .get_object()
            .bucket(bucket)
            .key(key)
            .presigned(presign_config)
            .await
            .map_err(|e| StorageError::presign_failed(e.to_string()))?;

        debug!(bucket, key, "Issued download handle");
        Ok(presigned.uri().to_string())
    }

    /// Upload a local file.
    pub async fn put_object(
        &self,
        path: impl AsRef<Path>,
        key: &str,
        bucket: &str,
        content_type: &str,
    ) -> StorageResult<()> {
        validate(key, bucket)?;

        let path = path.as_ref();
        debug!(path = %path.display(), bucket, key, "Uploading object");

        let body = ByteStream::from_path(path)
            .await
            .map_err(|e| StorageError::upload_failed(e.to_string()))?;

        self.client
            .put_object()
            .bucket(bucket)
            .key(key)
            .body(body)
            .content_type(content_type)
            .send()
            .await
            .map_err(|e| StorageError::upload_failed(e.to_string()))?;

        Ok(())
    }

    /// Delete an object.
    pub async fn delete_object(&self, key: &str, bucket: &str) -> StorageResult<()> {
        validate(key, bucket)?;

        self.client
            .delete_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| StorageError::delete_failed(e.to_string()))?;

        info!(bucket, key, "Deleted object");
        Ok(())
    }

    /// Check connectivity by performing a head-bucket operation.
    pub async fn check_connectivity(&self, bucket: &str) -> StorageResult<()> {
        if bucket.is_empty() {
            return Err(StorageError::InvalidBucket("bucket is empty".to_string()));
        }

        self.client
            .head_bucket()
            .bucket(bucket)
            .send()
            .await
            .map_err(|e| StorageError::AwsSdk(format!("S3 connectivity check failed: {}", e)))?;
        Ok(())
    }
}

/// Reject empty keys and buckets before any network call.
fn validate(key: &str, bucket: &str) -> StorageResult<()> {
    if key.is_empty() {
        return Err(StorageError::InvalidKey("key is empty".to_string()));
    }
    if bucket.is_empty() {
        return Err(StorageError::InvalidBucket("bucket is empty".to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> S3Config {
        S3Config {
            region: "ap-south-1".to_string(),
            access_key_id: Some("test-access-key".to_string()),
            secret_access_key: Some("test-secret-key".to_string()),
        }
    }

    #[tokio::test]
    async fn test_empty_key_fails_before_network() {
        let client = S3Client::new(test_config()).await.unwrap();

        let err = client
            .presign_get("", "bucket", DOWNLOAD_HANDLE_TTL)
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::InvalidKey(_)));

        let err = client.delete_object("", "bucket").await.unwrap_err();
        assert!(matches!(err, StorageError::InvalidKey(_)));
    }

    #[tokio::test]
    async fn test_empty_bucket_fails_before_network() {
        let client = S3Client::new(test_config()).await.unwrap();

        let err = client
            .presign_put("uploads/video-x.mp4", "", "video/mp4", UPLOAD_HANDLE_TTL)
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::InvalidBucket(_)));
    }

    #[tokio::test]
    async fn test_presign_get_produces_signed_url() {
        let client = S3Client::new(test_config()).await.unwrap();

        let url = client
            .presign_get("uploads/video-abc.mp4", "source-bucket", SOURCE_FETCH_TTL)
            .await
            .unwrap();

        assert!(url.contains("source-bucket"));
        assert!(url.contains("uploads/video-abc.mp4"));
        assert!(url.contains("X-Amz-Signature"));
        assert!(url.contains("X-Amz-Expires=7200"));
    }
}
