//! Worker configuration.
//!
//! Every parameter is injected through the environment by the dispatcher
//! and read exactly once at startup; nothing here is consulted again
//! after construction.

use std::path::PathBuf;

use tracing::info;

use vod_models::JobId;

use crate::error::{WorkerError, WorkerResult};

/// Worker configuration.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Job correlation identifier
    pub video_id: JobId,
    /// Presigned URL for the source media
    pub source_url: String,
    /// Bucket receiving the rendition set
    pub output_bucket: String,
    /// CDN base URL for the playback link
    pub cdn_base_url: String,
    /// Façade base URL the playback link is reported to
    pub callback_url: String,
    /// AWS region
    pub region: String,
    /// Static access key; falls back to the default provider chain when absent
    pub access_key_id: Option<String>,
    /// Static secret key; falls back to the default provider chain when absent
    pub secret_access_key: Option<String>,
    /// Root directory for scratch storage
    pub work_dir: PathBuf,
}

impl WorkerConfig {
    /// Create config from environment variables.
    pub fn from_env() -> WorkerResult<Self> {
        let require = |name: &str| {
            std::env::var(name)
                .ok()
                .filter(|v| !v.is_empty())
                .ok_or_else(|| WorkerError::config_error(format!("{name} not set")))
        };

        Ok(Self {
            video_id: JobId::from_string(require("VIDEO_ID")?),
            source_url: require("SOURCE_URL")?,
            output_bucket: require("OUTPUT_BUCKET")?,
            cdn_base_url: require("CDN_BASE_URL")?,
            callback_url: require("CALLBACK_URL")?,
            region: require("BUCKET_REGION")?,
            access_key_id: std::env::var("AMAZON_ACCESS_KEY").ok(),
            secret_access_key: std::env::var("AMAZON_SECRET_ACCESS_KEY").ok(),
            work_dir: std::env::var("WORKER_WORK_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("/tmp/vodforge")),
        })
    }

    /// Scratch directory for this job.
    pub fn scratch_dir(&self) -> PathBuf {
        self.work_dir.join(self.video_id.as_str())
    }

    /// Log the injected parameters. Credentials are never logged.
    pub fn log_environment(&self) {
        info!(
            video_id = %self.video_id,
            output_bucket = %self.output_bucket,
            cdn_base_url = %self.cdn_base_url,
            callback_url = %self.callback_url,
            region = %self.region,
            work_dir = %self.work_dir.display(),
            "Worker environment"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scratch_dir_is_scoped_to_job() {
        let config = WorkerConfig {
            video_id: JobId::from("video-abc123"),
            source_url: "https://signed.example.com/src".to_string(),
            output_bucket: "hls-out".to_string(),
            cdn_base_url: "https://cdn.example.com".to_string(),
            callback_url: "https://api.example.com".to_string(),
            region: "ap-south-1".to_string(),
            access_key_id: None,
            secret_access_key: None,
            work_dir: PathBuf::from("/tmp/vodforge"),
        };
        assert_eq!(config.scratch_dir(), PathBuf::from("/tmp/vodforge/video-abc123"));
    }
}
