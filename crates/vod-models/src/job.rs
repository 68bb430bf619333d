//! Job correlation identifier and transcode job parameters.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::keys::playback_url;

/// Errors that can occur when deriving a job identifier.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum JobIdError {
    #[error("Object key is empty")]
    EmptyKey,

    #[error("Object key has no usable filename: {0}")]
    EmptyStem(String),
}

/// Identifier tying one upload to its worker dispatch and playback record.
///
/// Derived deterministically from the storage object key: the key's
/// filename with its extension stripped. The same value names the upload
/// key, the worker's output prefix, and the registry lookup key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct JobId(pub String);

impl JobId {
    /// Derive the job identifier from a storage object key.
    ///
    /// `uploads/video-abc123.mp4` -> `video-abc123`
    pub fn from_object_key(key: &str) -> Result<Self, JobIdError> {
        if key.is_empty() {
            return Err(JobIdError::EmptyKey);
        }

        let filename = key.rsplit('/').next().unwrap_or(key);
        let stem = match filename.rsplit_once('.') {
            Some((stem, _ext)) => stem,
            None => filename,
        };

        if stem.is_empty() {
            return Err(JobIdError::EmptyStem(key.to_string()));
        }

        Ok(Self(stem.to_string()))
    }

    /// Create from an existing string.
    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Get the inner string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for JobId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for JobId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Parameter set for one transcode worker execution.
///
/// Created at dispatch time, owned exclusively by the worker process for
/// its lifetime.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct TranscodeJob {
    /// Job correlation identifier
    pub job_id: JobId,

    /// Presigned URL the worker downloads the source from
    pub source_url: String,

    /// Bucket receiving the segmented output
    pub output_bucket: String,

    /// CDN base URL the playback link is built from
    pub cdn_base_url: String,
}

impl TranscodeJob {
    /// The playback URL this job resolves to once its output is uploaded.
    pub fn playback_url(&self) -> String {
        playback_url(&self.cdn_base_url, &self.job_id)
    }
}
