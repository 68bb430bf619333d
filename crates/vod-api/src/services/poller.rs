//! Queue poller.
//!
//! A single sequential loop draining the upload-event queue: parse the
//! notification, derive the job identifier, presign the worker's source
//! handle, dispatch one isolated worker, then delete the message. One
//! message's failure never reaches the next message or the loop itself.

use std::sync::Arc;
use std::time::Duration;

use metrics::counter;
use thiserror::Error;
use tracing::{debug, error, info, warn};

use vod_dispatch::{EcsDispatcher, TaskHandle};
use vod_models::{EventError, JobId, JobIdError, TranscodeJob, UploadEvent};
use vod_queue::{ReceivedMessage, UploadQueue};
use vod_storage::{S3Client, SOURCE_FETCH_TTL};

use crate::metrics::names;

/// Pipeline configuration for the poller.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Bucket sources are uploaded into
    pub upload_bucket: String,
    /// Bucket the rendition sets land in
    pub output_bucket: String,
    /// CDN base URL for playback links
    pub cdn_base_url: String,
    /// Pause after a failed receive before re-polling
    pub receive_error_backoff: Duration,
}

impl PipelineConfig {
    /// Create config from environment variables.
    pub fn from_env() -> anyhow::Result<Self> {
        let require = |name: &str| {
            std::env::var(name).map_err(|_| anyhow::anyhow!("{name} not set"))
        };

        Ok(Self {
            upload_bucket: require("BUCKET_NAME_NORMAL_UPLOAD")?,
            output_bucket: require("BUCKET_NAME_HLS_UPLOAD")?,
            cdn_base_url: require("CDN_BASE_URL")?,
            receive_error_backoff: Duration::from_secs(
                std::env::var("POLL_ERROR_BACKOFF_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(5),
            ),
        })
    }
}

/// Why a message could not be turned into a job.
#[derive(Debug, Error)]
enum MessageError {
    #[error("message has no body")]
    MissingBody,

    #[error(transparent)]
    Event(#[from] EventError),

    #[error(transparent)]
    JobId(#[from] JobIdError),
}

/// Extract the object key and job identifier from a raw message body.
fn classify_message(body: Option<&str>) -> Result<(String, JobId), MessageError> {
    let body = body.ok_or(MessageError::MissingBody)?;
    let event = UploadEvent::parse(body)?;
    let job_id = JobId::from_object_key(&event.object_key)?;
    Ok((event.object_key, job_id))
}

/// The pipeline orchestrator.
pub struct QueuePoller {
    queue: UploadQueue,
    storage: Arc<S3Client>,
    dispatcher: EcsDispatcher,
    config: PipelineConfig,
}

impl QueuePoller {
    /// Create a new poller.
    pub fn new(
        queue: UploadQueue,
        storage: Arc<S3Client>,
        dispatcher: EcsDispatcher,
        config: PipelineConfig,
    ) -> Self {
        Self {
            queue,
            storage,
            dispatcher,
            config,
        }
    }

    /// Run the polling loop. Never returns except on process shutdown.
    pub async fn run(&self) {
        info!("Starting queue polling");

        loop {
            match self.queue.receive().await {
                Ok(messages) => {
                    if messages.is_empty() {
                        debug!("No messages received, re-polling");
                        continue;
                    }
                    for message in messages {
                        self.process_message(message).await;
                    }
                }
                Err(e) => {
                    counter!(names::QUEUE_RECEIVE_FAILURES_TOTAL).increment(1);
                    error!("Error receiving messages: {}", e);
                    tokio::time::sleep(self.config.receive_error_backoff).await;
                }
            }
        }
    }

    /// Handle one received message end to end.
    async fn process_message(&self, message: ReceivedMessage) {
        counter!(names::MESSAGES_RECEIVED_TOTAL).increment(1);

        let (object_key, job_id) = match classify_message(message.body.as_deref()) {
            Ok(parsed) => parsed,
            Err(e) => {
                // Not deleted: redelivery and dead-lettering of malformed
                // messages belong to the queue's own policy
                counter!(names::MESSAGES_MALFORMED_TOTAL).increment(1);
                warn!("Skipping malformed upload event: {}", e);
                return;
            }
        };

        info!(job_id = %job_id, key = %object_key, "Processing upload event");

        match self.dispatch(&object_key, &job_id).await {
            Ok(handle) => {
                counter!(names::JOBS_DISPATCHED_TOTAL).increment(1);
                info!(job_id = %job_id, task_arn = %handle.task_arn, "Dispatched transcode job");
            }
            Err(e) => {
                counter!(names::DISPATCH_FAILURES_TOTAL).increment(1);
                error!(job_id = %job_id, "Failed to dispatch transcode job: {}", e);
            }
        }

        // Deleted once dispatch has been attempted, success or failure.
        // A dispatched-then-failed job leaves no queue record to retry
        // from (at-most-once); deleting only after the registry confirms
        // the link would trade that for duplicate dispatches.
        match message.receipt_handle.as_deref() {
            Some(handle) => match self.queue.delete(handle).await {
                Ok(()) => {
                    counter!(names::MESSAGES_DELETED_TOTAL).increment(1);
                }
                Err(e) => {
                    // Expired or already-deleted handles are not fatal
                    warn!(job_id = %job_id, "Failed to delete message: {}", e);
                }
            },
            None => warn!(job_id = %job_id, "Message has no receipt handle, nothing to delete"),
        }
    }

    /// Presign the source handle and launch a worker for one job.
    async fn dispatch(&self, object_key: &str, job_id: &JobId) -> anyhow::Result<TaskHandle> {
        let source_url = self
            .storage
            .presign_get(object_key, &self.config.upload_bucket, SOURCE_FETCH_TTL)
            .await?;

        let job = TranscodeJob {
            job_id: job_id.clone(),
            source_url,
            output_bucket: self.config.output_bucket.clone(),
            cdn_base_url: self.config.cdn_base_url.clone(),
        };

        Ok(self.dispatcher.dispatch(&job).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event_body(key: &str) -> String {
        format!(r#"{{"Records":[{{"s3":{{"object":{{"key":"{key}"}}}}}}]}}"#)
    }

    #[test]
    fn test_classify_well_formed_message() {
        let body = event_body("uploads/video-abc123.mp4");
        let (key, job_id) = classify_message(Some(&body)).unwrap();
        assert_eq!(key, "uploads/video-abc123.mp4");
        assert_eq!(job_id.as_str(), "video-abc123");
    }

    #[test]
    fn test_classify_missing_body() {
        assert!(matches!(
            classify_message(None),
            Err(MessageError::MissingBody)
        ));
    }

    #[test]
    fn test_classify_malformed_body() {
        assert!(matches!(
            classify_message(Some("not json")),
            Err(MessageError::Event(_))
        ));
        assert!(matches!(
            classify_message(Some(r#"{"Records":[]}"#)),
            Err(MessageError::Event(_))
        ));
    }

    #[test]
    fn test_classify_unusable_key() {
        let body = event_body("uploads/");
        assert!(matches!(
            classify_message(Some(&body)),
            Err(MessageError::JobId(_))
        ));
    }
}
