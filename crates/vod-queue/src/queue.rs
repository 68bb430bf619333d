//! Upload-event queue over SQS.

use aws_config::BehaviorVersion;
use aws_credential_types::Credentials;
use aws_sdk_sqs::config::Region;
use aws_sdk_sqs::Client;
use tracing::debug;

use crate::error::{QueueError, QueueResult};

/// Queue configuration.
#[derive(Debug, Clone)]
pub struct QueueConfig {
    /// Queue URL
    pub queue_url: String,
    /// AWS region
    pub region: String,
    /// Static access key; falls back to the default provider chain when absent
    pub access_key_id: Option<String>,
    /// Static secret key; falls back to the default provider chain when absent
    pub secret_access_key: Option<String>,
    /// Max messages per receive call
    pub max_messages: i32,
    /// Server-side long-poll wait in seconds
    pub wait_time_seconds: i32,
}

impl QueueConfig {
    /// Create config from environment variables.
    pub fn from_env() -> QueueResult<Self> {
        Ok(Self {
            queue_url: std::env::var("QUEUE_URL")
                .map_err(|_| QueueError::config_error("QUEUE_URL not set"))?,
            region: std::env::var("BUCKET_REGION")
                .map_err(|_| QueueError::config_error("BUCKET_REGION not set"))?,
            access_key_id: std::env::var("AMAZON_ACCESS_KEY").ok(),
            secret_access_key: std::env::var("AMAZON_SECRET_ACCESS_KEY").ok(),
            max_messages: std::env::var("QUEUE_MAX_MESSAGES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(1),
            wait_time_seconds: std::env::var("QUEUE_WAIT_SECONDS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(10),
        })
    }
}

/// One received queue message: the raw body plus the receipt handle used
/// to acknowledge it.
#[derive(Debug, Clone)]
pub struct ReceivedMessage {
    pub body: Option<String>,
    pub receipt_handle: Option<String>,
}

/// Upload-event queue client.
#[derive(Debug, Clone)]
pub struct UploadQueue {
    client: Client,
    config: QueueConfig,
}

impl UploadQueue {
    /// Create a new queue client from configuration.
    pub async fn new(config: QueueConfig) -> QueueResult<Self> {
        if config.queue_url.is_empty() {
            return Err(QueueError::config_error("queue URL is empty"));
        }

        let region = Region::new(config.region.clone());

        let client = match (&config.access_key_id, &config.secret_access_key) {
            (Some(access_key), Some(secret_key)) => {
                let credentials =
                    Credentials::new(access_key, secret_key, None, None, "vodforge-env");
                let sdk_config = aws_sdk_sqs::config::Builder::new()
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

        Ok(Self { client, config })
    }

    /// Create from environment variables.
    pub async fn from_env() -> QueueResult<Self> {
        let config = QueueConfig::from_env()?;
        Self::new(config).await
    }

    /// Receive a batch of messages.
    ///
    /// Blocks server-side for up to the configured wait time; an empty
    /// vec means the long poll elapsed without traffic, which is not an
    /// error.
    pub async fn receive(&self) -> QueueResult<Vec<ReceivedMessage>> {
        let response = self
            .client
            .receive_message()
            .queue_url(&self.config.queue_url)
            .max_number_of_messages(self.config.max_messages)
            .wait_time_seconds(self.config.wait_time_seconds)
            .send()
            .await
            .map_err(|e| QueueError::receive_failed(e.to_string()))?;

        let messages = response
            .messages
            .unwrap_or_default()
            .into_iter()
            .map(|m| ReceivedMessage {
                body: m.body,
                receipt_handle: m.receipt_handle,
            })
            .collect::<Vec<_>>();

        debug!(count = messages.len(), "Received queue messages");
        Ok(messages)
    }

    /// Delete a message by receipt handle.
    pub async fn delete(&self, receipt_handle: &str) -> QueueResult<()> {
        if receipt_handle.is_empty() {
            return Err(QueueError::InvalidReceiptHandle(
                "receipt handle is empty".to_string(),
            ));
        }

        self.client
            .delete_message()
            .queue_url(&self.config.queue_url)
            .receipt_handle(receipt_handle)
            .send()
            .await
            .map_err(|e| QueueError::delete_failed(e.to_string()))?;

        debug!("Deleted queue message");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> QueueConfig {
        QueueConfig {
            queue_url: "https://sqs.ap-south-1.amazonaws.com/123456789/uploads".to_string(),
            region: "ap-south-1".to_string(),
            access_key_id: Some("test-access-key".to_string()),
            secret_access_key: Some("test-secret-key".to_string()),
            max_messages: 1,
            wait_time_seconds: 10,
        }
    }

    #[tokio::test]
    async fn test_empty_queue_url_rejected() {
        let config = QueueConfig {
            queue_url: String::new(),
            ..test_config()
        };
        let err = UploadQueue::new(config).await.unwrap_err();
        assert!(matches!(err, QueueError::ConfigError(_)));
    }

    #[tokio::test]
    async fn test_empty_receipt_handle_rejected() {
        let queue = UploadQueue::new(test_config()).await.unwrap();
        let err = queue.delete("").await.unwrap_err();
        assert!(matches!(err, QueueError::InvalidReceiptHandle(_)));
    }
}
