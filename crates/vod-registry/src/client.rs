//! HTTP registry client.
//!
//! Used by transcode workers to report the playback link back through
//! the façade's link-creation endpoint.

use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{RegistryError, RegistryResult};
use crate::record::LinkRecord;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateLinkRequest<'a> {
    video_id: &'a str,
    video_link: &'a str,
}

#[derive(Debug, Deserialize)]
struct LinkEnvelope {
    link: LinkRecord,
}

/// Client for the façade's registry endpoints.
#[derive(Clone)]
pub struct RegistryClient {
    http: Client,
    base_url: String,
}

impl RegistryClient {
    /// Create a new client for the façade at `base_url`.
    pub fn new(base_url: impl Into<String>) -> RegistryResult<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(5))
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Report a freshly produced playback link.
    pub async fn create_link(&self, video_id: &str, video_link: &str) -> RegistryResult<LinkRecord> {
        let url = format!("{}/api/v1/upload/upload-video-link", self.base_url);
        debug!(video_id, "Reporting playback link");

        let response = self
            .http
            .post(&url)
            .json(&CreateLinkRequest { video_id, video_link })
            .send()
            .await?;

        match response.status() {
            StatusCode::CREATED | StatusCode::OK => {
                let envelope: LinkEnvelope = response.json().await?;
                info!(video_id, "Playback link recorded");
                Ok(envelope.link)
            }
            StatusCode::CONFLICT => Err(RegistryError::conflict(video_id)),
            StatusCode::BAD_REQUEST => {
                Err(RegistryError::validation(read_message(response).await))
            }
            status => Err(RegistryError::Unexpected(format!(
                "link creation returned {}: {}",
                status,
                read_message(response).await
            ))),
        }
    }

    /// Fetch the link for a job, if it exists yet.
    pub async fn get_link(&self, video_id: &str) -> RegistryResult<LinkRecord> {
        let url = format!("{}/api/v1/upload/video-link/{}", self.base_url, video_id);

        let response = self.http.get(&url).send().await?;

        match response.status() {
            StatusCode::OK => {
                let envelope: LinkEnvelope = response.json().await?;
                Ok(envelope.link)
            }
            StatusCode::NOT_FOUND => Err(RegistryError::not_found(video_id)),
            status => Err(RegistryError::Unexpected(format!(
                "link lookup returned {}: {}",
                status,
                read_message(response).await
            ))),
        }
    }
}

async fn read_message(response: reqwest::Response) -> String {
    response.text().await.unwrap_or_default()
}
