//! Link store contract and in-memory implementation.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::info;

use crate::error::{RegistryError, RegistryResult};
use crate::record::LinkRecord;

/// The registry contract: create-once, read-many.
#[async_trait]
pub trait LinkStore: Send + Sync {
    /// Persist a new link. Fails with `Conflict` if the id already has one.
    async fn create(&self, video_id: &str, video_link: &str) -> RegistryResult<LinkRecord>;

    /// Look up a link. Fails with `NotFound` if absent.
    async fn get(&self, video_id: &str) -> RegistryResult<LinkRecord>;
}

/// In-memory link store backing the façade.
///
/// The uniqueness check on the identifier is the only write-side guard
/// the pipeline relies on (an at-most-once-create barrier).
#[derive(Default)]
pub struct MemoryLinkStore {
    records: RwLock<HashMap<String, LinkRecord>>,
}

impl MemoryLinkStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LinkStore for MemoryLinkStore {
    async fn create(&self, video_id: &str, video_link: &str) -> RegistryResult<LinkRecord> {
        if video_id.is_empty() || video_link.is_empty() {
            return Err(RegistryError::validation("videoId and videoLink are required"));
        }

        let mut records = self.records.write().await;
        if records.contains_key(video_id) {
            return Err(RegistryError::conflict(video_id));
        }

        let record = LinkRecord::new(video_id, video_link);
        records.insert(video_id.to_string(), record.clone());

        info!(video_id, "Created playback link record");
        Ok(record)
    }

    async fn get(&self, video_id: &str) -> RegistryResult<LinkRecord> {
        let records = self.records.read().await;
        records
            .get(video_id)
            .cloned()
            .ok_or_else(|| RegistryError::not_found(video_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_then_get() {
        let store = MemoryLinkStore::new();
        let created = store
            .create("video-abc123", "https://cdn.example.com/video-abc123/master.m3u8")
            .await
            .unwrap();

        let fetched = store.get("video-abc123").await.unwrap();
        assert_eq!(created, fetched);
    }

    #[tokio::test]
    async fn test_duplicate_create_conflicts() {
        let store = MemoryLinkStore::new();
        store.create("video-abc123", "https://cdn/a").await.unwrap();

        let err = store.create("video-abc123", "https://cdn/b").await.unwrap_err();
        assert!(matches!(err, RegistryError::Conflict(_)));

        // The original record is untouched
        let record = store.get("video-abc123").await.unwrap();
        assert_eq!(record.video_link, "https://cdn/a");
    }

    #[tokio::test]
    async fn test_get_absent_is_not_found() {
        let store = MemoryLinkStore::new();
        let err = store.get("video-missing").await.unwrap_err();
        assert!(matches!(err, RegistryError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_empty_input_rejected() {
        let store = MemoryLinkStore::new();
        assert!(matches!(
            store.create("", "https://cdn/a").await.unwrap_err(),
            RegistryError::Validation(_)
        ));
        assert!(matches!(
            store.create("video-x", "").await.unwrap_err(),
            RegistryError::Validation(_)
        ));
    }
}
