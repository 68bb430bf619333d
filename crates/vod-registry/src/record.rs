//! Playback link records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One persisted playback link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkRecord {
    /// Job correlation identifier (unique key)
    pub video_id: String,

    /// Final playback URL
    pub video_link: String,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl LinkRecord {
    pub fn new(video_id: impl Into<String>, video_link: impl Into<String>) -> Self {
        Self {
            video_id: video_id.into(),
            video_link: video_link.into(),
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_field_names() {
        let record = LinkRecord::new("video-abc123", "https://cdn.example.com/video-abc123/master.m3u8");
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["videoId"], "video-abc123");
        assert_eq!(
            json["videoLink"],
            "https://cdn.example.com/video-abc123/master.m3u8"
        );
        assert!(json.get("createdAt").is_some());
    }
}
