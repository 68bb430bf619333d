//! Object key layout and playback URLs.
//!
//! Source uploads land under `uploads/video-{id}.mp4`; transcoded output
//! lives under `{jobId}/{rendition}/...` with the master playlist at
//! `{jobId}/master.m3u8`.

use uuid::Uuid;

use crate::job::JobId;

/// Filename of the master playlist within a job's output prefix.
pub const MASTER_PLAYLIST: &str = "master.m3u8";

/// Key prefix for client source uploads.
pub const UPLOAD_PREFIX: &str = "uploads";

/// Generate a fresh upload key for a client source video.
pub fn generate_upload_key() -> String {
    format!("{}/video-{}.mp4", UPLOAD_PREFIX, Uuid::new_v4())
}

/// Destination key for one file of a job's rendition set.
///
/// `relative` is the path of the file within the transcode output
/// directory; separators are normalized to forward slashes.
pub fn output_key(job_id: &JobId, relative: &str) -> String {
    let relative = relative.replace('\\', "/");
    format!("{}/{}", job_id, relative.trim_start_matches('/'))
}

/// The playback URL for a completed job.
pub fn playback_url(cdn_base_url: &str, job_id: &JobId) -> String {
    format!(
        "{}/{}/{}",
        cdn_base_url.trim_end_matches('/'),
        job_id,
        MASTER_PLAYLIST
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_upload_key_round_trips_to_job_id() {
        let key = generate_upload_key();
        assert!(key.starts_with("uploads/video-"));
        assert!(key.ends_with(".mp4"));

        let id = JobId::from_object_key(&key).unwrap();
        assert!(id.as_str().starts_with("video-"));
        assert!(!id.as_str().contains('.'));
    }

    #[test]
    fn test_output_key_layout() {
        let id = JobId::from("video-abc123");
        assert_eq!(
            output_key(&id, "360p/playlist.m3u8"),
            "video-abc123/360p/playlist.m3u8"
        );
        assert_eq!(output_key(&id, "master.m3u8"), "video-abc123/master.m3u8");
    }

    #[test]
    fn test_output_key_normalizes_separators() {
        let id = JobId::from("video-abc123");
        assert_eq!(
            output_key(&id, "720p\\segment-000.ts"),
            "video-abc123/720p/segment-000.ts"
        );
    }

    #[test]
    fn test_playback_url_trims_trailing_slash() {
        let id = JobId::from("video-abc123");
        assert_eq!(
            playback_url("https://cdn.example.com/", &id),
            "https://cdn.example.com/video-abc123/master.m3u8"
        );
        assert_eq!(
            playback_url("https://cdn.example.com", &id),
            "https://cdn.example.com/video-abc123/master.m3u8"
        );
    }
}
