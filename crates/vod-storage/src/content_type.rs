//! Content-type inference for HLS artifacts.

use std::path::Path;

/// Content type for a destination key, inferred from its extension.
pub fn content_type_for_key(key: &str) -> &'static str {
    match key.rsplit_once('.').map(|(_, ext)| ext.to_ascii_lowercase()) {
        Some(ext) if ext == "m3u8" => "application/vnd.apple.mpegurl",
        Some(ext) if ext == "ts" => "video/mp2t",
        Some(ext) if ext == "mp4" => "video/mp4",
        _ => "application/octet-stream",
    }
}

/// Content type for a local file path.
pub fn content_type_for_path(path: impl AsRef<Path>) -> &'static str {
    content_type_for_key(&path.as_ref().to_string_lossy())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manifest_type() {
        assert_eq!(
            content_type_for_key("video-abc/master.m3u8"),
            "application/vnd.apple.mpegurl"
        );
        assert_eq!(
            content_type_for_key("video-abc/360p/playlist.M3U8"),
            "application/vnd.apple.mpegurl"
        );
    }

    #[test]
    fn test_segment_type() {
        assert_eq!(
            content_type_for_key("video-abc/720p/segment-001.ts"),
            "video/mp2t"
        );
    }

    #[test]
    fn test_source_type() {
        assert_eq!(content_type_for_key("uploads/video-abc.mp4"), "video/mp4");
    }

    #[test]
    fn test_default_type() {
        assert_eq!(content_type_for_key("notes.txt"), "application/octet-stream");
        assert_eq!(content_type_for_key("no-extension"), "application/octet-stream");
    }
}
