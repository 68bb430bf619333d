//! HLS rendition ladder description.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Default video codec (H.264)
pub const DEFAULT_VIDEO_CODEC: &str = "libx264";
/// Default audio codec
pub const DEFAULT_AUDIO_CODEC: &str = "aac";
/// Default encoding preset
pub const DEFAULT_PRESET: &str = "slow";
/// Default CRF (Constant Rate Factor)
pub const DEFAULT_CRF: u8 = 22;
/// Audio sample rate for all renditions
pub const AUDIO_SAMPLE_RATE: u32 = 48_000;
/// Default media segment duration in seconds
pub const DEFAULT_SEGMENT_SECONDS: u32 = 3;

/// One bitrate/resolution variant of the source video.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Rendition {
    /// Variant name, used as the output sub-directory (e.g. "720p")
    pub name: String,

    /// Output width in pixels
    pub width: u32,

    /// Output height in pixels
    pub height: u32,

    /// Peak video bitrate in kbit/s
    pub video_maxrate_kbps: u32,

    /// Audio bitrate in kbit/s
    pub audio_bitrate_kbps: u32,
}

impl Rendition {
    pub fn new(
        name: impl Into<String>,
        width: u32,
        height: u32,
        video_maxrate_kbps: u32,
        audio_bitrate_kbps: u32,
    ) -> Self {
        Self {
            name: name.into(),
            width,
            height,
            video_maxrate_kbps,
            audio_bitrate_kbps,
        }
    }

    /// Peak bandwidth in bit/s as declared in the master playlist.
    ///
    /// Video maxrate plus audio bitrate, with 10% container overhead.
    pub fn bandwidth(&self) -> u64 {
        u64::from(self.video_maxrate_kbps + self.audio_bitrate_kbps) * 1100
    }

    /// RESOLUTION attribute value for the master playlist.
    pub fn resolution(&self) -> String {
        format!("{}x{}", self.width, self.height)
    }

    /// Relative path of this rendition's media playlist.
    pub fn playlist_path(&self) -> String {
        format!("{}/playlist.m3u8", self.name)
    }
}

/// The set of renditions one transcode run produces, plus shared
/// encoding settings.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct RenditionLadder {
    /// Renditions in master-playlist declaration order
    pub renditions: Vec<Rendition>,

    /// Media segment duration in seconds
    pub segment_seconds: u32,

    /// Constant Rate Factor (quality, lower is better)
    pub crf: u8,

    /// Encoding preset
    pub preset: String,
}

impl Default for RenditionLadder {
    fn default() -> Self {
        Self {
            renditions: vec![
                Rendition::new("360p", 480, 360, 600, 64),
                Rendition::new("480p", 640, 480, 900, 128),
                Rendition::new("720p", 1280, 720, 1400, 128),
            ],
            segment_seconds: DEFAULT_SEGMENT_SECONDS,
            crf: DEFAULT_CRF,
            preset: DEFAULT_PRESET.to_string(),
        }
    }
}

impl RenditionLadder {
    /// The `-var_stream_map` value pairing each video/audio stream with
    /// its rendition name.
    pub fn var_stream_map(&self) -> String {
        self.renditions
            .iter()
            .enumerate()
            .map(|(i, r)| format!("v:{i},a:{i},name:{}", r.name))
            .collect::<Vec<_>>()
            .join(" ")
    }
}
