//! Shared data models for the VodForge pipeline.
//!
//! This crate provides Serde-serializable types for:
//! - Job correlation identifiers and transcode job parameters
//! - Upload-completion event notifications
//! - Object key layout and playback URLs
//! - The HLS rendition ladder

pub mod event;
pub mod job;
pub mod keys;
pub mod rendition;

// Re-export common types
pub use event::{EventError, UploadEvent};
pub use job::{JobId, JobIdError, TranscodeJob};
pub use keys::{generate_upload_key, output_key, playback_url, MASTER_PLAYLIST, UPLOAD_PREFIX};
pub use rendition::{Rendition, RenditionLadder};
