//! S3 object store gateway.
//!
//! This crate provides:
//! - Time-limited presigned upload/download handles
//! - Direct object upload and deletion
//! - Content-type inference for HLS artifacts
//!
//! Every operation validates its key and bucket before touching the
//! network.

pub mod client;
pub mod content_type;
pub mod error;

pub use client::{
    S3Client, S3Config, DOWNLOAD_HANDLE_TTL, SOURCE_FETCH_TTL, UPLOAD_HANDLE_TTL,
};
pub use content_type::{content_type_for_key, content_type_for_path};
pub use error::{StorageError, StorageResult};
