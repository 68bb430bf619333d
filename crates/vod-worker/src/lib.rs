//! Transcode worker.
//!
//! One process per job, statically parameterized through the container
//! environment. The pipeline is strictly sequential: download, probe,
//! transcode, master playlist, upload, report. Scratch storage is
//! removed on both success and failure paths.

pub mod config;
pub mod download;
pub mod error;
pub mod logging;
pub mod pipeline;
pub mod upload;

pub use config::WorkerConfig;
pub use error::{WorkerError, WorkerResult};
pub use logging::JobLogger;
pub use pipeline::TranscodePipeline;
pub use upload::{upload_rendition_set, ObjectSink, UploadSummary};
