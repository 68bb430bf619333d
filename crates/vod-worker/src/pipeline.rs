//! The transcode pipeline.
//!
//! Stages run strictly in sequence; the first failure aborts the rest.
//! Cleanup is not a stage — the binary invokes it unconditionally after
//! `run` returns, success or not.

use std::path::PathBuf;

use reqwest::Client;
use tracing::{info, warn};

use vod_media::{probe_video, transcode_to_hls, write_master_playlist};
use vod_models::{playback_url, RenditionLadder};
use vod_registry::{RegistryClient, RegistryError};
use vod_storage::{S3Client, S3Config};

use crate::config::WorkerConfig;
use crate::download::download_source;
use crate::error::WorkerResult;
use crate::logging::JobLogger;
use crate::upload::upload_rendition_set;

/// One job's pipeline, built once from the injected configuration.
pub struct TranscodePipeline {
    config: WorkerConfig,
    storage: S3Client,
    registry: RegistryClient,
    http: Client,
    ladder: RenditionLadder,
    logger: JobLogger,
}

impl TranscodePipeline {
    /// Build the pipeline and its collaborators.
    pub async fn new(config: WorkerConfig) -> WorkerResult<Self> {
        let storage = S3Client::new(S3Config {
            region: config.region.clone(),
            access_key_id: config.access_key_id.clone(),
            secret_access_key: config.secret_access_key.clone(),
        })
        .await?;

        let registry = RegistryClient::new(&config.callback_url)?;

        let http = Client::builder()
            .connect_timeout(std::time::Duration::from_secs(10))
            .build()
            .map_err(vod_registry::RegistryError::from)?;

        let logger = JobLogger::new(&config.video_id);

        Ok(Self {
            config,
            storage,
            registry,
            http,
            ladder: RenditionLadder::default(),
            logger,
        })
    }

    /// Run the pipeline to completion, returning the playback URL.
    pub async fn run(&self) -> WorkerResult<String> {
        let scratch = self.config.scratch_dir();
        let input = scratch.join("input.mp4");
        let output_dir = scratch.join("output");

        self.logger.stage_started("download");
        download_source(&self.http, &self.config.source_url, &input).await?;
        self.logger.stage_completed("download");

        let info = probe_video(&input).await?;
        self.logger.progress(
            "probe",
            &format!(
                "Source: {}x{} {} {:.1}s",
                info.width, info.height, info.codec, info.duration
            ),
        );

        self.logger.stage_started("transcode");
        transcode_to_hls(&input, &output_dir, &self.ladder).await?;
        write_master_playlist(&output_dir, &self.ladder).await?;
        self.logger.stage_completed("transcode");

        self.logger.stage_started("upload");
        let summary = upload_rendition_set(
            &self.storage,
            &output_dir,
            &self.config.video_id,
            &self.config.output_bucket,
            &self.logger,
        )
        .await?;
        self.logger.progress(
            "upload",
            &format!("Uploaded {} files ({} failed)", summary.uploaded, summary.failed),
        );
        self.logger.stage_completed("upload");

        let playback = playback_url(&self.config.cdn_base_url, &self.config.video_id);

        self.logger.stage_started("finalize");
        match self
            .registry
            .create_link(self.config.video_id.as_str(), &playback)
            .await
        {
            Ok(_) => {}
            // A duplicate delivery already recorded this link; the record
            // is immutable and correct.
            Err(RegistryError::Conflict(_)) => {
                warn!(video_id = %self.config.video_id, "Playback link already recorded");
            }
            Err(e) => return Err(e.into()),
        }
        self.logger.stage_completed("finalize");

        info!(playback_url = %playback, "Processing complete");
        Ok(playback)
    }

    /// Remove all scratch storage for this job.
    ///
    /// Invoked on both success and failure paths; errors are logged, not
    /// propagated, so cleanup never masks the pipeline result.
    pub async fn cleanup(&self) {
        let scratch = self.config.scratch_dir();
        match tokio::fs::remove_dir_all(&scratch).await {
            Ok(()) => info!(path = %scratch.display(), "Cleanup completed"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!(path = %scratch.display(), error = %e, "Cleanup failed"),
        }
    }

    /// The scratch directory this pipeline works in.
    pub fn scratch_dir(&self) -> PathBuf {
        self.config.scratch_dir()
    }
}
