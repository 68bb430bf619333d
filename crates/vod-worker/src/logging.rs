//! Structured job logging utilities.

use tracing::{error, info, warn};

use vod_models::JobId;

/// Job logger attaching the job id and pipeline stage to every line.
#[derive(Debug, Clone)]
pub struct JobLogger {
    job_id: String,
}

impl JobLogger {
    /// Create a new logger for one job.
    pub fn new(job_id: &JobId) -> Self {
        Self {
            job_id: job_id.to_string(),
        }
    }

    /// Log the start of a pipeline stage.
    pub fn stage_started(&self, stage: &str) {
        info!(job_id = %self.job_id, stage, "Stage started");
    }

    /// Log a progress update within a stage.
    pub fn progress(&self, stage: &str, message: &str) {
        info!(job_id = %self.job_id, stage, "{}", message);
    }

    /// Log a warning within a stage.
    pub fn warning(&self, stage: &str, message: &str) {
        warn!(job_id = %self.job_id, stage, "{}", message);
    }

    /// Log a stage failure.
    pub fn failure(&self, stage: &str, message: &str) {
        error!(job_id = %self.job_id, stage, "{}", message);
    }

    /// Log the completion of a pipeline stage.
    pub fn stage_completed(&self, stage: &str) {
        info!(job_id = %self.job_id, stage, "Stage completed");
    }

    /// Get the job ID.
    pub fn job_id(&self) -> &str {
        &self.job_id
    }
}
