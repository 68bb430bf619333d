//! Rendition set upload.
//!
//! Every file under the transcode output directory is uploaded under the
//! job's key prefix. Per-file failures are counted and logged without
//! aborting the batch; the job fails only when nothing uploaded at all.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::warn;

use vod_models::{output_key, JobId};
use vod_storage::{content_type_for_path, S3Client, StorageResult};

use crate::error::{WorkerError, WorkerResult};
use crate::logging::JobLogger;

/// Destination for uploaded files.
#[async_trait]
pub trait ObjectSink: Send + Sync {
    async fn put_file(
        &self,
        path: &Path,
        key: &str,
        bucket: &str,
        content_type: &str,
    ) -> StorageResult<()>;
}

#[async_trait]
impl ObjectSink for S3Client {
    async fn put_file(
        &self,
        path: &Path,
        key: &str,
        bucket: &str,
        content_type: &str,
    ) -> StorageResult<()> {
        self.put_object(path, key, bucket, content_type).await
    }
}

/// Outcome of one upload batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadSummary {
    pub uploaded: u32,
    pub failed: u32,
}

/// Upload every file under `output_dir` to `bucket` under the job prefix.
pub async fn upload_rendition_set(
    sink: &dyn ObjectSink,
    output_dir: &Path,
    job_id: &JobId,
    bucket: &str,
    logger: &JobLogger,
) -> WorkerResult<UploadSummary> {
    let files = collect_files(output_dir).await?;
    logger.progress("upload", &format!("Found {} files to upload", files.len()));

    let mut summary = UploadSummary {
        uploaded: 0,
        failed: 0,
    };

    for file in &files {
        let relative = file
            .strip_prefix(output_dir)
            .unwrap_or(file)
            .to_string_lossy();
        let key = output_key(job_id, &relative);
        let content_type = content_type_for_path(file);

        match sink.put_file(file, &key, bucket, content_type).await {
            Ok(()) => summary.uploaded += 1,
            Err(e) => {
                summary.failed += 1;
                warn!(key = %key, error = %e, "File upload failed");
            }
        }
    }

    if summary.failed > 0 {
        logger.warning(
            "upload",
            &format!(
                "{} of {} files failed to upload",
                summary.failed,
                files.len()
            ),
        );
    }

    if summary.uploaded == 0 && summary.failed > 0 {
        return Err(WorkerError::upload_failed(format!(
            "all {} files failed to upload",
            summary.failed
        )));
    }

    Ok(summary)
}

/// Recursively collect every file under `dir`, in stable order.
async fn collect_files(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    let mut pending = vec![dir.to_path_buf()];

    while let Some(current) = pending.pop() {
        let mut entries = tokio::fs::read_dir(&current).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if entry.file_type().await?.is_dir() {
                pending.push(path);
            } else {
                files.push(path);
            }
        }
    }

    files.sort();
    Ok(files)
}
