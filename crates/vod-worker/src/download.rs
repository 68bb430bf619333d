//! Source media download.

use std::path::Path;

use reqwest::Client;
use tokio::io::AsyncWriteExt;
use tracing::info;

use crate::error::{WorkerError, WorkerResult};

/// Stream the source media from `url` to `dest`.
///
/// The body is written chunk by chunk so arbitrarily large sources never
/// buffer in memory.
pub async fn download_source(client: &Client, url: &str, dest: &Path) -> WorkerResult<()> {
    if let Some(parent) = dest.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }

    let mut response = client
        .get(url)
        .send()
        .await
        .map_err(|e| WorkerError::download_failed(e.to_string()))?
        .error_for_status()
        .map_err(|e| WorkerError::download_failed(e.to_string()))?;

    let mut file = tokio::fs::File::create(dest).await?;
    let mut bytes_written: u64 = 0;

    while let Some(chunk) = response
        .chunk()
        .await
        .map_err(|e| WorkerError::download_failed(e.to_string()))?
    {
        file.write_all(&chunk).await?;
        bytes_written += chunk.len() as u64;
    }

    file.flush().await?;

    info!(
        path = %dest.display(),
        bytes = bytes_written,
        "Source download completed"
    );
    Ok(())
}
