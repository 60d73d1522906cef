//! Download worker loop.
//!
//! A worker claims jobs until the queue is empty or shutdown was
//! requested, preparing the destination and running the transfer under
//! the coordinator's time budget.

use std::io::ErrorKind;
use std::path::Path;
use std::sync::Arc;

use tokio::time::timeout;
use tracing::{debug, error, warn};

use patchsync_core::{DownloadJob, TransferError};

use super::Shared;

pub(super) async fn run_worker(id: usize, shared: Arc<Shared>) {
    debug!(worker = id, "Download worker started");

    while let Some(job) = shared.claim().await {
        match run_job(&shared, &job).await {
            Ok(bytes) => {
                debug!(
                    worker = id,
                    url = %job.url,
                    path = %job.destination.display(),
                    bytes,
                    "Downloaded"
                );
            }
            Err(e) => {
                error!(
                    worker = id,
                    url = %job.url,
                    path = %job.destination.display(),
                    error = %e,
                    "Download failed"
                );
                shared.record_failure();
            }
        }
        shared.record_completion().await;
    }

    debug!(worker = id, "Download worker exiting");
}

async fn run_job(shared: &Shared, job: &DownloadJob) -> Result<u64, TransferError> {
    prepare_destination(&job.destination).await?;

    match timeout(shared.timeout, shared.transfer.transfer(&job.url, &job.destination)).await {
        Ok(result) => result,
        Err(_) => {
            remove_stale(&job.destination).await.ok();
            Err(TransferError::Timeout {
                seconds: shared.timeout.as_secs(),
            })
        }
    }
}

/// Clear any stale file and make sure the parent directories exist.
async fn prepare_destination(path: &Path) -> Result<(), TransferError> {
    remove_stale(path).await?;
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| TransferError::from_io_error(&e))?;
    }
    Ok(())
}

async fn remove_stale(path: &Path) -> Result<(), TransferError> {
    match tokio::fs::remove_file(path).await {
        Ok(()) => {
            warn!(path = %path.display(), "Removed stale file before download");
            Ok(())
        }
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(TransferError::from_io_error(&e)),
    }
}
