//! Download coordinator.
//!
//! A fixed pool of workers drains one shared FIFO queue. Every claimed job
//! is counted exactly once as completed (success or failure) and reported
//! through the progress callback with a strictly increasing count.
//!
//! # Concurrency Model
//!
//! - Queue pop happens under a single lock, so no job is claimed twice
//! - Failures are an atomic counter
//! - The completed counter and the progress callback share one lock, so
//!   callbacks observe 1..=N in order even when workers finish together
//! - Cancellation is polled before each claim; in-flight jobs finish

mod worker;

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use patchsync_core::{DownloadJob, TransferPort};

/// Counters for one download pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadSummary {
    /// Jobs claimed by a worker (succeeded or failed).
    pub attempted: usize,
    /// Jobs whose transfer failed.
    pub failed: usize,
    /// Jobs left unclaimed because of cancellation.
    pub cancelled: usize,
}

impl DownloadSummary {
    /// Jobs that completed successfully.
    pub const fn succeeded(&self) -> usize {
        self.attempted.saturating_sub(self.failed)
    }

    /// True when nothing failed and nothing was left behind.
    pub const fn is_complete(&self) -> bool {
        self.failed == 0 && self.cancelled == 0
    }
}

/// Result of [`DownloadCoordinator::run`].
#[derive(Debug)]
pub struct RunOutcome {
    /// Pass counters.
    pub summary: DownloadSummary,
    /// Jobs never claimed, in queue order.
    pub unclaimed: Vec<DownloadJob>,
}

/// State shared by every worker of one pass.
pub(crate) struct Shared {
    queue: Mutex<VecDeque<DownloadJob>>,
    completed: Mutex<usize>,
    failed: AtomicUsize,
    cancel: CancellationToken,
    transfer: Arc<dyn TransferPort>,
    timeout: Duration,
    on_progress: Box<dyn Fn(usize) + Send + Sync>,
}

impl Shared {
    async fn claim(&self) -> Option<DownloadJob> {
        if self.cancel.is_cancelled() {
            return None;
        }
        self.queue.lock().await.pop_front()
    }

    fn record_failure(&self) {
        self.failed.fetch_add(1, Ordering::SeqCst);
    }

    async fn record_completion(&self) {
        let mut completed = self.completed.lock().await;
        *completed += 1;
        (self.on_progress)(*completed);
    }
}

/// Runs download passes against a [`TransferPort`].
#[derive(Clone)]
pub struct DownloadCoordinator {
    transfer: Arc<dyn TransferPort>,
    timeout: Duration,
}

impl std::fmt::Debug for DownloadCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DownloadCoordinator")
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl DownloadCoordinator {
    /// Create a coordinator with a per-job time budget.
    pub fn new(transfer: Arc<dyn TransferPort>, timeout: Duration) -> Self {
        Self { transfer, timeout }
    }

    /// Drain `queue` with `worker_count` workers.
    ///
    /// `on_progress` receives the absolute number of finished jobs. Returns
    /// once every worker has exited. Per-job failures are counted, never
    /// propagated.
    pub async fn run<F>(
        &self,
        queue: Vec<DownloadJob>,
        worker_count: usize,
        cancel: &CancellationToken,
        on_progress: F,
    ) -> RunOutcome
    where
        F: Fn(usize) + Send + Sync + 'static,
    {
        let total = queue.len();
        let worker_count = worker_count.max(1);
        info!(jobs = total, workers = worker_count, "Starting downloads");

        let shared = Arc::new(Shared {
            queue: Mutex::new(queue.into()),
            completed: Mutex::new(0),
            failed: AtomicUsize::new(0),
            cancel: cancel.clone(),
            transfer: Arc::clone(&self.transfer),
            timeout: self.timeout,
            on_progress: Box::new(on_progress),
        });

        let mut workers = JoinSet::new();
        for id in 0..worker_count {
            workers.spawn(worker::run_worker(id, Arc::clone(&shared)));
        }
        while let Some(joined) = workers.join_next().await {
            if let Err(e) = joined {
                error!(error = %e, "Download worker terminated abnormally");
            }
        }

        let unclaimed: Vec<DownloadJob> = shared.queue.lock().await.drain(..).collect();
        let attempted = *shared.completed.lock().await;
        let summary = DownloadSummary {
            attempted,
            failed: shared.failed.load(Ordering::SeqCst),
            cancelled: unclaimed.len(),
        };

        if summary.cancelled > 0 {
            warn!(
                remaining = summary.cancelled,
                "Downloads stopped on shutdown request"
            );
        }
        info!(
            attempted = summary.attempted,
            failed = summary.failed,
            "Downloads finished"
        );

        RunOutcome { summary, unclaimed }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeTransfer;
    use std::sync::Mutex as StdMutex;

    fn jobs(root: &std::path::Path, n: usize) -> Vec<DownloadJob> {
        (0..n)
            .map(|i| {
                DownloadJob::new(
                    format!("https://cdn.example/f{i}"),
                    root.join(format!("d{}/f{i}.bin", i % 3)),
                )
            })
            .collect()
    }

    fn recorder() -> (Arc<StdMutex<Vec<usize>>>, impl Fn(usize) + Send + Sync + 'static) {
        let seen = Arc::new(StdMutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        (seen, move |n| sink.lock().unwrap().push(n))
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn progress_counts_strictly_increase() {
        let dir = tempfile::tempdir().unwrap();
        let transfer = Arc::new(FakeTransfer::succeeding(b"x"));
        let coordinator = DownloadCoordinator::new(transfer.clone(), Duration::from_secs(5));
        let (seen, on_progress) = recorder();

        let outcome = coordinator
            .run(jobs(dir.path(), 25), 4, &CancellationToken::new(), on_progress)
            .await;

        assert_eq!(*seen.lock().unwrap(), (1..=25).collect::<Vec<_>>());
        assert_eq!(
            outcome.summary,
            DownloadSummary {
                attempted: 25,
                failed: 0,
                cancelled: 0
            }
        );
        assert_eq!(transfer.calls(), 25);
    }

    #[tokio::test]
    async fn failing_job_counts_once_and_pool_continues() {
        let dir = tempfile::tempdir().unwrap();
        let transfer = Arc::new(FakeTransfer::succeeding(b"x").failing_for("https://cdn.example/f1"));
        let coordinator = DownloadCoordinator::new(transfer, Duration::from_secs(5));
        let (seen, on_progress) = recorder();

        let outcome = coordinator
            .run(jobs(dir.path(), 4), 2, &CancellationToken::new(), on_progress)
            .await;

        assert_eq!(outcome.summary.failed, 1);
        assert_eq!(outcome.summary.attempted, 4);
        assert_eq!(outcome.summary.succeeded(), 3);
        assert_eq!(seen.lock().unwrap().len(), 4);
        assert!(!dir.path().join("d1/f1.bin").exists());
        assert!(dir.path().join("d2/f2.bin").exists());
    }

    #[tokio::test]
    async fn pre_cancelled_run_claims_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let transfer = Arc::new(FakeTransfer::succeeding(b"x"));
        let coordinator = DownloadCoordinator::new(transfer.clone(), Duration::from_secs(5));
        let cancel = CancellationToken::new();
        cancel.cancel();

        let outcome = coordinator.run(jobs(dir.path(), 3), 2, &cancel, |_| {}).await;

        assert_eq!(outcome.summary.attempted, 0);
        assert_eq!(outcome.summary.cancelled, 3);
        assert_eq!(outcome.unclaimed.len(), 3);
        assert_eq!(transfer.calls(), 0);
    }

    #[tokio::test]
    async fn slow_transfer_times_out_as_failure() {
        let dir = tempfile::tempdir().unwrap();
        let transfer = Arc::new(FakeTransfer::succeeding(b"x").with_delay(Duration::from_secs(10)));
        let coordinator = DownloadCoordinator::new(transfer, Duration::from_millis(20));

        let outcome = coordinator
            .run(jobs(dir.path(), 1), 1, &CancellationToken::new(), |_| {})
            .await;

        assert_eq!(outcome.summary.failed, 1);
        assert_eq!(outcome.summary.attempted, 1);
    }

    #[tokio::test]
    async fn empty_queue_reports_nothing() {
        let transfer = Arc::new(FakeTransfer::succeeding(b"x"));
        let coordinator = DownloadCoordinator::new(transfer, Duration::from_secs(1));
        let (seen, on_progress) = recorder();

        let outcome = coordinator
            .run(Vec::new(), 3, &CancellationToken::new(), on_progress)
            .await;

        assert_eq!(outcome.summary, DownloadSummary::default());
        assert!(seen.lock().unwrap().is_empty());
    }
}
