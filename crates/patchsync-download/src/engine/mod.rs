//! Sync engine.
//!
//! Ties the pieces together for one installation: the version gate, a
//! validation pass that fills the engine's own download queue, and a
//! download pass that drains it through the coordinator.

mod run_state;

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use patchsync_core::{
    LocalInstall, Manifest, Settings, SyncError, TransferPort, TreeScanner, ValidationFinding,
    ValidationReport, ensure_install_dir, is_current, normalize_install_dir, relative_to_install,
    validate, validate_settings,
};

use crate::coordinator::{DownloadCoordinator, DownloadSummary};
use crate::progress::ProgressThrottle;

use run_state::RunState;

/// Validates and repairs one installation against one manifest.
pub struct SyncEngine {
    scanner: TreeScanner,
    settings: Settings,
    coordinator: DownloadCoordinator,
    requested: HashSet<PathBuf>,
    state: RunState,
}

impl std::fmt::Debug for SyncEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncEngine")
            .field("install_dir", &self.scanner.install_dir())
            .field("requested", &self.requested)
            .field("pending", &self.state.queue.len())
            .finish_non_exhaustive()
    }
}

impl SyncEngine {
    /// Create an engine for `install_dir`, creating the directory if needed.
    pub fn new(
        manifest: Manifest,
        install_dir: &Path,
        settings: Settings,
        transfer: Arc<dyn TransferPort>,
    ) -> Result<Self, SyncError> {
        validate_settings(&settings)?;

        let install_dir = normalize_install_dir(install_dir);
        ensure_install_dir(&install_dir)?;
        info!(install_dir = %install_dir.display(), "Installation root ready");

        let coordinator = DownloadCoordinator::new(transfer, settings.effective_transfer_timeout());
        Ok(Self {
            scanner: TreeScanner::new(Arc::new(manifest), install_dir),
            settings,
            coordinator,
            requested: HashSet::new(),
            state: RunState::fresh(),
        })
    }

    /// The manifest this engine validates against.
    pub fn manifest(&self) -> &Manifest {
        self.scanner.manifest()
    }

    /// Normalized installation root.
    pub fn install_dir(&self) -> &Path {
        self.scanner.install_dir()
    }

    /// Whether the local installation needs no update.
    pub fn is_up_to_date(&self, local: &LocalInstall) -> bool {
        let current = is_current(local, self.manifest().meta());
        info!(
            current,
            local_version = local.version,
            remote_version = self.new_patch_version(),
            "Checked installation version"
        );
        current
    }

    /// Version the manifest describes.
    pub fn new_patch_version(&self) -> f64 {
        self.manifest().meta().update_version
    }

    /// Opt into an optional file.
    ///
    /// `path` may be relative to the installation root or absolute inside
    /// it. Returns `false` (and ignores the request) for paths outside.
    pub fn mark_optional_file_as_requested(&mut self, path: impl AsRef<Path>) -> bool {
        let path = path.as_ref();
        let relative = relative_to_install(self.install_dir(), path);

        match relative {
            Some(relative) => {
                debug!(path = %relative.display(), "Optional file requested");
                self.requested.insert(relative);
                true
            }
            None => {
                warn!(path = %path.display(), "Ignoring request outside the installation root");
                false
            }
        }
    }

    /// Run a validation pass and replace the pending queue with its result.
    ///
    /// `on_progress` receives digest-check progress in percent.
    pub async fn validate_installation<F>(
        &mut self,
        mut on_progress: F,
    ) -> Result<ValidationReport, SyncError>
    where
        F: FnMut(f32),
    {
        self.state = RunState::fresh();

        let mut throttle = ProgressThrottle::default();
        let outcome = validate(
            &self.scanner,
            &self.requested,
            self.settings.effective_verify_concurrency(),
            |percent| {
                if throttle.should_emit(percent >= 100.0) {
                    debug!(percent, "Verifying files");
                }
                on_progress(percent);
            },
        )
        .await?;

        let report = outcome.report();
        info!(
            findings = report.findings.len(),
            pending = report.pending_downloads,
            "Validation finished"
        );

        self.state.named = outcome.named;
        self.state.findings = outcome.findings;
        self.state.queue = outcome.queue;
        Ok(report)
    }

    /// Findings of the last validation pass.
    pub fn findings(&self) -> &[ValidationFinding] {
        &self.state.findings
    }

    /// Number of declared paths seen by the last validation pass.
    pub fn named_file_count(&self) -> usize {
        self.state.named.len()
    }

    /// Jobs waiting for the next download pass.
    pub fn pending_downloads(&self) -> usize {
        self.state.queue.len()
    }

    /// Token that stops the current cycle's download pass when cancelled.
    pub fn shutdown_handle(&self) -> CancellationToken {
        self.state.shutdown.clone()
    }

    /// Ask running workers to stop after their current job.
    pub fn request_shutdown(&self) {
        info!("Shutdown requested");
        self.state.shutdown.cancel();
    }

    /// Drain the pending queue.
    ///
    /// `on_progress` receives the absolute number of finished jobs. Jobs
    /// left behind by a shutdown request stay pending.
    pub async fn download_pending_files<F>(&mut self, on_progress: F) -> DownloadSummary
    where
        F: Fn(usize) + Send + Sync + 'static,
    {
        let queue = std::mem::take(&mut self.state.queue);
        if queue.is_empty() {
            info!("Nothing to download");
            return DownloadSummary::default();
        }

        let total = queue.len();
        let throttle = std::sync::Mutex::new(ProgressThrottle::default());
        let report = move |done: usize| {
            let emit = throttle
                .lock()
                .map(|mut t| t.should_emit(done == total))
                .unwrap_or(true);
            if emit {
                info!(done, total, "Download progress");
            }
            on_progress(done);
        };

        let outcome = self
            .coordinator
            .run(
                queue,
                self.settings.effective_worker_count(),
                &self.state.shutdown,
                report,
            )
            .await;

        self.state.queue = outcome.unclaimed;
        outcome.summary
    }
}
