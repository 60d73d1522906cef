//! Installation validation.
//!
//! One pass runs in a fixed order: the manifest pass populates the full
//! set of declared paths, then (when the manifest polices the tree)
//! digest verification and the unlisted-file walk run side by side, and
//! finally the reconciler applies deletions and builds the queue.

mod errors;
mod reconciler;
mod scanner;
mod types;

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;

use tracing::{info, warn};

pub use errors::SyncError;
pub use reconciler::Reconciler;
pub use scanner::{ManifestScan, TreeScanner};
pub use types::{
    DownloadJob, FindingKind, HashCandidate, Policing, ValidationFinding, ValidationReport,
};

/// Everything a validation pass produced.
#[derive(Debug)]
pub struct ValidationOutcome {
    /// Caller-visible observations.
    pub findings: Vec<ValidationFinding>,
    /// Jobs to hand to the download coordinator.
    pub queue: Vec<DownloadJob>,
    /// Every path the manifest declares.
    pub named: HashSet<PathBuf>,
    /// Whether the tree was policed.
    pub policing: Policing,
}

impl ValidationOutcome {
    /// Caller-facing summary.
    pub fn report(&self) -> ValidationReport {
        ValidationReport {
            findings: self.findings.clone(),
            policing: self.policing,
            pending_downloads: self.queue.len(),
        }
    }
}

/// Validate the installation behind `scanner`.
///
/// `requested` holds opted-in optional files relative to the installation
/// root. `on_progress` receives digest-check progress as a percentage.
/// Only a malformed manifest aborts; every per-file problem becomes a
/// finding.
pub async fn validate<F>(
    scanner: &TreeScanner,
    requested: &HashSet<PathBuf>,
    verify_concurrency: usize,
    on_progress: F,
) -> Result<ValidationOutcome, SyncError>
where
    F: FnMut(f32),
{
    let meta = scanner.manifest().meta().clone();

    info!("Checking for potentially missing files");
    let scan = scanner
        .scan_manifest_blocking(requested.clone())
        .await
        .inspect_err(|e| {
            tracing::error!(severity = "severe", error = %e, "Validation aborted");
        })?;

    let mut reconciler = Reconciler::new();
    for job in scan.missing {
        reconciler.record_missing(job);
    }
    if !scan.forced.is_empty() {
        warn!(count = scan.forced.len(), "Manifest forces a redownload of present files");
    }
    for job in scan.forced {
        reconciler.record_forced(job);
    }
    info!("All necessary files have been enqueued");

    let named = scan.named;

    if !meta.only_allow_listed_files {
        warn!("Free modifications allowed. No file check performed.");
        let (findings, queue) = reconciler.into_parts();
        return Ok(ValidationOutcome {
            findings,
            queue,
            named,
            policing: Policing::FreeModificationsAllowed,
        });
    }

    info!(candidates = scan.hash_candidates.len(), "Checking for modified files");
    let named = Arc::new(named);
    let (mismatched, unlisted) = tokio::join!(
        scanner.verify_candidates(scan.hash_candidates, verify_concurrency, on_progress),
        scanner.find_unlisted_blocking(Arc::clone(&named)),
    );
    let unlisted = unlisted?;

    for candidate in &mismatched {
        reconciler.handle_modified(candidate);
    }
    for path in &unlisted {
        reconciler.handle_not_allowed(path);
    }
    info!(
        modified = mismatched.len(),
        not_allowed = unlisted.len(),
        "File checks completed"
    );

    let named = Arc::try_unwrap(named).unwrap_or_else(|shared| (*shared).clone());
    let (findings, queue) = reconciler.into_parts();
    Ok(ValidationOutcome {
        findings,
        queue,
        named,
        policing: Policing::Enforced,
    })
}
