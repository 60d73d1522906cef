//! Reconciliation of scan results.
//!
//! Turns scanner classifications into the caller-visible finding list and
//! the download queue. The two on-disk deletions (modified files and
//! disallowed files) happen here so every destructive action is logged in
//! one place.

use std::collections::HashSet;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use super::types::{DownloadJob, FindingKind, HashCandidate, ValidationFinding};

/// Accumulates findings and download jobs for one validation pass.
#[derive(Debug, Default)]
pub struct Reconciler {
    findings: Vec<ValidationFinding>,
    queue: Vec<DownloadJob>,
    queued: HashSet<PathBuf>,
}

impl Reconciler {
    /// Start an empty pass.
    pub fn new() -> Self {
        Self::default()
    }

    /// A required or requested file is absent.
    pub fn record_missing(&mut self, job: DownloadJob) {
        let path = job.destination.clone();
        if self.enqueue(job) {
            info!(path = %path.display(), "Enqueuing file request");
            self.findings
                .push(ValidationFinding::new(FindingKind::Missing, path));
        }
    }

    /// A present file is replaced because the manifest forces it.
    pub fn record_forced(&mut self, job: DownloadJob) {
        let path = job.destination.clone();
        if self.enqueue(job) {
            info!(path = %path.display(), "Enqueuing forced redownload");
        }
    }

    /// A file failed digest verification: delete it and request a fresh copy.
    pub fn handle_modified(&mut self, candidate: &HashCandidate) {
        warn!(path = %candidate.path.display(), "File seems to have been modified; rerequesting file");
        remove_quietly(&candidate.path);
        if self.enqueue(candidate.replacement()) {
            self.findings.push(ValidationFinding::new(
                FindingKind::Modified,
                candidate.path.clone(),
            ));
        }
    }

    /// A file is not permitted by policy: delete it.
    pub fn handle_not_allowed(&mut self, path: &Path) {
        warn!(path = %path.display(), "File is not allowed; deleting file");
        remove_quietly(path);
        self.findings
            .push(ValidationFinding::new(FindingKind::NotAllowed, path));
    }

    /// Findings recorded so far.
    pub fn findings(&self) -> &[ValidationFinding] {
        &self.findings
    }

    /// Jobs queued so far.
    pub fn queue(&self) -> &[DownloadJob] {
        &self.queue
    }

    /// Consume the pass.
    pub fn into_parts(self) -> (Vec<ValidationFinding>, Vec<DownloadJob>) {
        (self.findings, self.queue)
    }

    /// Queue a job unless its destination is already queued.
    fn enqueue(&mut self, job: DownloadJob) -> bool {
        if !self.queued.insert(job.destination.clone()) {
            warn!(path = %job.destination.display(), "Destination already queued; ignoring duplicate");
            return false;
        }
        self.queue.push(job);
        true
    }
}

/// Delete a file; a file that is already gone is fine.
fn remove_quietly(path: &Path) {
    match std::fs::remove_file(path) {
        Ok(()) => {}
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => warn!(path = %path.display(), error = %e, "Failed to delete file"),
    }
}
