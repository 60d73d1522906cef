//! Per-cycle engine state.

use std::collections::HashSet;
use std::path::PathBuf;

use tokio_util::sync::CancellationToken;

use patchsync_core::{DownloadJob, ValidationFinding};

/// State owned by one validate-then-download cycle.
///
/// Replaced wholesale at the start of every validation so nothing from a
/// previous cycle (or another engine) leaks into the next.
#[derive(Debug, Default)]
pub(crate) struct RunState {
    pub(crate) named: HashSet<PathBuf>,
    pub(crate) findings: Vec<ValidationFinding>,
    pub(crate) queue: Vec<DownloadJob>,
    pub(crate) shutdown: CancellationToken,
}

impl RunState {
    pub(crate) fn fresh() -> Self {
        Self::default()
    }
}
