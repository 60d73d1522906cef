//! Download side of patchsync.
//!
//! - `coordinator` - worker pool draining a shared job queue
//! - `engine` - [`SyncEngine`], one validate-then-download cycle per call pair
//! - `progress` - log throttling for progress updates

#![deny(unused_crate_dependencies)]

pub mod coordinator;
mod engine;
pub(crate) mod progress;

#[cfg(test)]
pub(crate) mod testing;

pub use coordinator::{DownloadCoordinator, DownloadSummary, RunOutcome};
pub use engine::SyncEngine;
pub use progress::ProgressThrottle;

// Re-export the types callers of the engine need.
pub use patchsync_core::{
    DownloadJob, FindingKind, LocalInstall, Policing, TransferError, TransferPort,
    ValidationFinding, ValidationReport,
};
