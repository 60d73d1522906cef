//! Error taxonomy for validation and download.
//!
//! Only malformed-manifest and settings problems abort an operation.
//! Filesystem and transfer trouble on individual files is recovered into
//! findings and counters; the `Io`/`Transfer` variants exist for the few
//! places where a caller asks about a single file directly.

use std::path::PathBuf;

use thiserror::Error;

use crate::manifest::ManifestError;
use crate::ports::{SourceError, TransferError};
use crate::settings::SettingsError;

/// Error type for the reconciliation engine.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The manifest violates a structural invariant.
    #[error(transparent)]
    MalformedManifest(#[from] ManifestError),

    /// The manifest document could not be obtained.
    #[error(transparent)]
    Source(#[from] SourceError),

    /// Local filesystem access failed.
    #[error("I/O error at {}: {message}", path.display())]
    Io {
        /// Path being accessed.
        path: PathBuf,
        /// Detailed error message.
        message: String,
    },

    /// A single transfer failed.
    #[error("Transfer of {url} failed: {source}")]
    Transfer {
        /// Source URL.
        url: String,
        /// Underlying failure.
        source: TransferError,
    },

    /// Settings were rejected.
    #[error(transparent)]
    Settings(#[from] SettingsError),

    /// A scan task on the blocking pool did not complete.
    #[error("Background task failed: {message}")]
    Task {
        /// Join failure reported by the runtime.
        message: String,
    },
}

impl SyncError {
    /// Create an I/O error for `path`.
    pub fn io(path: impl Into<PathBuf>, err: &std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            message: err.to_string(),
        }
    }

    /// Whether this is the fatal malformed-manifest class.
    pub const fn is_malformed_manifest(&self) -> bool {
        matches!(self, Self::MalformedManifest(_))
    }
}
