//! Transfer port.
//!
//! Moves one remote resource to one local path. The download coordinator
//! owns stale-file removal, directory creation, timeouts and accounting;
//! the adapter only streams bytes.

use std::path::Path;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error for a single transfer.
///
/// Serializable so it can be surfaced to any front-end without carrying
/// `std::io::Error` or HTTP client types.
#[derive(Clone, Debug, Error, Serialize, Deserialize, PartialEq, Eq)]
pub enum TransferError {
    /// Local file operation failed.
    #[error("I/O error ({kind}): {message}")]
    Io {
        /// The kind of I/O error (e.g., "NotFound", "PermissionDenied").
        kind: String,
        /// Detailed error message.
        message: String,
    },

    /// Network/HTTP failure.
    #[error("Network error: {message}")]
    Network {
        /// Detailed error message.
        message: String,
        /// HTTP status code if available.
        #[serde(skip_serializing_if = "Option::is_none")]
        status_code: Option<u16>,
    },

    /// The transfer exceeded its time budget.
    #[error("Transfer timed out after {seconds}s")]
    Timeout {
        /// The budget that was exceeded.
        seconds: u64,
    },
}

impl TransferError {
    /// Create an I/O error from a `std::io::Error`.
    #[must_use]
    pub fn from_io_error(err: &std::io::Error) -> Self {
        let kind = err.kind();
        Self::Io {
            kind: format!("{kind:?}"),
            message: err.to_string(),
        }
    }

    /// Create a network error.
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
            status_code: None,
        }
    }

    /// Create a network error with HTTP status code.
    pub fn network_with_status(message: impl Into<String>, status_code: u16) -> Self {
        Self::Network {
            message: message.into(),
            status_code: Some(status_code),
        }
    }
}

/// Port for moving a remote resource onto disk.
#[async_trait]
pub trait TransferPort: Send + Sync {
    /// Stream `url` into `destination`, returning the number of bytes written.
    ///
    /// The destination's directory exists and no file is present at the
    /// destination when this is called.
    async fn transfer(&self, url: &str, destination: &Path) -> Result<u64, TransferError>;
}
