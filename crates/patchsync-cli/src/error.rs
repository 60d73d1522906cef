//! CLI-specific error types and exit-code mapping.

use thiserror::Error;

use patchsync_core::{SettingsError, SyncError};
use patchsync_http::HttpError;

/// CLI-specific error type.
#[derive(Debug, Error)]
pub enum CliError {
    /// Manifest could not be decoded or is structurally invalid.
    #[error("{0}")]
    Manifest(String),

    /// Manifest could not be fetched.
    #[error("Manifest unavailable: {0}")]
    Source(String),

    /// Invalid arguments.
    #[error("Invalid arguments: {0}")]
    Arguments(String),

    /// Local file system failure.
    #[error("IO error: {0}")]
    Io(String),

    /// Settings are unreadable or out of range.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Some downloads did not complete.
    #[error("{failed} of {attempted} downloads failed")]
    DownloadsFailed {
        /// Failed jobs.
        failed: usize,
        /// Attempted jobs.
        attempted: usize,
    },

    /// Shutdown was requested before every download ran.
    #[error("Interrupted with {remaining} downloads pending")]
    Interrupted {
        /// Jobs never attempted.
        remaining: usize,
    },
}

impl CliError {
    /// Map error to a process exit code.
    ///
    /// - 1: some downloads failed
    /// - 2: invalid arguments
    /// - 64-78: sysexits.h categories
    /// - 130: interrupted
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::DownloadsFailed { .. } => 1,
            Self::Arguments(_) => 2,
            Self::Manifest(_) => 65, // EX_DATAERR
            Self::Source(_) => 69,   // EX_UNAVAILABLE
            Self::Io(_) => 74,       // EX_IOERR
            Self::Config(_) => 78,   // EX_CONFIG
            Self::Interrupted { .. } => 130,
        }
    }
}

impl From<SyncError> for CliError {
    fn from(err: SyncError) -> Self {
        match err {
            SyncError::MalformedManifest(e) => Self::Manifest(e.to_string()),
            SyncError::Source(e) => Self::Source(e.to_string()),
            SyncError::Settings(e) => Self::Config(e.to_string()),
            SyncError::Io { .. } | SyncError::Transfer { .. } | SyncError::Task { .. } => {
                Self::Io(err.to_string())
            }
        }
    }
}

impl From<SettingsError> for CliError {
    fn from(err: SettingsError) -> Self {
        Self::Config(err.to_string())
    }
}

impl From<HttpError> for CliError {
    fn from(err: HttpError) -> Self {
        Self::Config(format!("HTTP client: {err}"))
    }
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use patchsync_core::{ManifestError, SourceError};

    #[test]
    fn malformed_manifest_is_a_data_error() {
        let err: CliError =
            SyncError::MalformedManifest(ManifestError::malformed("no program")).into();
        assert_eq!(err.exit_code(), 65);
    }

    #[test]
    fn unreachable_manifest_is_unavailable() {
        let err: CliError = SyncError::Source(SourceError::NotFound {
            location: "update.json".to_string(),
        })
        .into();
        assert_eq!(err.exit_code(), 69);
        assert!(err.to_string().contains("update.json"));
    }

    #[test]
    fn failed_downloads_exit_non_zero() {
        let err = CliError::DownloadsFailed {
            failed: 2,
            attempted: 5,
        };
        assert_eq!(err.exit_code(), 1);
        assert_eq!(err.to_string(), "2 of 5 downloads failed");
    }
}
