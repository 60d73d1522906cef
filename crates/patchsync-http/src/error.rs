//! Internal error types for HTTP operations.
//!
//! These errors are internal to `patchsync-http` and are mapped to core
//! port errors at the boundary.

use thiserror::Error;

use patchsync_core::{SourceError, TransferError};

/// Result type alias for HTTP operations.
pub type HttpResult<T> = Result<T, HttpError>;

/// Errors related to HTTP requests.
#[derive(Debug, Error)]
pub enum HttpError {
    /// Server answered with a non-success status.
    #[error("Request failed with status {status}: {url}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// The URL requested.
        url: String,
    },

    /// The URL could not be parsed.
    #[error("Invalid URL '{url}': {message}")]
    InvalidUrl {
        /// The offending URL.
        url: String,
        /// Parser message.
        message: String,
    },

    /// Connection, TLS, or body streaming failure.
    #[error("Request error: {0}")]
    Request(#[from] reqwest::Error),

    /// Local write failure while streaming a body.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl HttpError {
    /// Status code, if the server answered.
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether retrying could help (5xx or transport failure).
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Status { status, .. } => *status >= 500,
            Self::Request(e) => e.is_connect() || e.is_timeout() || e.is_request(),
            Self::InvalidUrl { .. } | Self::Io(_) => false,
        }
    }

    /// Map to the transfer port error.
    pub fn into_transfer_error(self) -> TransferError {
        match self {
            Self::Status { status, url } => {
                TransferError::network_with_status(format!("HTTP {status} for {url}"), status)
            }
            Self::Io(e) => TransferError::from_io_error(&e),
            other => TransferError::network(other.to_string()),
        }
    }

    /// Map to the manifest source port error.
    pub fn into_source_error(self, location: &str) -> SourceError {
        match self {
            Self::Status { status: 404, .. } => SourceError::NotFound {
                location: location.to_string(),
            },
            Self::Io(e) => SourceError::Io {
                location: location.to_string(),
                message: e.to_string(),
            },
            other => SourceError::Network {
                location: location.to_string(),
                status_code: other.status(),
                message: other.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_errors_are_transient() {
        let err = HttpError::Status {
            status: 503,
            url: "https://cdn.example/a".to_string(),
        };
        assert!(err.is_transient());

        let err = HttpError::Status {
            status: 404,
            url: "https://cdn.example/a".to_string(),
        };
        assert!(!err.is_transient());
    }

    #[test]
    fn status_maps_to_transfer_error_with_code() {
        let err = HttpError::Status {
            status: 403,
            url: "https://cdn.example/a".to_string(),
        };
        assert!(matches!(
            err.into_transfer_error(),
            TransferError::Network {
                status_code: Some(403),
                ..
            }
        ));
    }

    #[test]
    fn not_found_maps_to_source_not_found() {
        let err = HttpError::Status {
            status: 404,
            url: "https://cdn.example/update.json".to_string(),
        };
        assert_eq!(
            err.into_source_error("https://cdn.example/update.json"),
            SourceError::NotFound {
                location: "https://cdn.example/update.json".to_string()
            }
        );
    }

    #[test]
    fn io_maps_to_transfer_io() {
        let err = HttpError::Io(std::io::Error::new(std::io::ErrorKind::StorageFull, "disk full"));
        assert!(matches!(err.into_transfer_error(), TransferError::Io { .. }));
    }
}
