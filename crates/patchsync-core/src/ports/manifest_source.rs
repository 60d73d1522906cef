//! Manifest source port.
//!
//! Returns the raw manifest document for a location. How the bytes travel
//! (HTTP, local file) is the adapter's business.

use async_trait::async_trait;
use thiserror::Error;

/// Failure to obtain the manifest document.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SourceError {
    /// Nothing exists at the location.
    #[error("Manifest not found: {location}")]
    NotFound {
        /// The requested location.
        location: String,
    },

    /// Local read failure.
    #[error("Failed to read manifest {location}: {message}")]
    Io {
        /// The requested location.
        location: String,
        /// Detailed error message.
        message: String,
    },

    /// Remote fetch failure.
    #[error("Failed to fetch manifest {location}: {message}")]
    Network {
        /// The requested location.
        location: String,
        /// Detailed error message.
        message: String,
        /// HTTP status code if available.
        status_code: Option<u16>,
    },
}

/// Port for fetching the raw manifest document.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ManifestSourcePort: Send + Sync {
    /// Fetch the document text at `location`.
    async fn fetch(&self, location: &str) -> Result<String, SourceError>;
}
