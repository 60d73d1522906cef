//! Manifest error types.
//!
//! Every variant here belongs to the "malformed manifest" class: the
//! remote descriptor violates a structural invariant and the validation
//! pass must abort before any download is queued.

use thiserror::Error;

/// Error raised when a manifest cannot be turned into a usable tree.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ManifestError {
    /// The document could not be decoded (bad syntax, missing meta field, bad timestamp).
    #[error("Malformed manifest: {message}")]
    Parse {
        /// Decoder message.
        message: String,
    },

    /// A node's ancestor chain does not terminate at the program root.
    #[error("Malformed manifest: node '{name}' is not reachable from the program root")]
    DanglingParent {
        /// Name of the node whose chain is broken.
        name: String,
    },

    /// A node name is not a single plain path segment.
    #[error("Malformed manifest: invalid node name '{name}'")]
    InvalidName {
        /// The offending name.
        name: String,
    },

    /// Any other structural violation.
    #[error("Malformed manifest: {reason}")]
    Malformed {
        /// Human-readable reason.
        reason: String,
    },
}

impl ManifestError {
    /// Create a parse error.
    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse {
            message: message.into(),
        }
    }

    /// Create a generic structural error.
    pub fn malformed(reason: impl Into<String>) -> Self {
        Self::Malformed {
            reason: reason.into(),
        }
    }
}

impl From<serde_json::Error> for ManifestError {
    fn from(err: serde_json::Error) -> Self {
        Self::parse(err.to_string())
    }
}
