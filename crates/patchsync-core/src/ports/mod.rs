//! Port definitions (trait abstractions) for external systems.
//!
//! Ports define the interfaces the reconciliation engine expects from
//! infrastructure: fetching the manifest document and transferring a
//! single resource to disk. They carry no HTTP or filesystem details.

pub mod manifest_source;
pub mod transfer;

pub use manifest_source::{ManifestSourcePort, SourceError};
#[cfg(test)]
pub use manifest_source::MockManifestSourcePort;
pub use transfer::{TransferError, TransferPort};
