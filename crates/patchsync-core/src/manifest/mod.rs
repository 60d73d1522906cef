//! Manifest model, decoding, and loading.
//!
//! A manifest is fetched once per "check for updates" cycle and shared
//! read-only by validation and download afterwards.

mod errors;
mod model;
mod parse;

#[cfg(test)]
pub(crate) use model::test_support;

pub use errors::ManifestError;
pub use model::{
    DirectoryNode, FileNode, Manifest, ManifestBuilder, ManifestMeta, ManifestNode, NodeId,
};
pub use parse::parse_manifest;

use crate::ports::ManifestSourcePort;
use crate::sync::SyncError;

/// Fetch a manifest through `source` and decode it.
pub async fn load_manifest(
    source: &dyn ManifestSourcePort,
    location: &str,
) -> Result<Manifest, SyncError> {
    let raw = source.fetch(location).await?;
    let manifest = parse_manifest(&raw).inspect_err(|e| {
        tracing::error!(severity = "severe", location, error = %e, "Rejected manifest");
    })?;
    tracing::info!(
        location,
        version = manifest.meta().update_version,
        files = manifest.files().count(),
        "Loaded manifest"
    );
    Ok(manifest)
}
