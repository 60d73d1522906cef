//! Core of patchsync: the manifest model and the reconciliation engine
//! that compares a local installation against it.
//!
//! - `manifest` - typed manifest tree, decoding, loading through a source port
//! - `version` - "is this installation current?"
//! - `digest` - streaming content digests
//! - `sync` - tree scanning, reconciliation, validation pass
//! - `ports` - trait seams for manifest fetching and file transfer
//! - `settings` - engine settings and validation
//! - `paths` - installation root helpers

#![deny(unused_crate_dependencies)]

pub mod digest;
pub mod manifest;
pub mod paths;
pub mod ports;
pub mod settings;
pub mod sync;
pub mod version;

// Re-export commonly used types for convenience
pub use digest::{DigestError, compute_digest, verify};
pub use manifest::{
    DirectoryNode, FileNode, Manifest, ManifestBuilder, ManifestError, ManifestMeta, ManifestNode,
    NodeId, load_manifest, parse_manifest,
};
pub use paths::{default_log_dir, ensure_install_dir, normalize_install_dir, relative_to_install};
pub use ports::{ManifestSourcePort, SourceError, TransferError, TransferPort};
pub use settings::{LogSettings, Settings, SettingsError, validate_settings};
pub use sync::{
    DownloadJob, FindingKind, HashCandidate, ManifestScan, Policing, Reconciler, SyncError,
    TreeScanner, ValidationFinding, ValidationOutcome, ValidationReport, validate,
};
pub use version::{LocalInstall, is_current};
