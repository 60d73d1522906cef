//! Value types produced by validation.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// One resource to fetch into one destination. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DownloadJob {
    /// Source URL declared by the manifest.
    pub url: String,
    /// Canonical local path.
    pub destination: PathBuf,
}

impl DownloadJob {
    /// Create a job.
    pub fn new(url: impl Into<String>, destination: impl Into<PathBuf>) -> Self {
        Self {
            url: url.into(),
            destination: destination.into(),
        }
    }
}

/// What reconciliation observed about a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FindingKind {
    /// A required or requested file is absent.
    Missing,
    /// A file's content does not match its declared digest.
    Modified,
    /// A file is present that policy does not permit.
    NotAllowed,
}

impl fmt::Display for FindingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Missing => "missing",
            Self::Modified => "modified",
            Self::NotAllowed => "not allowed",
        };
        f.write_str(label)
    }
}

/// A single reconciliation observation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ValidationFinding {
    /// Observation kind.
    pub kind: FindingKind,
    /// Canonical local path the observation is about.
    pub path: PathBuf,
}

impl ValidationFinding {
    /// Create a finding.
    pub fn new(kind: FindingKind, path: impl Into<PathBuf>) -> Self {
        Self {
            kind,
            path: path.into(),
        }
    }
}

/// A present file whose digest must be checked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HashCandidate {
    /// Canonical local path.
    pub path: PathBuf,
    /// Declared digest (hex).
    pub expected_digest: String,
    /// Where a replacement comes from.
    pub source_url: String,
}

impl HashCandidate {
    /// The download that replaces this file.
    pub fn replacement(&self) -> DownloadJob {
        DownloadJob::new(self.source_url.clone(), self.path.clone())
    }
}

/// Whether the local tree was policed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Policing {
    /// Digests were verified and unlisted files handled by policy.
    Enforced,
    /// The manifest allows free modification; only missing files were checked.
    FreeModificationsAllowed,
}

/// Result of one validation pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    /// Observations in the order they were made.
    pub findings: Vec<ValidationFinding>,
    /// Whether policing ran.
    pub policing: Policing,
    /// Jobs queued for download.
    pub pending_downloads: usize,
}

impl ValidationReport {
    /// Number of findings of `kind`.
    pub fn count(&self, kind: FindingKind) -> usize {
        self.findings.iter().filter(|f| f.kind == kind).count()
    }

    /// True when nothing needs attention.
    pub fn is_clean(&self) -> bool {
        self.findings.is_empty() && self.pending_downloads == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replacement_targets_candidate_path() {
        let candidate = HashCandidate {
            path: PathBuf::from("/opt/game/a.bin"),
            expected_digest: "00".to_string(),
            source_url: "https://cdn.example/a.bin".to_string(),
        };
        assert_eq!(
            candidate.replacement(),
            DownloadJob::new("https://cdn.example/a.bin", "/opt/game/a.bin")
        );
    }

    #[test]
    fn report_counts_by_kind() {
        let report = ValidationReport {
            findings: vec![
                ValidationFinding::new(FindingKind::Missing, "/a"),
                ValidationFinding::new(FindingKind::Missing, "/b"),
                ValidationFinding::new(FindingKind::NotAllowed, "/c"),
            ],
            policing: Policing::Enforced,
            pending_downloads: 2,
        };
        assert_eq!(report.count(FindingKind::Missing), 2);
        assert_eq!(report.count(FindingKind::Modified), 0);
        assert_eq!(report.count(FindingKind::NotAllowed), 1);
        assert!(!report.is_clean());
    }

    #[test]
    fn finding_kind_display() {
        assert_eq!(FindingKind::NotAllowed.to_string(), "not allowed");
        assert_eq!(
            serde_json::to_string(&FindingKind::NotAllowed).unwrap(),
            "\"not_allowed\""
        );
    }
}
