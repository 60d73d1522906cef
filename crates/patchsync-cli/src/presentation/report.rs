//! Plain-text rendering of validation and download results.

use std::fmt::Write;
use std::path::Path;

use patchsync_core::{FindingKind, Policing, ValidationReport};
use patchsync_download::DownloadSummary;

/// Render findings with paths relative to the installation root.
pub fn render_report(report: &ValidationReport, install_dir: &Path) -> String {
    let mut out = String::new();

    if report.policing == Policing::FreeModificationsAllowed {
        out.push_str("Free modifications allowed; only missing files were checked.\n");
    }

    for finding in &report.findings {
        let shown = finding
            .path
            .strip_prefix(install_dir)
            .unwrap_or(&finding.path);
        let _ = writeln!(out, "  {:<12} {}", finding.kind.to_string(), shown.display());
    }

    let _ = writeln!(
        out,
        "{} missing, {} modified, {} not allowed; {} pending download(s)",
        report.count(FindingKind::Missing),
        report.count(FindingKind::Modified),
        report.count(FindingKind::NotAllowed),
        report.pending_downloads
    );
    out
}

/// One-line download summary.
pub fn render_summary(summary: &DownloadSummary) -> String {
    let mut line = format!(
        "{} downloaded, {} failed",
        summary.succeeded(),
        summary.failed
    );
    if summary.cancelled > 0 {
        let _ = write!(line, ", {} not started", summary.cancelled);
    }
    line
}
