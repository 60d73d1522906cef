//! Subcommand definitions.

use std::path::PathBuf;

use chrono::{NaiveDate, NaiveDateTime};
use clap::{Args, Subcommand};

/// Where the manifest lives and which installation it governs.
#[derive(Debug, Clone, Args)]
pub struct TargetArgs {
    /// Manifest location (http(s) URL, file:// URL or local path)
    #[arg(long, env = "PATCHSYNC_MANIFEST")]
    pub manifest: String,

    /// Installation root
    #[arg(long = "install-dir", env = "PATCHSYNC_INSTALL_DIR")]
    pub install_dir: PathBuf,
}

/// What the local installation reports about itself.
#[derive(Debug, Clone, Args)]
pub struct LocalStateArgs {
    /// When the installation was last updated (YYYY-MM-DD[THH:MM:SS])
    #[arg(long = "last-updated", value_parser = parse_timestamp)]
    pub last_updated: NaiveDateTime,

    /// Installed version number
    #[arg(long = "installed-version")]
    pub installed_version: f64,
}

/// Optional-file opt-ins.
#[derive(Debug, Clone, Default, Args)]
pub struct RequestArgs {
    /// Optional file to install (relative to the installation root); repeatable
    #[arg(long = "request", value_name = "PATH")]
    pub request: Vec<PathBuf>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Report whether the installation matches the published version
    Check {
        #[command(flatten)]
        target: TargetArgs,
        #[command(flatten)]
        local: LocalStateArgs,
    },

    /// Validate the installation, removing modified and disallowed files
    Validate {
        #[command(flatten)]
        target: TargetArgs,
        #[command(flatten)]
        requests: RequestArgs,
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Validate the installation and download everything pending
    Sync {
        #[command(flatten)]
        target: TargetArgs,
        /// When the installation was last updated (YYYY-MM-DD[THH:MM:SS])
        #[arg(long = "last-updated", value_parser = parse_timestamp, requires = "installed_version")]
        last_updated: Option<NaiveDateTime>,
        /// Installed version number
        #[arg(long = "installed-version", requires = "last_updated")]
        installed_version: Option<f64>,
        #[command(flatten)]
        requests: RequestArgs,
        /// Simultaneous downloads
        #[arg(long)]
        workers: Option<usize>,
        /// Per-download time budget in seconds
        #[arg(long)]
        timeout: Option<u64>,
        /// Sync even when the installation reports as current
        #[arg(long)]
        force: bool,
    },
}

impl Commands {
    /// Manifest and installation every command works on.
    pub const fn target(&self) -> &TargetArgs {
        match self {
            Self::Check { target, .. } | Self::Validate { target, .. } | Self::Sync { target, .. } => {
                target
            }
        }
    }
}

/// Parse a local timestamp; a bare date means midnight.
pub fn parse_timestamp(raw: &str) -> Result<NaiveDateTime, String> {
    let raw = raw.trim();
    ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
        .ok_or_else(|| format!("invalid timestamp '{raw}', expected YYYY-MM-DD[THH:MM:SS]"))
}
