//! Main CLI parser and top-level argument handling.

use std::path::PathBuf;

use clap::Parser;

use crate::commands::Commands;

/// Keep an installation in step with its published manifest.
#[derive(Debug, Parser)]
#[command(name = "patchsync")]
#[command(about = "Validate and repair an installation against a remote manifest")]
#[command(version)]
pub struct Cli {
    /// JSON settings file (workers, timeouts, logging)
    #[arg(long = "settings", global = true, value_name = "FILE")]
    pub settings: Option<PathBuf>,

    /// Enable verbose/debug output
    #[arg(short = 'v', long = "verbose", global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_parser_builds() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_global_args() {
        let cli = Cli::parse_from([
            "patchsync",
            "--verbose",
            "--settings",
            "/etc/patchsync.json",
            "validate",
            "--manifest",
            "https://cdn.example/update.json",
            "--install-dir",
            "/opt/game",
        ]);
        assert!(cli.verbose);
        assert_eq!(cli.settings, Some(PathBuf::from("/etc/patchsync.json")));
    }
}
