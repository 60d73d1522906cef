//! `patchsync` command-line front-end.
//!
//! - `parser` / `commands` - clap definitions
//! - `bootstrap` - settings loading and engine composition
//! - `handlers` - one module per subcommand
//! - `logging` - tracing subscriber and log-file retention
//! - `presentation` - progress bars and report rendering

#![deny(unsafe_code)]
#![deny(unused_crate_dependencies)]

// Used by the binary entry point only.
use anyhow as _;
use dotenvy as _;

pub mod bootstrap;
pub mod commands;
pub mod error;
pub mod handlers;
pub mod logging;
pub mod parser;
pub mod presentation;

pub use commands::Commands;
pub use error::CliError;
pub use parser::Cli;

use patchsync_core::LocalInstall;

/// Execute a parsed command line.
pub async fn run(cli: Cli) -> Result<(), CliError> {
    let mut settings = bootstrap::load_settings(cli.settings.as_deref())?;
    if let Commands::Sync {
        workers, timeout, ..
    } = &cli.command
    {
        settings = bootstrap::apply_overrides(settings, *workers, *timeout)?;
    }

    let _guard =
        logging::init_logging(&settings.log, &cli.command.target().install_dir, cli.verbose)?;

    match cli.command {
        Commands::Check { target, local } => {
            handlers::check::execute(&settings, &target, &local).await
        }
        Commands::Validate {
            target,
            requests,
            json,
        } => handlers::validate::execute(&settings, &target, &requests, json).await,
        Commands::Sync {
            target,
            last_updated,
            installed_version,
            requests,
            force,
            ..
        } => {
            let local = last_updated
                .zip(installed_version)
                .map(|(last_update, version)| LocalInstall {
                    last_update,
                    version,
                });
            let args = handlers::sync::SyncArgs {
                target,
                local,
                requests,
                force,
            };
            handlers::sync::execute(&settings, args).await
        }
    }
}
