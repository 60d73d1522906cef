//! `patchsync sync`.
//!
//! Version gate, validation, then downloads. Ctrl-C stops workers after
//! their current file.

use patchsync_core::{LocalInstall, Settings};
use tracing::warn;

use crate::bootstrap::open_engine;
use crate::commands::{RequestArgs, TargetArgs};
use crate::error::CliError;
use crate::presentation::progress::percent_position;
use crate::presentation::{download_bar, render_report, render_summary, verify_bar};

/// Arguments for a sync run.
#[derive(Debug, Clone)]
pub struct SyncArgs {
    pub target: TargetArgs,
    pub local: Option<LocalInstall>,
    pub requests: RequestArgs,
    pub force: bool,
}

/// Bring the installation in line with the manifest.
pub async fn execute(settings: &Settings, args: SyncArgs) -> Result<(), CliError> {
    let mut engine = open_engine(settings, &args.target, &args.requests.request).await?;

    if let Some(local) = &args.local {
        if engine.is_up_to_date(local) && !args.force {
            println!("Installation is current (version {})", local.version);
            return Ok(());
        }
    }

    let bar = verify_bar();
    let report = engine
        .validate_installation(|percent| bar.set_position(percent_position(percent)))
        .await;
    bar.finish_and_clear();
    let report = report?;
    print!("{}", render_report(&report, engine.install_dir()));

    let total = engine.pending_downloads();
    if total == 0 {
        println!("Nothing to download; installation at version {}", engine.new_patch_version());
        return Ok(());
    }

    let shutdown = engine.shutdown_handle();
    let ctrl_c = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received; finishing in-flight downloads");
            shutdown.cancel();
        }
    });

    let bar = download_bar(total);
    let sink = bar.clone();
    let summary = engine
        .download_pending_files(move |done| {
            sink.set_position(u64::try_from(done).unwrap_or(u64::MAX));
        })
        .await;
    ctrl_c.abort();
    bar.finish_and_clear();
    println!("{}", render_summary(&summary));

    if summary.failed > 0 {
        return Err(CliError::DownloadsFailed {
            failed: summary.failed,
            attempted: summary.attempted,
        });
    }
    if summary.cancelled > 0 {
        return Err(CliError::Interrupted {
            remaining: summary.cancelled,
        });
    }

    println!("Installation at version {}", engine.new_patch_version());
    Ok(())
}
