//! `patchsync check`.

use patchsync_core::{LocalInstall, Settings};

use crate::bootstrap::open_engine;
use crate::commands::{LocalStateArgs, TargetArgs};
use crate::error::CliError;

/// Report whether the installation is current.
pub async fn execute(
    settings: &Settings,
    target: &TargetArgs,
    local: &LocalStateArgs,
) -> Result<(), CliError> {
    let engine = open_engine(settings, target, &[]).await?;
    let local = LocalInstall {
        last_update: local.last_updated,
        version: local.installed_version,
    };

    if engine.is_up_to_date(&local) {
        println!("Installation is current (version {})", local.version);
    } else {
        println!(
            "Update available: version {} (installed {})",
            engine.new_patch_version(),
            local.version
        );
    }
    Ok(())
}
