//! `patchsync validate`.

use patchsync_core::Settings;

use crate::bootstrap::open_engine;
use crate::commands::{RequestArgs, TargetArgs};
use crate::error::CliError;
use crate::presentation::progress::percent_position;
use crate::presentation::{render_report, verify_bar};

/// Run one validation pass and print its findings.
pub async fn execute(
    settings: &Settings,
    target: &TargetArgs,
    requests: &RequestArgs,
    json: bool,
) -> Result<(), CliError> {
    let mut engine = open_engine(settings, target, &requests.request).await?;

    let bar = verify_bar();
    let report = engine
        .validate_installation(|percent| bar.set_position(percent_position(percent)))
        .await;
    bar.finish_and_clear();
    let report = report?;

    if json {
        let rendered = serde_json::to_string_pretty(&report)
            .map_err(|e| CliError::Io(format!("could not encode report: {e}")))?;
        println!("{rendered}");
    } else {
        print!("{}", render_report(&report, engine.install_dir()));
    }
    Ok(())
}
