//! CLI bootstrap - the composition root.
//!
//! The only place where the HTTP adapters, the manifest and the engine are
//! wired together. Handlers receive a ready [`SyncEngine`].

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::info;

use patchsync_core::{Settings, load_manifest, validate_settings};
use patchsync_download::SyncEngine;
use patchsync_http::{HttpConfig, HttpTransfer, source_for};

use crate::commands::TargetArgs;
use crate::error::CliError;

/// Load settings from an optional JSON file.
pub fn load_settings(path: Option<&Path>) -> Result<Settings, CliError> {
    let Some(path) = path else {
        return Ok(Settings::with_defaults());
    };
    let raw = std::fs::read_to_string(path)
        .map_err(|e| CliError::Config(format!("{}: {e}", path.display())))?;
    Ok(Settings::from_json(&raw)?)
}

/// Apply command-line overrides on top of file settings.
pub fn apply_overrides(
    mut settings: Settings,
    workers: Option<usize>,
    timeout_secs: Option<u64>,
) -> Result<Settings, CliError> {
    if workers.is_some() {
        settings.worker_count = workers;
    }
    if timeout_secs.is_some() {
        settings.transfer_timeout_secs = timeout_secs;
    }
    validate_settings(&settings).map_err(|e| CliError::Arguments(e.to_string()))?;
    Ok(settings)
}

/// Fetch the manifest and build an engine for the target installation.
pub async fn open_engine(
    settings: &Settings,
    target: &TargetArgs,
    requests: &[PathBuf],
) -> Result<SyncEngine, CliError> {
    let http = HttpConfig::from_settings(settings);
    let source = source_for(&target.manifest, http.clone())?;
    let manifest = load_manifest(source.as_ref(), &target.manifest).await?;

    let transfer = Arc::new(HttpTransfer::new(http)?);
    let mut engine = SyncEngine::new(manifest, &target.install_dir, settings.clone(), transfer)?;

    for request in requests {
        if !engine.mark_optional_file_as_requested(request) {
            return Err(CliError::Arguments(format!(
                "requested file {} is outside the installation root",
                request.display()
            )));
        }
    }

    info!(
        manifest = %target.manifest,
        install_dir = %engine.install_dir().display(),
        version = engine.new_patch_version(),
        "Engine ready"
    );
    Ok(engine)
}
