//! Tracing setup for the binary.
//!
//! Console output goes to stderr so progress bars and reports on stdout
//! stay readable. The file layer writes `<name>_latest.log` through a
//! single background writer; the previous run's file is archived or
//! dropped according to `preserve_logs` before the new one is opened.

use std::io;
use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDateTime};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use patchsync_core::{LogSettings, default_log_dir};

use crate::error::CliError;

/// Archive suffix format: `2024-03-01-T12-00-00`.
const ARCHIVE_STAMP: &str = "%Y-%m-%d-T%H-%M-%S";

/// Name of the active log file.
pub fn latest_log_name(name: &str) -> String {
    format!("{name}_latest.log")
}

/// Directory the file layer writes into.
pub fn log_directory(settings: &LogSettings, install_dir: &Path) -> PathBuf {
    settings
        .directory
        .clone()
        .unwrap_or_else(|| default_log_dir(install_dir))
}

/// Retire the previous run's log file.
///
/// With `preserve` the file is renamed to `<name>_<stamp>.log`, unless an
/// archive of that name already exists, in which case it is deleted.
/// Without `preserve` it is deleted. Returns the archive path if one was
/// written.
pub fn retire_previous_log(
    dir: &Path,
    name: &str,
    preserve: bool,
    stamp: NaiveDateTime,
) -> io::Result<Option<PathBuf>> {
    let latest = dir.join(latest_log_name(name));
    if !latest.exists() {
        return Ok(None);
    }

    if preserve {
        let archive = dir.join(format!("{name}_{}.log", stamp.format(ARCHIVE_STAMP)));
        if !archive.exists() {
            std::fs::rename(&latest, &archive)?;
            return Ok(Some(archive));
        }
    }

    std::fs::remove_file(&latest)?;
    Ok(None)
}

/// Install the global subscriber.
///
/// The returned guard flushes the file writer on drop and must live until
/// the program exits.
pub fn init_logging(
    settings: &LogSettings,
    install_dir: &Path,
    verbose: bool,
) -> Result<Option<WorkerGuard>, CliError> {
    let default_level = if verbose { "debug" } else { "info" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let console = settings.effective_console().then(|| {
        tracing_subscriber::fmt::layer()
            .with_writer(io::stderr)
            .with_target(false)
            .compact()
    });

    let mut guard = None;
    let mut archived: Option<PathBuf> = None;
    let file = if settings.effective_file() {
        let dir = log_directory(settings, install_dir);
        std::fs::create_dir_all(&dir)?;
        let name = settings.effective_name();
        let archived = retire_previous_log(
            &dir,
            name,
            settings.effective_preserve_logs(),
            Local::now().naive_local(),
        )?;

        let appender = tracing_appender::rolling::never(&dir, latest_log_name(name));
        let (writer, worker_guard) = tracing_appender::non_blocking(appender);
        guard = Some(worker_guard);

        Some(
            tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(false),
        )
    } else {
        None
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console)
        .with(file)
        .try_init()
        .ok();

    if let Some(archive) = archived {
        tracing::debug!(path = %archive.display(), "Previous log archived");
    }

    Ok(guard)
}
