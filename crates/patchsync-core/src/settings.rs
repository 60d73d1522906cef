//! Engine settings and validation.
//!
//! All fields are optional so a settings file can name only what it
//! changes; `effective_*` accessors fill in defaults.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default number of simultaneous downloads.
pub const DEFAULT_WORKER_COUNT: usize = 1;

/// Default per-transfer time budget.
pub const DEFAULT_TRANSFER_TIMEOUT_SECS: u64 = 300;

/// Default HTTP retry count for transient failures.
pub const DEFAULT_MAX_RETRIES: u8 = 3;

/// Default base delay for exponential backoff.
pub const DEFAULT_RETRY_BASE_DELAY_MS: u64 = 500;

/// Default logger name (file prefix).
pub const DEFAULT_LOGGER_NAME: &str = "patchsync";

const MAX_WORKER_COUNT: usize = 64;
const MAX_VERIFY_CONCURRENCY: usize = 256;

/// Settings validation error.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SettingsError {
    /// A value is outside its allowed range.
    #[error("Invalid setting {field}: {reason}")]
    OutOfRange {
        /// Setting name.
        field: &'static str,
        /// Why it was rejected.
        reason: String,
    },

    /// The settings document could not be decoded.
    #[error("Invalid settings document: {0}")]
    Parse(String),
}

/// Logging collaborator configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LogSettings {
    /// Directory for log files. Defaults to `<install dir parent>/logs`.
    pub directory: Option<PathBuf>,
    /// Logger name used as the file prefix.
    pub name: Option<String>,
    /// Write to the console.
    pub console: Option<bool>,
    /// Write to a log file.
    pub file: Option<bool>,
    /// Archive the previous `<name>_latest.log` instead of deleting it.
    pub preserve_logs: Option<bool>,
}

impl LogSettings {
    /// Logger name with default fallback.
    pub fn effective_name(&self) -> &str {
        self.name.as_deref().unwrap_or(DEFAULT_LOGGER_NAME)
    }

    /// Console output flag (default on).
    pub fn effective_console(&self) -> bool {
        self.console.unwrap_or(true)
    }

    /// File output flag (default on).
    pub fn effective_file(&self) -> bool {
        self.file.unwrap_or(true)
    }

    /// Retention flag (default on).
    pub fn effective_preserve_logs(&self) -> bool {
        self.preserve_logs.unwrap_or(true)
    }
}

/// Engine settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Simultaneous downloads (1-64).
    pub worker_count: Option<usize>,
    /// Simultaneous digest checks (1-256). Defaults to available parallelism.
    pub verify_concurrency: Option<usize>,
    /// Per-transfer time budget in seconds (> 0).
    pub transfer_timeout_secs: Option<u64>,
    /// Retries for transient HTTP failures.
    pub max_retries: Option<u8>,
    /// Base delay for exponential backoff between retries.
    pub retry_base_delay_ms: Option<u64>,
    /// Logging configuration.
    pub log: LogSettings,
}

impl Settings {
    /// Create settings with explicit defaults.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self {
            worker_count: Some(DEFAULT_WORKER_COUNT),
            verify_concurrency: None,
            transfer_timeout_secs: Some(DEFAULT_TRANSFER_TIMEOUT_SECS),
            max_retries: Some(DEFAULT_MAX_RETRIES),
            retry_base_delay_ms: Some(DEFAULT_RETRY_BASE_DELAY_MS),
            log: LogSettings::default(),
        }
    }

    /// Decode settings from a JSON document.
    pub fn from_json(raw: &str) -> Result<Self, SettingsError> {
        let settings: Self =
            serde_json::from_str(raw).map_err(|e| SettingsError::Parse(e.to_string()))?;
        validate_settings(&settings)?;
        Ok(settings)
    }

    /// Worker count with default fallback.
    pub fn effective_worker_count(&self) -> usize {
        self.worker_count.unwrap_or(DEFAULT_WORKER_COUNT)
    }

    /// Digest concurrency with default fallback.
    pub fn effective_verify_concurrency(&self) -> usize {
        self.verify_concurrency.unwrap_or_else(|| {
            std::thread::available_parallelism().map_or(1, std::num::NonZeroUsize::get)
        })
    }

    /// Transfer timeout with default fallback.
    pub fn effective_transfer_timeout(&self) -> Duration {
        Duration::from_secs(
            self.transfer_timeout_secs
                .unwrap_or(DEFAULT_TRANSFER_TIMEOUT_SECS),
        )
    }

    /// Retry count with default fallback.
    pub fn effective_max_retries(&self) -> u8 {
        self.max_retries.unwrap_or(DEFAULT_MAX_RETRIES)
    }

    /// Backoff base with default fallback.
    pub fn effective_retry_base_delay_ms(&self) -> u64 {
        self.retry_base_delay_ms
            .unwrap_or(DEFAULT_RETRY_BASE_DELAY_MS)
    }
}

/// Check every populated field against its allowed range.
pub fn validate_settings(settings: &Settings) -> Result<(), SettingsError> {
    if let Some(workers) = settings.worker_count {
        if workers == 0 || workers > MAX_WORKER_COUNT {
            return Err(SettingsError::OutOfRange {
                field: "worker_count",
                reason: format!("must be between 1 and {MAX_WORKER_COUNT}, got {workers}"),
            });
        }
    }

    if let Some(concurrency) = settings.verify_concurrency {
        if concurrency == 0 || concurrency > MAX_VERIFY_CONCURRENCY {
            return Err(SettingsError::OutOfRange {
                field: "verify_concurrency",
                reason: format!(
                    "must be between 1 and {MAX_VERIFY_CONCURRENCY}, got {concurrency}"
                ),
            });
        }
    }

    if settings.transfer_timeout_secs == Some(0) {
        return Err(SettingsError::OutOfRange {
            field: "transfer_timeout_secs",
            reason: "must be greater than 0".to_string(),
        });
    }

    if let Some(name) = settings.log.name.as_deref() {
        if name.trim().is_empty() || name.contains(['/', '\\']) {
            return Err(SettingsError::OutOfRange {
                field: "log.name",
                reason: format!("'{name}' is not a valid file prefix"),
            });
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(validate_settings(&Settings::with_defaults()).is_ok());
        assert!(validate_settings(&Settings::default()).is_ok());
    }

    #[test]
    fn effective_values_fall_back_to_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.effective_worker_count(), DEFAULT_WORKER_COUNT);
        assert_eq!(
            settings.effective_transfer_timeout(),
            Duration::from_secs(DEFAULT_TRANSFER_TIMEOUT_SECS)
        );
        assert!(settings.effective_verify_concurrency() >= 1);
        assert_eq!(settings.log.effective_name(), DEFAULT_LOGGER_NAME);
        assert!(settings.log.effective_preserve_logs());
    }

    #[test]
    fn zero_workers_rejected() {
        let settings = Settings {
            worker_count: Some(0),
            ..Default::default()
        };
        assert!(matches!(
            validate_settings(&settings),
            Err(SettingsError::OutOfRange {
                field: "worker_count",
                ..
            })
        ));
    }

    #[test]
    fn zero_timeout_rejected() {
        let settings = Settings {
            transfer_timeout_secs: Some(0),
            ..Default::default()
        };
        assert!(validate_settings(&settings).is_err());
    }

    #[test]
    fn log_name_with_separator_rejected() {
        let mut settings = Settings::default();
        settings.log.name = Some("../evil".to_string());
        assert!(validate_settings(&settings).is_err());
    }

    #[test]
    fn partial_json_document() {
        let settings =
            Settings::from_json(r#"{ "worker_count": 4, "log": { "preserve_logs": false } }"#)
                .unwrap();
        assert_eq!(settings.effective_worker_count(), 4);
        assert!(!settings.log.effective_preserve_logs());
        assert!(settings.log.effective_console());
    }

    #[test]
    fn invalid_json_document() {
        assert!(matches!(
            Settings::from_json("{ worker_count: }"),
            Err(SettingsError::Parse(_))
        ));
        assert!(matches!(
            Settings::from_json(r#"{ "worker_count": 500 }"#),
            Err(SettingsError::OutOfRange { .. })
        ));
    }
}
