//! HTTP client configuration.

use std::time::Duration;

use patchsync_core::Settings;

/// User agent sent with every request.
pub const USER_AGENT: &str = concat!("patchsync/", env!("CARGO_PKG_VERSION"));

/// Configuration for the HTTP adapters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpConfig {
    /// Retries for transient failures.
    pub max_retries: u8,
    /// Base delay for exponential backoff.
    pub retry_base_delay_ms: u64,
    /// Connection establishment budget.
    pub connect_timeout: Duration,
    /// Whole-request budget.
    pub request_timeout: Duration,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self::from_settings(&Settings::default())
    }
}

impl HttpConfig {
    /// Derive HTTP configuration from engine settings.
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            max_retries: settings.effective_max_retries(),
            retry_base_delay_ms: settings.effective_retry_base_delay_ms(),
            connect_timeout: Duration::from_secs(30),
            request_timeout: settings.effective_transfer_timeout(),
        }
    }

    /// Backoff before retry `attempt` (1-based).
    pub fn backoff(&self, attempt: u8) -> Duration {
        let exponent = u32::from(attempt.saturating_sub(1)).min(16);
        Duration::from_millis(self.retry_base_delay_ms.saturating_mul(2u64.pow(exponent)))
    }
}
