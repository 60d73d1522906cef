//! Shared reqwest client with retry for transient failures.

use tokio::time::sleep;
use tracing::{debug, warn};
use url::Url;

use crate::config::{HttpConfig, USER_AGENT};
use crate::error::{HttpError, HttpResult};

/// Reqwest client plus the retry policy every adapter shares.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: reqwest::Client,
    config: HttpConfig,
}

impl HttpClient {
    /// Build a client from configuration.
    pub fn new(config: HttpConfig) -> HttpResult<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .connect_timeout(config.connect_timeout)
            .timeout(config.request_timeout)
            .build()?;
        Ok(Self { client, config })
    }

    /// Active configuration.
    pub const fn config(&self) -> &HttpConfig {
        &self.config
    }

    /// GET `url`, retrying 5xx answers and transport errors with
    /// exponential backoff. 4xx answers fail immediately.
    pub async fn fetch_with_retry(&self, url: &Url) -> HttpResult<reqwest::Response> {
        let mut attempt: u8 = 0;
        loop {
            if attempt > 0 {
                let delay = self.config.backoff(attempt);
                debug!(%url, attempt, ?delay, "Retrying request");
                sleep(delay).await;
            }

            let error = match self.client.get(url.as_str()).send().await {
                Ok(response) if response.status().is_success() => return Ok(response),
                Ok(response) => HttpError::Status {
                    status: response.status().as_u16(),
                    url: url.to_string(),
                },
                Err(e) => HttpError::Request(e),
            };

            if !error.is_transient() || attempt >= self.config.max_retries {
                return Err(error);
            }
            warn!(%url, attempt, error = %error, "Transient request failure");
            attempt += 1;
        }
    }
}

/// Parse a URL string, keeping the input in the error.
pub fn parse_url(raw: &str) -> HttpResult<Url> {
    Url::parse(raw).map_err(|e| HttpError::InvalidUrl {
        url: raw.to_string(),
        message: e.to_string(),
    })
}
