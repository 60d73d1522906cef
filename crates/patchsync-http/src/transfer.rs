//! Streaming file transfer over HTTP.

use std::path::Path;

use async_trait::async_trait;
use futures_util::StreamExt;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

use patchsync_core::{TransferError, TransferPort};

use crate::client::{HttpClient, parse_url};
use crate::config::HttpConfig;
use crate::error::HttpResult;

/// [`TransferPort`] backed by reqwest.
///
/// Bodies are streamed chunk by chunk onto disk. A failed transfer never
/// leaves a partial file behind.
#[derive(Debug, Clone)]
pub struct HttpTransfer {
    client: HttpClient,
}

impl HttpTransfer {
    /// Create a transfer adapter.
    pub fn new(config: HttpConfig) -> HttpResult<Self> {
        Ok(Self {
            client: HttpClient::new(config)?,
        })
    }

    /// Share an existing client.
    pub const fn with_client(client: HttpClient) -> Self {
        Self { client }
    }

    async fn stream_to(&self, url: &str, destination: &Path) -> HttpResult<u64> {
        let url = parse_url(url)?;
        let response = self.client.fetch_with_retry(&url).await?;

        let mut file = File::create(destination).await?;
        let mut stream = response.bytes_stream();
        let mut written: u64 = 0;

        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            file.write_all(&chunk).await?;
            written += chunk.len() as u64;
        }
        file.flush().await?;
        file.sync_all().await?;

        Ok(written)
    }
}

#[async_trait]
impl TransferPort for HttpTransfer {
    async fn transfer(&self, url: &str, destination: &Path) -> Result<u64, TransferError> {
        match self.stream_to(url, destination).await {
            Ok(bytes) => {
                debug!(url, path = %destination.display(), bytes, "Transfer finished");
                Ok(bytes)
            }
            Err(e) => {
                discard_partial(destination).await;
                Err(e.into_transfer_error())
            }
        }
    }
}

async fn discard_partial(path: &Path) {
    if let Err(e) = tokio::fs::remove_file(path).await {
        if e.kind() != std::io::ErrorKind::NotFound {
            warn!(path = %path.display(), error = %e, "Could not remove partial download");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_server::{Reply, serve};

    fn fast_config() -> HttpConfig {
        HttpConfig {
            max_retries: 1,
            retry_base_delay_ms: 1,
            ..HttpConfig::default()
        }
    }

    #[tokio::test]
    async fn streams_body_to_destination() {
        let url = serve(vec![Reply::ok(b"payload bytes")]).await;
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("file.bin");

        let transfer = HttpTransfer::new(fast_config()).unwrap();
        let bytes = transfer.transfer(&url, &dest).await.unwrap();

        assert_eq!(bytes, 13);
        assert_eq!(std::fs::read(&dest).unwrap(), b"payload bytes");
    }

    #[tokio::test]
    async fn client_error_leaves_no_file() {
        let url = serve(vec![Reply::status(404)]).await;
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("file.bin");

        let transfer = HttpTransfer::new(fast_config()).unwrap();
        let err = transfer.transfer(&url, &dest).await.unwrap_err();

        assert!(matches!(
            err,
            TransferError::Network {
                status_code: Some(404),
                ..
            }
        ));
        assert!(!dest.exists());
    }

    #[tokio::test]
    async fn server_error_is_retried() {
        let url = serve(vec![Reply::status(503), Reply::ok(b"ok")]).await;
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("file.bin");

        let transfer = HttpTransfer::new(fast_config()).unwrap();
        transfer.transfer(&url, &dest).await.unwrap();

        assert_eq!(std::fs::read(&dest).unwrap(), b"ok");
    }

    #[tokio::test]
    async fn invalid_url_is_a_network_error() {
        let dir = tempfile::tempdir().unwrap();
        let transfer = HttpTransfer::new(fast_config()).unwrap();
        let err = transfer
            .transfer("not a url", &dir.path().join("x"))
            .await
            .unwrap_err();
        assert!(matches!(err, TransferError::Network { status_code: None, .. }));
    }
}
