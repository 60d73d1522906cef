//! Manifest source adapters.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use patchsync_core::{ManifestSourcePort, SourceError};

use crate::client::{HttpClient, parse_url};
use crate::config::HttpConfig;
use crate::error::HttpResult;

/// Fetches manifests over HTTP(S).
#[derive(Debug, Clone)]
pub struct HttpManifestSource {
    client: HttpClient,
}

impl HttpManifestSource {
    /// Create a source with its own client.
    pub fn new(config: HttpConfig) -> HttpResult<Self> {
        Ok(Self {
            client: HttpClient::new(config)?,
        })
    }

    /// Share an existing client.
    pub const fn with_client(client: HttpClient) -> Self {
        Self { client }
    }

    async fn fetch_text(&self, location: &str) -> HttpResult<String> {
        let url = parse_url(location)?;
        let response = self.client.fetch_with_retry(&url).await?;
        Ok(response.text().await?)
    }
}

#[async_trait]
impl ManifestSourcePort for HttpManifestSource {
    async fn fetch(&self, location: &str) -> Result<String, SourceError> {
        debug!(location, "Fetching manifest over HTTP");
        self.fetch_text(location)
            .await
            .map_err(|e| e.into_source_error(location))
    }
}

/// Reads manifests from the local filesystem.
///
/// Accepts plain paths and `file://` URLs.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileManifestSource;

#[async_trait]
impl ManifestSourcePort for FileManifestSource {
    async fn fetch(&self, location: &str) -> Result<String, SourceError> {
        let path = file_location(location);
        debug!(path = %path.display(), "Reading manifest from disk");
        tokio::fs::read_to_string(&path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                SourceError::NotFound {
                    location: location.to_string(),
                }
            } else {
                SourceError::Io {
                    location: location.to_string(),
                    message: e.to_string(),
                }
            }
        })
    }
}

fn file_location(location: &str) -> PathBuf {
    url::Url::parse(location)
        .ok()
        .filter(|url| url.scheme() == "file")
        .and_then(|url| url.to_file_path().ok())
        .unwrap_or_else(|| Path::new(location).to_path_buf())
}

/// True when `location` should be fetched over the network.
pub fn is_remote(location: &str) -> bool {
    let lower = location.trim_start().to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

/// Pick the adapter matching `location`.
pub fn source_for(location: &str, config: HttpConfig) -> HttpResult<Arc<dyn ManifestSourcePort>> {
    if is_remote(location) {
        Ok(Arc::new(HttpManifestSource::new(config)?))
    } else {
        Ok(Arc::new(FileManifestSource))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_server::{Reply, serve};

    #[test]
    fn classifies_locations() {
        assert!(is_remote("https://cdn.example/update.json"));
        assert!(is_remote("HTTP://cdn.example/update.json"));
        assert!(!is_remote("/srv/update.json"));
        assert!(!is_remote("file:///srv/update.json"));
    }

    #[tokio::test]
    async fn reads_local_manifest() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("update.json");
        std::fs::write(&path, "{}").unwrap();

        let text = FileManifestSource
            .fetch(path.to_str().unwrap())
            .await
            .unwrap();
        assert_eq!(text, "{}");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn reads_file_url() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("update.json");
        std::fs::write(&path, "{\"a\":1}").unwrap();

        let location = format!("file://{}", path.display());
        let text = FileManifestSource.fetch(&location).await.unwrap();
        assert_eq!(text, "{\"a\":1}");
    }

    #[tokio::test]
    async fn missing_local_manifest_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let location = dir.path().join("absent.json");
        let location = location.to_str().unwrap();

        let err = FileManifestSource.fetch(location).await.unwrap_err();
        assert_eq!(
            err,
            SourceError::NotFound {
                location: location.to_string()
            }
        );
    }

    #[tokio::test]
    async fn fetches_remote_manifest() {
        let url = serve(vec![Reply::ok(b"{\"meta\":{}}")]).await;
        let source = HttpManifestSource::new(HttpConfig::default()).unwrap();
        assert_eq!(source.fetch(&url).await.unwrap(), "{\"meta\":{}}");
    }

    #[tokio::test]
    async fn remote_404_is_not_found() {
        let url = serve(vec![Reply::status(404)]).await;
        let source = HttpManifestSource::new(HttpConfig::default()).unwrap();
        assert_eq!(
            source.fetch(&url).await.unwrap_err(),
            SourceError::NotFound { location: url }
        );
    }
}
