//! In-memory transfer fake for unit tests.

use std::collections::HashSet;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use patchsync_core::{TransferError, TransferPort};

/// Writes canned bytes, or fails for selected URLs.
pub struct FakeTransfer {
    body: Vec<u8>,
    failing: HashSet<String>,
    delay: Option<Duration>,
    calls: AtomicUsize,
}

impl FakeTransfer {
    pub fn succeeding(body: &[u8]) -> Self {
        Self {
            body: body.to_vec(),
            failing: HashSet::new(),
            delay: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing_for(mut self, url: &str) -> Self {
        self.failing.insert(url.to_string());
        self
    }

    pub const fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TransferPort for FakeTransfer {
    async fn transfer(&self, url: &str, destination: &Path) -> Result<u64, TransferError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.failing.contains(url) {
            return Err(TransferError::network_with_status("canned failure", 500));
        }
        tokio::fs::write(destination, &self.body)
            .await
            .map_err(|e| TransferError::from_io_error(&e))?;
        Ok(self.body.len() as u64)
    }
}
