use std::future::Future;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use crate::collectors::{CollectorError, CollectorResult};

/// Deadline and cancellation applied to every collaborator call of a scan
#[derive(Debug, Clone)]
pub struct ScanContext {
    cancel: CancellationToken,
    call_timeout: Duration,
}

impl ScanContext {
    pub fn new(call_timeout: Duration) -> Self {
        Self {
            cancel: CancellationToken::new(),
            call_timeout,
        }
    }

    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn ensure_active(&self) -> CollectorResult<()> {
        if self.cancel.is_cancelled() {
            Err(CollectorError::cancelled())
        } else {
            Ok(())
        }
    }

    /// Runs one call, failing on cancellation or when the deadline passes
    pub async fn call<T, F>(&self, call: F) -> CollectorResult<T>
    where
        F: Future<Output = CollectorResult<T>>,
    {
        self.ensure_active()?;
        tokio::select! {
            _ = self.cancel.cancelled() => Err(CollectorError::cancelled()),
            result = tokio::time::timeout(self.call_timeout, call) => match result {
                Ok(result) => result,
                Err(_) => Err(CollectorError::timeout(self.call_timeout.as_secs())),
            },
        }
    }
}

impl Default for ScanContext {
    fn default() -> Self {
        Self::new(Duration::from_secs(60))
    }
}
