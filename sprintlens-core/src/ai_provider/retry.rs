//! Retry decorator for analysis providers
//!
//! Wraps a single-attempt [`AnalysisProvider`] and retries rate-limited calls
//! with exponential backoff. Every other failure is returned immediately.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::sleep;
use tracing::{debug, warn};

use crate::ai_provider::{AIError, AnalysisProvider};

/// Backoff schedule for rate-limited calls
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Retries after the first attempt
    pub max_retries: u32,
    /// Delay before the first retry; doubles for each further retry
    pub initial_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 2,
            initial_backoff: Duration::from_secs(5),
        }
    }
}

impl RetryPolicy {
    /// Delay before retry number `retry` (1-based)
    pub fn backoff_for(&self, retry: u32) -> Duration {
        self.initial_backoff * 2u32.saturating_pow(retry.saturating_sub(1))
    }
}

pub struct RetryingProvider {
    inner: Arc<dyn AnalysisProvider>,
    policy: RetryPolicy,
}

impl RetryingProvider {
    pub fn new(inner: Arc<dyn AnalysisProvider>, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }
}

#[async_trait::async_trait]
impl AnalysisProvider for RetryingProvider {
    async fn send(&self, prompt: &str) -> Result<String, AIError> {
        let mut retry = 0;
        loop {
            debug!(
                attempt = retry + 1,
                max_attempts = self.policy.max_retries + 1,
                "Dispatching analysis request"
            );
            match self.inner.send(prompt).await {
                Ok(text) => return Ok(text),
                Err(e) if e.is_retryable() && retry < self.policy.max_retries => {
                    retry += 1;
                    let backoff = self.policy.backoff_for(retry);
                    warn!(
                        retry,
                        backoff_secs = backoff.as_secs(),
                        "Rate limited by {}, retrying",
                        self.inner.provider_name()
                    );
                    sleep(backoff).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    fn provider_name(&self) -> &str {
        self.inner.provider_name()
    }
}
