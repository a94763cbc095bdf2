//! Retry of transient upstream failures with exponential backoff

use crate::config::AgricultureConfig;
use agrocam_llm::{SharedProvider, ToolCompletionRequest, ToolCompletionResponse};
use backoff::ExponentialBackoff;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;
use tracing::warn;

/// How often and how long a model call is retried
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Retries after the first attempt
    pub max_retries: u32,
    /// Delay before the first retry
    pub initial_interval: Duration,
    /// Give up once this much time has passed
    pub max_elapsed: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_interval: Duration::from_millis(500),
            max_elapsed: Duration::from_secs(30),
        }
    }
}

impl RetryPolicy {
    /// Policy derived from `max_retries` and `timeout_secs`
    #[must_use]
    pub fn from_config(config: &AgricultureConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            max_elapsed: config.timeout(),
            ..Self::default()
        }
    }

    /// Single attempt
    #[must_use]
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }

    /// Set the first retry delay
    #[must_use]
    pub fn with_initial_interval(mut self, interval: Duration) -> Self {
        self.initial_interval = interval;
        self
    }

    fn backoff(&self) -> ExponentialBackoff {
        ExponentialBackoff {
            initial_interval: self.initial_interval,
            current_interval: self.initial_interval,
            max_elapsed_time: Some(self.max_elapsed),
            ..Default::default()
        }
    }
}

/// Call the provider, retrying rate limits and server errors
pub async fn complete_with_retry(
    provider: &SharedProvider,
    request: ToolCompletionRequest,
    policy: &RetryPolicy,
) -> agrocam_llm::Result<ToolCompletionResponse> {
    let attempts = AtomicU32::new(0);
    backoff::future::retry(policy.backoff(), || {
        let request = request.clone();
        let attempt = attempts.fetch_add(1, Ordering::Relaxed);
        async move {
            provider.complete_with_tools(request).await.map_err(|e| {
                if e.is_transient() && attempt < policy.max_retries {
                    warn!(attempt = attempt + 1, error = %e, "Transient model failure, retrying");
                    backoff::Error::transient(e)
                } else {
                    backoff::Error::permanent(e)
                }
            })
        }
    })
    .await
}
