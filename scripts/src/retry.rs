//! Bounded retries with exponential backoff for transient failures

use std::{future::Future, time::Duration};

use backon::{ExponentialBuilder, Retryable};
use tracing::warn;

use crate::{
    constants::{
        DEFAULT_ATTEMPT_TIMEOUT, DEFAULT_INITIAL_BACKOFF, DEFAULT_MAX_ATTEMPTS,
        DEFAULT_MAX_BACKOFF,
    },
    errors::ScriptError,
};

/// How a network operation is retried
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    /// The total number of attempts, including the first
    pub max_attempts: usize,
    /// The delay before the first retry
    pub initial_backoff: Duration,
    /// The upper bound on the delay between retries
    pub max_backoff: Duration,
    /// The timeout of a single attempt
    pub attempt_timeout: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            initial_backoff: DEFAULT_INITIAL_BACKOFF,
            max_backoff: DEFAULT_MAX_BACKOFF,
            attempt_timeout: DEFAULT_ATTEMPT_TIMEOUT,
        }
    }
}

impl RetryPolicy {
    /// The doubling backoff between attempts, capped at `max_backoff`
    pub fn backoff(&self) -> ExponentialBuilder {
        ExponentialBuilder::default()
            .with_min_delay(self.initial_backoff)
            .with_max_delay(self.max_backoff)
            .with_factor(2.0)
            .with_max_times(self.max_attempts.saturating_sub(1))
    }
}

/// Runs `op` until it succeeds, fails with a non-retryable error, or exhausts
/// the policy's attempts. Each attempt is bounded by the attempt timeout.
pub async fn with_retries<T, F, Fut>(
    policy: &RetryPolicy,
    stage: &str,
    mut op: F,
) -> Result<T, ScriptError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ScriptError>>,
{
    let attempt_timeout = policy.attempt_timeout;
    let attempt = || {
        let fut = op();
        async move {
            tokio::time::timeout(attempt_timeout, fut)
                .await
                .unwrap_or_else(|_| {
                    Err(ScriptError::Timeout(format!("{stage} after {attempt_timeout:?}")))
                })
        }
    };

    attempt
        .retry(&policy.backoff())
        .when(ScriptError::is_retryable)
        .notify(|e, delay| warn!("{stage}: attempt failed ({e}), retrying in {delay:?}"))
        .await
}
