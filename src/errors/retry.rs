//! Retry policy for remote fetches.
//!
//! Storage never retries; only the HTTP fetch layer goes through here.

use std::future::Future;
use std::time::Duration;

use rand::Rng;
use tracing::{debug, warn};

use super::types::ExploitDbError;

/// Backoff settings for one fetch operation.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    pub max_retries: u32,
    /// First backoff step. Doubles per attempt, plus up to one step of jitter.
    pub base_delay: Duration,
    pub max_delay: Duration,
    /// Wait used when a rate-limited response does not say when to come back.
    pub rate_limit_fallback: Duration,
    /// Upper bound on a server-announced rate-limit wait.
    pub max_rate_limit_wait: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
            rate_limit_fallback: Duration::from_secs(60),
            // GitHub quotas reset at least hourly
            max_rate_limit_wait: Duration::from_secs(3600),
        }
    }
}

impl RetryConfig {
    /// No waiting between attempts.
    pub fn immediate(max_retries: u32) -> Self {
        Self {
            max_retries,
            base_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
            rate_limit_fallback: Duration::ZERO,
            max_rate_limit_wait: Duration::ZERO,
        }
    }

    /// How long to wait before attempt `attempt + 1` after `error`.
    ///
    /// Rate-limited responses wait until the announced reset; everything else
    /// backs off exponentially.
    pub fn delay_for(&self, error: &ExploitDbError, attempt: u32) -> Duration {
        match error {
            ExploitDbError::RateLimit { retry_after: Some(wait), .. } => (*wait).min(self.max_rate_limit_wait),
            ExploitDbError::RateLimit { retry_after: None, .. } => self.rate_limit_fallback,
            _ => self.backoff(attempt),
        }
    }

    fn backoff(&self, attempt: u32) -> Duration {
        if self.base_delay.is_zero() {
            return Duration::ZERO;
        }
        let step = self.base_delay.saturating_mul(1u32 << attempt.min(16));
        let jitter = rand::thread_rng().gen_range(Duration::ZERO..self.base_delay);
        (step + jitter).min(self.max_delay)
    }
}

/// Run `factory` until it succeeds, fails with a non-retryable error, or
/// `max_retries` retries are used up. The last error is returned.
pub async fn with_retry<F, Fut, T>(
    operation: &str,
    config: &RetryConfig,
    mut factory: F,
) -> Result<T, ExploitDbError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ExploitDbError>>,
{
    let mut attempt = 0;
    loop {
        let err = match factory().await {
            Ok(value) => return Ok(value),
            Err(e) => e,
        };

        let class = err.classify();
        if !class.retryable {
            debug!(operation, error_type = class.error_type, "Not retrying");
            return Err(err);
        }
        if attempt >= config.max_retries {
            warn!(operation, attempts = attempt + 1, error = %err, "Giving up");
            return Err(err);
        }

        let delay = config.delay_for(&err, attempt);
        warn!(
            operation,
            attempt = attempt + 1,
            error_type = class.error_type,
            delay_secs = delay.as_secs(),
            error = %err,
            "Retrying fetch"
        );
        tokio::time::sleep(delay).await;
        attempt += 1;
    }
}
