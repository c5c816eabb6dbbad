use std::future::Future;
use std::time::Duration;

use crate::error::SequenceError;

pub struct RetryConfig {
    pub max_attempts: u32,
    pub initial_delay: Duration,
    pub backoff_factor: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_millis(100),
            backoff_factor: 2.0,
        }
    }
}

/// Re-runs `f` while it fails with a retryable [`SequenceError`].
///
/// `f` must open and finish its own transaction: after a lock, serialization or first-use
/// conflict nothing read inside the failed attempt can be trusted.
pub async fn retry_transaction<F, Fut, T>(config: &RetryConfig, mut f: F) -> Result<T, SequenceError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, SequenceError>>,
{
    let mut delay = config.initial_delay;
    let mut attempt = 1;

    loop {
        match f().await {
            Ok(v) => return Ok(v),
            Err(e) if e.is_retryable() && attempt < config.max_attempts => {
                tracing::warn!(attempt, max_attempts = config.max_attempts, error = %e, "retrying transaction");
                tokio::time::sleep(delay).await;
                delay = Duration::from_secs_f64(delay.as_secs_f64() * config.backoff_factor);
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}
