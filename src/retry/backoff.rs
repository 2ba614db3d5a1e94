//! Bounded retry with exponential backoff for async operations

use std::fmt;
use std::future::Future;
use std::time::Duration;

use tracing::error;

use crate::config::{
    Config, DEFAULT_RETRY_BASE_DELAY_SECS, DEFAULT_RETRY_MAX_ATTEMPTS,
    DEFAULT_RETRY_MAX_DELAY_SECS, DEFAULT_RETRY_MULTIPLIER,
};

#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
    pub multiplier: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_RETRY_MAX_ATTEMPTS,
            base_delay: Duration::from_secs(DEFAULT_RETRY_BASE_DELAY_SECS),
            max_delay: Duration::from_secs(DEFAULT_RETRY_MAX_DELAY_SECS),
            multiplier: DEFAULT_RETRY_MULTIPLIER,
        }
    }
}

impl RetryPolicy {
    pub fn from_config(config: &Config) -> Self {
        Self {
            max_attempts: config.retry_max_attempts.max(1),
            base_delay: Duration::from_secs(config.retry_base_delay_secs),
            ..Self::default()
        }
    }

    /// Backoff delay applied after the given 1-indexed failed attempt.
    ///
    /// `delay(i) = min(max_delay, base_delay * multiplier^(i-1))`; the cap is
    /// applied after the multiply so the delay never exceeds `max_delay`.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(64) as i32;
        let secs = self.base_delay.as_secs_f64() * self.multiplier.powi(exponent);
        if !secs.is_finite() {
            return self.max_delay;
        }
        Duration::from_secs_f64(secs.min(self.max_delay.as_secs_f64()))
    }
}

/// Run `operation` under the retry budget of `policy`.
///
/// Attempt 1 runs immediately. Every failed attempt is logged before its
/// backoff sleep. Once `max_attempts` consecutive attempts have failed, the
/// error from the final attempt is returned as-is, so callers can still match
/// on the underlying failure kind.
pub async fn retry_with_backoff<F, Fut, T, E>(
    policy: &RetryPolicy,
    context: &str,
    operation: F,
) -> Result<T, E>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: fmt::Display,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 0;

    loop {
        attempt += 1;

        match operation().await {
            Ok(result) => return Ok(result),
            Err(e) if attempt >= max_attempts => {
                error!(
                    "{} failed after {}/{} attempts: {}",
                    context, attempt, max_attempts, e
                );
                return Err(e);
            }
            Err(e) => {
                let delay = policy.delay_for(attempt);
                error!(
                    "Attempt {}/{} failed for {}: {}. Retrying in {:.1}s...",
                    attempt,
                    max_attempts,
                    context,
                    e,
                    delay.as_secs_f64()
                );

                tokio::time::sleep(delay).await;
            }
        }
    }
}
