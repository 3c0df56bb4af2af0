//! Bounded exponential backoff with jitter
//!
//! Wraps any fallible asynchronous operation. Errors are classified
//! through [`RetryClass`]: transient failures are retried with capped
//! exponential backoff, terminal failures propagate immediately.

use rand::Rng;
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;
use tracing::debug;

use budgetease_types::RetryClass;

/// Hard ceiling on a single backoff delay, jitter included.
const MAX_DELAY_MS: u64 = 10_000;

/// Upper bound (exclusive) of the uniform jitter in milliseconds.
const JITTER_MS: u64 = 100;

/// Retry policy for transient store/transport failures
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    max_retries: u32,
    base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_millis(1000),
        }
    }
}

impl RetryPolicy {
    /// Create a policy with explicit bounds
    pub fn new(max_retries: u32, base_delay: Duration) -> Self {
        Self {
            max_retries,
            base_delay,
        }
    }

    /// Total attempts this policy will make
    ///
    /// The loop runs exactly `max_retries` attempts, except that zero
    /// still attempts once.
    pub fn attempts(&self) -> u32 {
        self.max_retries.max(1)
    }

    /// Backoff delay after the given zero-based failed attempt
    ///
    /// `base_delay * 2^attempt` plus uniform jitter in `[0, 100)` ms,
    /// capped at 10 seconds after the jitter is added.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let base = self.base_delay.as_millis() as u64;
        let backoff = base.saturating_mul(2u64.saturating_pow(attempt));
        let jitter = rand::thread_rng().gen_range(0..JITTER_MS);
        Duration::from_millis(backoff.saturating_add(jitter).min(MAX_DELAY_MS))
    }

    /// Run an operation under this policy
    ///
    /// Returns the first success, the first terminal error, or the last
    /// retryable error once attempts are exhausted.
    pub async fn run<T, E, F, Fut>(&self, mut op: F) -> Result<T, E>
    where
        E: RetryClass,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let attempts = self.attempts();
        let mut attempt = 0;

        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(err) => {
                    if !err.is_retryable() {
                        return Err(err);
                    }

                    attempt += 1;
                    if attempt >= attempts {
                        return Err(err);
                    }

                    let delay = self.delay_for(attempt - 1);
                    debug!(attempt, ?delay, "transient failure, retrying");
                    sleep(delay).await;
                }
            }
        }
    }
}
