//! Exponential backoff around fallible async operations.
//!
//! [`RetryPolicy`] is applied explicitly at the call site: the router hands
//! it a closure that starts one strategy attempt, and the policy decides
//! whether and when to call it again.
//!
//! # Backoff Strategy
//!
//! ```text
//! delay(n) = min(initial_delay * 2^(n-1), max_delay) + random_jitter(0..=jitter)
//! ```
//!
//! With the defaults (3 attempts, 4 s, 60 s cap, no jitter) a request that
//! keeps failing waits exactly 4 s and then 8 s before the third and last
//! attempt.
//!
//! Only transient errors (see [`ExtractError::is_transient`]) are retried.
//! Anything else is returned immediately.

use rand::{Rng, rng};
use std::future::Future;
use std::time::Duration;
use tokio::time::{Instant, sleep};
use tracing::{error, instrument, warn};

use crate::error::ExtractError;

#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total number of attempts, including the first.
    attempts: usize,
    /// Delay after the first failure; doubles with each further failure.
    initial_delay: Duration,
    /// Cap on a single delay.
    max_delay: Duration,
    /// Upper bound of random jitter added to each delay.
    jitter: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy::new(3, Duration::from_secs(4), Duration::from_secs(60))
    }
}

impl RetryPolicy {
    /// Create a policy without jitter.
    ///
    /// `attempts` is clamped to at least one.
    pub fn new(attempts: usize, initial_delay: Duration, max_delay: Duration) -> Self {
        Self {
            attempts: attempts.max(1),
            initial_delay,
            max_delay,
            jitter: Duration::ZERO,
        }
    }

    pub fn with_jitter(mut self, jitter: Duration) -> Self {
        self.jitter = jitter;
        self
    }

    pub fn attempts(&self) -> usize {
        self.attempts
    }

    /// Backoff before the next attempt after `failures` consecutive failures,
    /// excluding jitter.
    pub fn delay_for(&self, failures: usize) -> Duration {
        let exponent = failures.saturating_sub(1).min(31) as u32;
        self.initial_delay
            .saturating_mul(1u32 << exponent)
            .min(self.max_delay)
    }

    fn jitter(&self) -> Duration {
        let max_ms = self.jitter.as_millis() as u64;
        if max_ms == 0 {
            return Duration::ZERO;
        }
        Duration::from_millis(rng().random_range(0..=max_ms))
    }

    /// Run `op` until it succeeds, fails with a non-transient error, or the
    /// attempts are used up. The last error is returned on exhaustion.
    #[instrument(level = "debug", skip(self, op))]
    pub async fn run<T, F, Fut>(&self, what: &str, mut op: F) -> Result<T, ExtractError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, ExtractError>>,
    {
        let total_t0 = Instant::now();
        let mut failures = 0usize;

        loop {
            let attempt_t0 = Instant::now();
            let err = match op().await {
                Ok(value) => return Ok(value),
                Err(e) => e,
            };
            failures += 1;

            if !err.is_transient() {
                return Err(err);
            }
            if failures >= self.attempts {
                error!(
                    what,
                    attempts = failures,
                    elapsed_ms_total = total_t0.elapsed().as_millis() as u64,
                    error = %err,
                    "Exhausted retries"
                );
                return Err(err);
            }

            let delay = self.delay_for(failures) + self.jitter();
            warn!(
                what,
                attempt = failures,
                max = self.attempts,
                elapsed_ms_attempt = attempt_t0.elapsed().as_millis() as u64,
                ?delay,
                error = %err,
                "Attempt failed; backing off"
            );
            sleep(delay).await;
        }
    }
}
