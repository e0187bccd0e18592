//! Retry with exponential backoff and jitter for rate-limited calls.
//!
//! The loop only ever retries errors coded
//! [`ErrorCode::RateLimitExceeded`]; everything else is returned on the spot.
//! Waiting goes through a [`Sleeper`] and jitter through a [`JitterSource`] so
//! tests can observe the schedule without real delays.
//!
//! A backoff sleep blocks the calling thread and cannot be cancelled once it
//! has started; the only deadline in play is the per-request timeout.

use crate::error::ClientError;
use crate::error_code::ErrorCode;
use crate::{Error, Result};
use rand::Rng;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Lower bound of the multiplicative jitter applied to every wait.
pub const JITTER_MIN: f64 = 0.75;
/// Width of the jitter window; waits land in `[0.75, 1.25]` of the base.
pub const JITTER_SPAN: f64 = 0.5;

/// Blocks the calling thread between attempts.
pub trait Sleeper: Send + Sync {
    fn sleep(&self, duration: Duration);
}

/// [`Sleeper`] backed by [`std::thread::sleep`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Source of uniformly distributed values in `[0, 1)`.
pub trait JitterSource: Send + Sync {
    fn next_unit(&self) -> f64;
}

/// [`JitterSource`] backed by the thread-local RNG.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadRngJitter;

impl JitterSource for ThreadRngJitter {
    fn next_unit(&self) -> f64 {
        rand::thread_rng().gen::<f64>()
    }
}

/// Backoff schedule for rate-limited executions.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Retries after the first attempt; total attempts are `max_retries + 1`.
    pub max_retries: u32,
    pub initial_delay: Duration,
    /// Cap on the exponential delay. A server retry-after hint is not capped.
    pub max_delay: Duration,
    pub backoff_multiplier: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
            backoff_multiplier: 2.0,
        }
    }
}

impl RetryPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = delay;
        self
    }

    pub fn with_max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    pub fn with_backoff_multiplier(mut self, multiplier: f64) -> Self {
        self.backoff_multiplier = multiplier;
        self
    }

    /// Wait before the next attempt, before jitter.
    ///
    /// A non-zero server hint wins; otherwise the running delay capped at
    /// `max_delay`.
    pub fn base_wait(&self, delay_secs: f64, hint: Option<Duration>) -> Duration {
        if let Some(hint) = hint.filter(|h| !h.is_zero()) {
            return hint;
        }
        Duration::try_from_secs_f64(delay_secs)
            .map(|d| d.min(self.max_delay))
            .unwrap_or(self.max_delay)
    }
}

/// Scales `wait` by a factor in `[0.75, 1.25]` chosen by `unit` in `[0, 1)`.
pub fn apply_jitter(wait: Duration, unit: f64) -> Duration {
    let factor = JITTER_MIN + unit.clamp(0.0, 1.0) * JITTER_SPAN;
    Duration::try_from_secs_f64(wait.as_secs_f64() * factor).unwrap_or(wait)
}

/// Drives an operation through a [`RetryPolicy`].
///
/// Attempt counters and the running delay live on the stack of each
/// [`run`](Self::run) call, so concurrent callers keep separate schedules.
#[derive(Clone)]
pub struct RetryExecutor {
    policy: RetryPolicy,
    sleeper: Arc<dyn Sleeper>,
    jitter: Arc<dyn JitterSource>,
}

impl RetryExecutor {
    pub fn new(policy: RetryPolicy) -> Self {
        Self {
            policy,
            sleeper: Arc::new(ThreadSleeper),
            jitter: Arc::new(ThreadRngJitter),
        }
    }

    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    pub fn with_jitter(mut self, jitter: Arc<dyn JitterSource>) -> Self {
        self.jitter = jitter;
        self
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Run `operation` until it succeeds, fails with a non-rate-limit error, or
    /// runs out of attempts.
    ///
    /// `operation` receives the 0-based attempt index. `retry_after_hint` is
    /// consulted after each rate-limited attempt. The final rate-limit error is
    /// returned as is.
    pub fn run<T, F, H>(&self, mut operation: F, retry_after_hint: H) -> Result<T>
    where
        F: FnMut(u32) -> Result<T>,
        H: Fn() -> Option<Duration>,
    {
        let max_retries = self.policy.max_retries;
        let mut delay_secs = self.policy.initial_delay.as_secs_f64();
        let mut last_error: Option<Error> = None;

        for attempt in 0..=max_retries {
            let err = match operation(attempt) {
                Ok(value) => {
                    if attempt > 0 {
                        debug!(attempt, "succeeded after rate-limit retries");
                    }
                    return Ok(value);
                }
                Err(err) if !err.is_rate_limited() => return Err(err),
                Err(err) => err,
            };

            if attempt == max_retries {
                last_error = Some(err);
                break;
            }

            let base = self.policy.base_wait(delay_secs, retry_after_hint());
            let wait = apply_jitter(base, self.jitter.next_unit());
            warn!(
                attempt,
                max_retries,
                base_wait_ms = base.as_millis() as u64,
                wait_ms = wait.as_millis() as u64,
                "rate limited; backing off before retry"
            );
            last_error = Some(err);
            self.sleeper.sleep(wait);

            delay_secs *= self.policy.backoff_multiplier;
        }

        Err(last_error.unwrap_or_else(|| {
            ClientError::new("Max retries exceeded")
                .with_code(ErrorCode::MaxRetriesExceeded)
                .into()
        }))
    }
}

impl std::fmt::Debug for RetryExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RetryExecutor")
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}
