//! # Resilience Module
//!
//! Rate-limit awareness for the Sim client.
//!
//! | Component | Description |
//! |-----------|-------------|
//! | [`rate_limit`] | Tracks the last rate-limit snapshot seen in response headers |
//! | [`retry`] | Backoff-with-jitter loop that retries rate-limited executions |
//!
//! ## Retry
//!
//! ```rust
//! use simstudio::resilience::retry::RetryPolicy;
//! use std::time::Duration;
//!
//! let policy = RetryPolicy::new()
//!     .with_max_retries(5)
//!     .with_initial_delay(Duration::from_millis(500))
//!     .with_max_delay(Duration::from_secs(10));
//! assert_eq!(policy.backoff_multiplier, 2.0);
//! ```

pub mod rate_limit;
pub mod retry;

