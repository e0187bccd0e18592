//! Rate-limit state derived from response headers.

use arc_swap::ArcSwapOption;
use reqwest::header::HeaderMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

pub const HEADER_LIMIT: &str = "x-ratelimit-limit";
pub const HEADER_REMAINING: &str = "x-ratelimit-remaining";
pub const HEADER_RESET: &str = "x-ratelimit-reset";
pub const HEADER_RETRY_AFTER: &str = "retry-after";

/// Rate-limit figures from the most recent response that carried them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitSnapshot {
    pub limit: u64,
    pub remaining: u64,
    /// Reset time exactly as the server sent it.
    pub reset: u64,
    /// `Retry-After` converted from seconds to milliseconds.
    pub retry_after_ms: Option<u64>,
}

impl RateLimitSnapshot {
    /// Builds a snapshot when at least one of limit/remaining/reset is present.
    ///
    /// Missing or unparseable figures become 0 so a partial header set never
    /// leaves stale numbers behind.
    pub fn from_headers(headers: &HeaderMap) -> Option<Self> {
        let limit = header_value(headers, HEADER_LIMIT);
        let remaining = header_value(headers, HEADER_REMAINING);
        let reset = header_value(headers, HEADER_RESET);

        if limit.is_none() && remaining.is_none() && reset.is_none() {
            return None;
        }

        let retry_after_ms = header_value(headers, HEADER_RETRY_AFTER)
            .and_then(|s| s.parse::<u64>().ok())
            .map(|secs| secs.saturating_mul(1000));

        Some(Self {
            limit: parse_or_zero(limit.as_deref()),
            remaining: parse_or_zero(remaining.as_deref()),
            reset: parse_or_zero(reset.as_deref()),
            retry_after_ms,
        })
    }

    pub fn retry_after(&self) -> Option<Duration> {
        self.retry_after_ms.map(Duration::from_millis)
    }
}

fn header_value(headers: &HeaderMap, name: &str) -> Option<String> {
    let v = headers.get(name)?.to_str().ok()?.trim();
    if v.is_empty() {
        None
    } else {
        Some(v.to_string())
    }
}

fn parse_or_zero(raw: Option<&str>) -> u64 {
    raw.and_then(|s| s.parse::<u64>().ok()).unwrap_or(0)
}

/// Holds the last observed [`RateLimitSnapshot`] for one client instance.
///
/// Every observation replaces the snapshot wholesale. When several threads
/// share a client, whichever response is observed last wins.
#[derive(Debug, Default)]
pub struct RateLimitTracker {
    state: ArcSwapOption<RateLimitSnapshot>,
}

impl RateLimitTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Update from response headers. Responses without any rate-limit figures
    /// leave the previous snapshot in place.
    pub fn observe(&self, headers: &HeaderMap) {
        if let Some(snapshot) = RateLimitSnapshot::from_headers(headers) {
            debug!(
                limit = snapshot.limit,
                remaining = snapshot.remaining,
                reset = snapshot.reset,
                retry_after_ms = snapshot.retry_after_ms,
                "rate limit snapshot updated"
            );
            self.state.store(Some(Arc::new(snapshot)));
        }
    }

    pub fn snapshot(&self) -> Option<RateLimitSnapshot> {
        self.state.load_full().map(|s| *s)
    }

    /// The server's retry-after hint from the current snapshot, if any.
    pub fn retry_after_hint(&self) -> Option<Duration> {
        self.snapshot().and_then(|s| s.retry_after())
    }
}
