//! The client handle and its configuration mutators.

use crate::error::{Error, ErrorContext};
use crate::resilience::rate_limit::{RateLimitSnapshot, RateLimitTracker};
use crate::resilience::retry::{JitterSource, Sleeper};
use crate::transport::HttpTransport;
use crate::Result;
use std::sync::Arc;

/// Default origin of the Sim API.
pub const DEFAULT_BASE_URL: &str = "https://sim.ai";

/// Blocking client for the Sim workflow API.
///
/// Owns one pooled HTTP session and the rate-limit state observed on it. Calls
/// block the current thread for the whole exchange (and, with retries, for
/// every backoff sleep). Do not construct or use it from inside an async
/// runtime's worker threads.
///
/// Sharing one client across threads is allowed, but the rate-limit snapshot
/// then reflects whichever response was observed last.
pub struct SimClient {
    pub(crate) transport: HttpTransport,
    pub(crate) rate_limits: RateLimitTracker,
    pub(crate) sleeper: Arc<dyn Sleeper>,
    pub(crate) jitter: Arc<dyn JitterSource>,
}

impl SimClient {
    /// Client for the production origin with default session settings.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        crate::client::builder::SimClientBuilder::new()
            .api_key(api_key)
            .build()
    }

    pub fn builder() -> crate::client::builder::SimClientBuilder {
        crate::client::builder::SimClientBuilder::new()
    }

    pub fn base_url(&self) -> &str {
        self.transport.base_url()
    }

    /// Replace the API key sent with every request.
    pub fn set_api_key(&mut self, api_key: &str) -> Result<()> {
        self.transport.set_api_key(api_key)
    }

    /// Point the client at another origin. Trailing slashes are dropped.
    pub fn set_base_url(&mut self, base_url: &str) -> Result<()> {
        validate_base_url(base_url)?;
        self.transport.set_base_url(base_url);
        Ok(())
    }

    /// The rate-limit figures from the most recent response that carried
    /// them, or `None` before any such response.
    pub fn rate_limit_info(&self) -> Option<RateLimitSnapshot> {
        self.rate_limits.snapshot()
    }
}

impl std::fmt::Debug for SimClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimClient")
            .field("transport", &self.transport)
            .field("rate_limits", &self.rate_limits)
            .finish_non_exhaustive()
    }
}

pub(crate) fn validate_base_url(base_url: &str) -> Result<()> {
    let invalid = |details: String| {
        Error::configuration_with_context(
            format!("invalid base URL: {}", base_url),
            ErrorContext::new()
                .with_field_path("base_url")
                .with_details(details)
                .with_source("sim_client"),
        )
    };
    let parsed = url::Url::parse(base_url).map_err(|e| invalid(e.to_string()))?;
    match parsed.scheme() {
        "http" | "https" => Ok(()),
        other => Err(invalid(format!("unsupported scheme '{}'", other))),
    }
}
