//! Builder and environment configuration for [`SimClient`].

use crate::client::core::{validate_base_url, SimClient, DEFAULT_BASE_URL};
use crate::error::{Error, ErrorContext};
use crate::resilience::rate_limit::RateLimitTracker;
use crate::resilience::retry::{JitterSource, Sleeper, ThreadRngJitter, ThreadSleeper};
use crate::transport::{HttpTransport, TransportConfig};
use crate::Result;
use std::sync::Arc;
use std::time::Duration;

/// Builder for [`SimClient`].
///
/// Keep this surface small: an API key, an origin, and a few session knobs.
pub struct SimClientBuilder {
    api_key: Option<String>,
    base_url: String,
    transport: TransportConfig,
    sleeper: Arc<dyn Sleeper>,
    jitter: Arc<dyn JitterSource>,
}

impl SimClientBuilder {
    pub fn new() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            transport: TransportConfig::default(),
            sleeper: Arc::new(ThreadSleeper),
            jitter: Arc::new(ThreadRngJitter),
        }
    }

    /// Builder seeded from the environment:
    /// - `SIM_API_KEY`
    /// - `SIM_BASE_URL` (default `https://sim.ai`)
    /// - session knobs read by [`TransportConfig::from_env`]
    pub fn from_env() -> Self {
        let mut builder = Self::new();
        builder.api_key = std::env::var("SIM_API_KEY").ok().filter(|s| !s.is_empty());
        if let Some(url) = std::env::var("SIM_BASE_URL").ok().filter(|s| !s.is_empty()) {
            builder.base_url = url;
        }
        builder.transport = TransportConfig::from_env();
        builder
    }

    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn pool_max_idle_per_host(mut self, n: usize) -> Self {
        self.transport.pool_max_idle_per_host = n;
        self
    }

    pub fn pool_idle_timeout(mut self, timeout: Duration) -> Self {
        self.transport.pool_idle_timeout = timeout;
        self
    }

    pub fn proxy(mut self, proxy_url: impl Into<String>) -> Self {
        self.transport.proxy = Some(proxy_url.into());
        self
    }

    /// Timeout for the status, job and usage endpoints (none by default).
    pub fn read_timeout(mut self, timeout: Duration) -> Self {
        self.transport.read_timeout = Some(timeout);
        self
    }

    /// Replace how retry backoff waits. Mostly useful in tests.
    pub fn sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    /// Replace the randomness behind retry jitter. Mostly useful in tests.
    pub fn jitter_source(mut self, jitter: Arc<dyn JitterSource>) -> Self {
        self.jitter = jitter;
        self
    }

    pub fn build(self) -> Result<SimClient> {
        let api_key = self.api_key.ok_or_else(|| {
            Error::configuration_with_context(
                "API key is required",
                ErrorContext::new()
                    .with_field_path("api_key")
                    .with_details("set it on the builder or via SIM_API_KEY")
                    .with_source("client_builder"),
            )
        })?;
        validate_base_url(&self.base_url)?;

        let transport = HttpTransport::new(&self.base_url, &api_key, &self.transport)?;

        Ok(SimClient {
            transport,
            rate_limits: RateLimitTracker::new(),
            sleeper: self.sleeper,
            jitter: self.jitter,
        })
    }
}

impl Default for SimClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}
