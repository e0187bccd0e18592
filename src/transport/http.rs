use crate::error::{Error, ErrorContext};
use crate::Result;
use reqwest::blocking::{Client, RequestBuilder};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use reqwest::Proxy;
use std::env;
use std::time::{Duration, Instant};
use tracing::debug;

pub const API_KEY_HEADER: &str = "x-api-key";

/// Connection-pool and proxy knobs for the underlying session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportConfig {
    pub pool_max_idle_per_host: usize,
    pub pool_idle_timeout: Duration,
    /// Route all traffic through this proxy URL.
    pub proxy: Option<String>,
    /// Timeout for the read-only endpoints. Execute calls always carry their own.
    pub read_timeout: Option<Duration>,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            pool_max_idle_per_host: 32,
            pool_idle_timeout: Duration::from_secs(90),
            proxy: None,
            read_timeout: None,
        }
    }
}

impl TransportConfig {
    /// Defaults overridden by `SIM_HTTP_POOL_MAX_IDLE_PER_HOST`,
    /// `SIM_HTTP_POOL_IDLE_TIMEOUT_SECS`, `SIM_HTTP_READ_TIMEOUT_SECS` and
    /// `SIM_PROXY_URL`. Unparseable values are ignored.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            pool_max_idle_per_host: env::var("SIM_HTTP_POOL_MAX_IDLE_PER_HOST")
                .ok()
                .and_then(|s| s.parse::<usize>().ok())
                .unwrap_or(defaults.pool_max_idle_per_host),
            pool_idle_timeout: env::var("SIM_HTTP_POOL_IDLE_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse::<u64>().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.pool_idle_timeout),
            proxy: env::var("SIM_PROXY_URL").ok().filter(|s| !s.is_empty()),
            read_timeout: env::var("SIM_HTTP_READ_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse::<u64>().ok())
                .filter(|secs| *secs > 0)
                .map(Duration::from_secs),
        }
    }
}

/// A fully read HTTP response.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    /// Canonical reason phrase for `status`, empty when unknown.
    pub reason: String,
    pub headers: HeaderMap,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Owns the pooled session and the default headers sent with every request.
pub struct HttpTransport {
    client: Client,
    base_url: String,
    default_headers: HeaderMap,
    read_timeout: Option<Duration>,
}

impl HttpTransport {
    pub fn new(base_url: &str, api_key: &str, config: &TransportConfig) -> Result<Self> {
        let mut builder = Client::builder()
            .pool_max_idle_per_host(config.pool_max_idle_per_host)
            .pool_idle_timeout(Some(config.pool_idle_timeout))
            // Per-request timeouts only; no session-wide deadline.
            .timeout(None::<Duration>);

        if let Some(proxy_url) = &config.proxy {
            let proxy = Proxy::all(proxy_url).map_err(|e| {
                Error::configuration_with_context(
                    "invalid proxy URL",
                    ErrorContext::new()
                        .with_field_path("proxy")
                        .with_details(e.to_string())
                        .with_source("http_transport"),
                )
            })?;
            builder = builder.proxy(proxy);
        }

        let client = builder.build().map_err(|e| {
            Error::configuration_with_context(
                "failed to build HTTP client",
                ErrorContext::new()
                    .with_details(e.to_string())
                    .with_source("http_transport"),
            )
        })?;

        let mut default_headers = HeaderMap::new();
        default_headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let mut transport = Self {
            client,
            base_url: String::new(),
            default_headers,
            read_timeout: config.read_timeout,
        };
        transport.set_api_key(api_key)?;
        transport.set_base_url(base_url);
        Ok(transport)
    }

    pub fn set_api_key(&mut self, api_key: &str) -> Result<()> {
        let mut value = HeaderValue::from_str(api_key).map_err(|_| {
            Error::configuration_with_context(
                "API key contains characters not allowed in an HTTP header",
                ErrorContext::new()
                    .with_field_path("api_key")
                    .with_source("http_transport"),
            )
        })?;
        value.set_sensitive(true);
        self.default_headers
            .insert(HeaderName::from_static(API_KEY_HEADER), value);
        Ok(())
    }

    /// Replace the origin; trailing slashes are dropped.
    pub fn set_base_url(&mut self, base_url: &str) {
        self.base_url = base_url.trim_end_matches('/').to_string();
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn default_headers(&self) -> &HeaderMap {
        &self.default_headers
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// POST a JSON body. `extra_headers` are layered over the defaults.
    pub fn post_json(
        &self,
        path: &str,
        body: &serde_json::Value,
        extra_headers: HeaderMap,
        timeout: Duration,
    ) -> std::result::Result<HttpResponse, TransportError> {
        let mut headers = self.default_headers.clone();
        headers.extend(extra_headers);
        let req = self
            .client
            .post(self.url(path))
            .headers(headers)
            .json(body)
            .timeout(timeout);
        self.send("POST", path, req)
    }

    pub fn get(&self, path: &str) -> std::result::Result<HttpResponse, TransportError> {
        let mut req = self
            .client
            .get(self.url(path))
            .headers(self.default_headers.clone());
        if let Some(timeout) = self.read_timeout {
            req = req.timeout(timeout);
        }
        self.send("GET", path, req)
    }

    fn send(
        &self,
        method: &str,
        path: &str,
        req: RequestBuilder,
    ) -> std::result::Result<HttpResponse, TransportError> {
        let start = Instant::now();
        let resp = req.send()?;
        let status = resp.status();
        let headers = resp.headers().clone();
        let body = resp.text()?;

        debug!(
            method,
            path,
            http_status = status.as_u16(),
            duration_ms = start.elapsed().as_millis() as u64,
            "sim request completed"
        );

        Ok(HttpResponse {
            status: status.as_u16(),
            reason: status.canonical_reason().unwrap_or("").to_string(),
            headers,
            body,
        })
    }
}

impl std::fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Header values are marked sensitive, so the key is not printed.
        f.debug_struct("HttpTransport")
            .field("base_url", &self.base_url)
            .field("default_headers", &self.default_headers)
            .field("read_timeout", &self.read_timeout)
            .finish()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl TransportError {
    pub fn is_timeout(&self) -> bool {
        match self {
            TransportError::Http(e) => e.is_timeout(),
        }
    }
}
