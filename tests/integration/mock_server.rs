//! Mock HTTP server setup for integration tests

use mockito::{Mock, Server, ServerGuard};
use simstudio::resilience::retry::{JitterSource, Sleeper};
use simstudio::SimClient;
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const TEST_API_KEY: &str = "test-api-key";

/// Records requested waits instead of sleeping.
#[derive(Default)]
pub struct RecordingSleeper {
    waits: Mutex<Vec<Duration>>,
}

impl RecordingSleeper {
    pub fn waits(&self) -> Vec<Duration> {
        self.waits.lock().unwrap().clone()
    }
}

impl Sleeper for RecordingSleeper {
    fn sleep(&self, duration: Duration) {
        self.waits.lock().unwrap().push(duration);
    }
}

/// Always returns the same unit value; 0.5 yields a jitter factor of exactly 1.
pub struct FixedJitter(pub f64);

impl JitterSource for FixedJitter {
    fn next_unit(&self) -> f64 {
        self.0
    }
}

/// Test fixture that manages a mock server and a client pointed at it
pub struct MockServerFixture {
    pub server: ServerGuard,
    pub sleeper: Arc<RecordingSleeper>,
    pub client: SimClient,
}

impl MockServerFixture {
    pub fn new() -> Self {
        let server = Server::new();
        let sleeper = Arc::new(RecordingSleeper::default());
        let client = SimClient::builder()
            .api_key(TEST_API_KEY)
            .base_url(server.url())
            .sleeper(sleeper.clone())
            .jitter_source(Arc::new(FixedJitter(0.5)))
            .build()
            .expect("client should build against the mock server");
        Self {
            server,
            sleeper,
            client,
        }
    }

    /// Mock the execute endpoint of `workflow_id` with a JSON body.
    pub fn mock_execute(&mut self, workflow_id: &str, status: usize, body: &str) -> Mock {
        self.server
            .mock("POST", format!("/api/workflows/{}/execute", workflow_id).as_str())
            .match_header("x-api-key", TEST_API_KEY)
            .with_status(status)
            .with_header("content-type", "application/json")
            .with_body(body)
            .create()
    }

    /// Mock a rate-limited execute response carrying the full header set.
    pub fn mock_rate_limited(&mut self, workflow_id: &str, retry_after_secs: u64, hits: usize) -> Mock {
        self.server
            .mock("POST", format!("/api/workflows/{}/execute", workflow_id).as_str())
            .with_status(429)
            .with_header("content-type", "application/json")
            .with_header("x-ratelimit-limit", "100")
            .with_header("x-ratelimit-remaining", "0")
            .with_header("x-ratelimit-reset", "1700000000")
            .with_header("retry-after", &retry_after_secs.to_string())
            .with_body(r#"{"error": "Too many requests"}"#)
            .expect(hits)
            .create()
    }

    /// Mock a GET endpoint with a JSON body.
    pub fn mock_get(&mut self, path: &str, status: usize, body: &str) -> Mock {
        self.server
            .mock("GET", path)
            .match_header("x-api-key", TEST_API_KEY)
            .with_status(status)
            .with_header("content-type", "application/json")
            .with_body(body)
            .create()
    }
}
