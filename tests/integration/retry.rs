//! Integration tests for the rate-limit retry loop.

use crate::integration::mock_server::MockServerFixture;
use mockito::Matcher;
use serde_json::json;
use simstudio::{ErrorCode, ExecutionRequest, RetryPolicy, StreamInput};
use std::io::Cursor;
use std::time::Duration;

fn fast_policy(max_retries: u32) -> RetryPolicy {
    RetryPolicy::new()
        .with_max_retries(max_retries)
        .with_initial_delay(Duration::from_millis(100))
        .with_max_delay(Duration::from_secs(1))
}

#[test]
fn test_succeeds_after_one_rate_limited_attempt() {
    let mut fixture = MockServerFixture::new();
    let limited = fixture.mock_rate_limited("wf-1", 0, 1);
    let ok = fixture
        .server
        .mock("POST", "/api/workflows/wf-1/execute")
        .with_status(200)
        .with_body(r#"{"success": true, "output": "ok"}"#)
        .expect(1)
        .create();

    let outcome = fixture
        .client
        .execute_with_retry(&ExecutionRequest::new("wf-1"), &fast_policy(3))
        .unwrap();

    limited.assert();
    ok.assert();
    assert!(outcome.success());
    // retry-after of 0 falls back to the exponential delay.
    assert_eq!(fixture.sleeper.waits(), vec![Duration::from_millis(100)]);
}

#[test]
fn test_server_hint_preferred_over_backoff() {
    let mut fixture = MockServerFixture::new();
    let _limited = fixture.mock_rate_limited("wf-1", 2, 1);
    let _ok = fixture
        .server
        .mock("POST", "/api/workflows/wf-1/execute")
        .with_status(200)
        .with_body(r#"{"success": true}"#)
        .create();

    fixture
        .client
        .execute_with_retry(&ExecutionRequest::new("wf-1"), &fast_policy(3))
        .unwrap();

    assert_eq!(fixture.sleeper.waits(), vec![Duration::from_secs(2)]);
}

#[test]
fn test_exhausted_retries_return_last_rate_limit_error() {
    let mut fixture = MockServerFixture::new();
    let limited = fixture.mock_rate_limited("wf-1", 0, 3);

    let err = fixture
        .client
        .execute_with_retry(&ExecutionRequest::new("wf-1"), &fast_policy(2))
        .unwrap_err();

    limited.assert();
    assert_eq!(err.code(), Some(&ErrorCode::RateLimitExceeded));
    assert_eq!(err.status(), Some(429));
    assert_eq!(
        fixture.sleeper.waits(),
        vec![Duration::from_millis(100), Duration::from_millis(200)]
    );
}

#[test]
fn test_other_errors_are_not_retried() {
    let mut fixture = MockServerFixture::new();
    let failing = fixture
        .server
        .mock("POST", "/api/workflows/wf-1/execute")
        .with_status(500)
        .with_body(r#"{"error": "Internal server error"}"#)
        .expect(1)
        .create();

    let err = fixture
        .client
        .execute_with_retry(&ExecutionRequest::new("wf-1"), &fast_policy(3))
        .unwrap_err();

    failing.assert();
    assert_eq!(err.status(), Some(500));
    assert_eq!(err.to_string(), "Internal server error");
    assert!(fixture.sleeper.waits().is_empty());
}

#[test]
fn test_zero_retries_means_single_attempt() {
    let mut fixture = MockServerFixture::new();
    let limited = fixture.mock_rate_limited("wf-1", 1, 1);

    let err = fixture
        .client
        .execute_with_retry(&ExecutionRequest::new("wf-1"), &fast_policy(0))
        .unwrap_err();

    limited.assert();
    assert!(err.is_rate_limited());
    assert!(fixture.sleeper.waits().is_empty());
}

#[test]
fn test_stream_input_sent_intact_on_every_attempt() {
    let expected = json!({
        "doc": {
            "type": "file",
            "data": "data:text/plain;base64,aGVsbG8=",
            "name": "notes.txt",
            "mime": "text/plain"
        }
    });

    let mut fixture = MockServerFixture::new();
    let limited = fixture
        .server
        .mock("POST", "/api/workflows/wf-1/execute")
        .match_body(Matcher::Json(expected.clone()))
        .with_status(429)
        .with_header("x-ratelimit-limit", "100")
        .with_header("x-ratelimit-remaining", "0")
        .with_header("x-ratelimit-reset", "1700000000")
        .expect(1)
        .create();
    // An empty re-read file would not match this body and fall through to the 429 mock.
    let ok = fixture
        .server
        .mock("POST", "/api/workflows/wf-1/execute")
        .match_body(Matcher::Json(expected))
        .with_status(200)
        .with_body(r#"{"success": true}"#)
        .expect(1)
        .create();

    let request = ExecutionRequest::new("wf-1").input(
        "doc",
        StreamInput::new(Cursor::new(b"hello".to_vec()))
            .with_name("notes.txt")
            .with_content_type("text/plain"),
    );
    let outcome = fixture
        .client
        .execute_with_retry(&request, &fast_policy(1))
        .unwrap();

    limited.assert();
    ok.assert();
    assert!(outcome.success());
    assert_eq!(fixture.sleeper.waits().len(), 1);
}
