//! Integration tests for the execute endpoint: mode selection, body shape,
//! response classification and rate-limit tracking.

use crate::integration::mock_server::MockServerFixture;
use mockito::Matcher;
use serde_json::json;
use simstudio::{ErrorCode, ExecutionOutcome, ExecutionRequest, FileInput, InputMap};
use std::io::{Cursor, Seek, SeekFrom};
use std::sync::Arc;
use std::time::Duration;

#[test]
fn test_sync_result() {
    let mut fixture = MockServerFixture::new();
    let mock = fixture.mock_execute(
        "wf-1",
        200,
        r#"{"success": true, "output": {"result": "Test completed"}, "metadata": {"duration": 1500}}"#,
    );

    let outcome = fixture
        .client
        .execute(&ExecutionRequest::new("wf-1").input("message", "Hello"))
        .unwrap();

    mock.assert();
    let result = outcome.into_sync().expect("expected a sync result");
    assert!(result.success);
    assert_eq!(result.output, Some(json!({"result": "Test completed"})));
    assert_eq!(result.metadata.unwrap()["duration"], 1500);
    assert!(result.error.is_none());
    assert!(result.trace_spans.is_none());
}

#[test]
fn test_async_handle_on_202_with_task_id() {
    let mut fixture = MockServerFixture::new();
    let mock = fixture
        .server
        .mock("POST", "/api/workflows/wf-1/execute")
        .match_header("x-execution-mode", "async")
        .with_status(202)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{"success": true, "taskId": "task-123", "status": "queued",
                "createdAt": "2024-01-01T00:00:00Z",
                "links": {"status": "/api/jobs/task-123"}}"#,
        )
        .expect(1)
        .create();

    let outcome = fixture
        .client
        .execute(&ExecutionRequest::new("wf-1").async_execution(true))
        .unwrap();

    mock.assert();
    let handle = outcome.into_async().expect("expected an async handle");
    assert_eq!(handle.task_id, "task-123");
    assert_eq!(handle.status, "queued");
    assert_eq!(handle.link("status"), Some("/api/jobs/task-123"));
}

#[test]
fn test_async_handle_defaults() {
    let mut fixture = MockServerFixture::new();
    let _mock = fixture.mock_execute("wf-1", 202, r#"{"taskId": "t1"}"#);

    let outcome = fixture
        .client
        .execute(&ExecutionRequest::new("wf-1").async_execution(true))
        .unwrap();

    match outcome {
        ExecutionOutcome::Async(handle) => {
            assert!(handle.success);
            assert_eq!(handle.task_id, "t1");
            assert_eq!(handle.status, "queued");
            assert_eq!(handle.created_at, "");
            assert!(handle.links.is_empty());
        }
        other => panic!("expected async handle, got {other:?}"),
    }
}

#[test]
fn test_mode_header_absent_unless_async_requested() {
    let mut fixture = MockServerFixture::new();
    let mock = fixture
        .server
        .mock("POST", "/api/workflows/wf-1/execute")
        .match_header("x-execution-mode", Matcher::Missing)
        .with_status(200)
        .with_body(r#"{"success": true}"#)
        .expect(2)
        .create();

    fixture.client.execute(&ExecutionRequest::new("wf-1")).unwrap();
    fixture
        .client
        .execute(&ExecutionRequest::new("wf-1").async_execution(false))
        .unwrap();

    mock.assert();
}

#[test]
fn test_execute_sync_drops_async_flag() {
    let mut fixture = MockServerFixture::new();
    let mock = fixture
        .server
        .mock("POST", "/api/workflows/wf-1/execute")
        .match_header("x-execution-mode", Matcher::Missing)
        .with_status(200)
        .with_body(r#"{"success": true, "output": "done"}"#)
        .create();

    let result = fixture
        .client
        .execute_sync(&ExecutionRequest::new("wf-1").async_execution(true))
        .unwrap();

    mock.assert();
    assert_eq!(result.output, Some(json!("done")));
}

#[test]
fn test_execute_sync_rejects_queued_task() {
    let mut fixture = MockServerFixture::new();
    let _mock = fixture.mock_execute("wf-1", 202, r#"{"taskId": "t1"}"#);

    let err = fixture
        .client
        .execute_sync(&ExecutionRequest::new("wf-1"))
        .unwrap_err();

    assert_eq!(err.code(), Some(&ErrorCode::ExecutionError));
    assert_eq!(err.status(), Some(202));
}

#[test]
fn test_body_spreads_inputs_and_control_fields() {
    let mut fixture = MockServerFixture::new();
    let mock = fixture
        .server
        .mock("POST", "/api/workflows/wf-1/execute")
        .match_header("content-type", "application/json")
        .match_body(Matcher::Json(json!({
            "message": "Hello",
            "count": 3,
            "stream": true,
            "selectedOutputs": ["agent1.content"]
        })))
        .with_status(200)
        .with_body(r#"{"success": true}"#)
        .create();

    let request = ExecutionRequest::new("wf-1")
        .input("message", "Hello")
        .input("count", 3)
        .stream(true)
        .selected_outputs(["agent1.content"]);
    fixture.client.execute(&request).unwrap();

    mock.assert();
}

#[test]
fn test_body_omits_unset_control_fields() {
    let mut fixture = MockServerFixture::new();
    let mock = fixture
        .server
        .mock("POST", "/api/workflows/wf-1/execute")
        .match_body(Matcher::Json(json!({"message": "Hello"})))
        .with_status(200)
        .with_body(r#"{"success": true}"#)
        .create();

    fixture
        .client
        .execute(&ExecutionRequest::new("wf-1").input("message", "Hello"))
        .unwrap();

    mock.assert();
}

#[test]
fn test_file_inputs_are_inlined_and_source_reusable() {
    let mut fixture = MockServerFixture::new();
    let mock = fixture
        .server
        .mock("POST", "/api/workflows/wf-1/execute")
        .match_body(Matcher::Json(json!({
            "files": [{
                "type": "file",
                "data": "data:application/pdf;base64,JVBERi0=",
                "name": "report.pdf",
                "mime": "application/pdf"
            }]
        })))
        .with_status(200)
        .with_body(r#"{"success": true}"#)
        .expect(2)
        .create();

    let mut cursor = Cursor::new(b"xx%PDF-".to_vec());
    cursor.seek(SeekFrom::Start(2)).unwrap();
    let source = Arc::new(
        FileInput::new(cursor)
            .with_name("uploads/report.pdf")
            .with_content_type("application/pdf"),
    );
    let request = ExecutionRequest::new("wf-1").inputs(
        InputMap::new().with("files", vec![simstudio::InputValue::file(source.clone())]),
    );

    fixture.client.execute(&request).unwrap();
    fixture.client.execute(&request).unwrap();

    mock.assert();
    assert_eq!(simstudio::ReadableSource::tell(source.as_ref()).unwrap(), Some(2));
}

#[test]
fn test_rate_limited_reports_retry_after() {
    let mut fixture = MockServerFixture::new();
    let _mock = fixture.mock_rate_limited("wf-1", 2, 1);

    let err = fixture
        .client
        .execute(&ExecutionRequest::new("wf-1"))
        .unwrap_err();

    assert!(err.is_rate_limited());
    assert_eq!(err.status(), Some(429));
    assert!(err.to_string().contains("2000ms"), "{}", err);
}

#[test]
fn test_rate_limited_without_headers_uses_fallback_hint() {
    let mut fixture = MockServerFixture::new();
    let _mock = fixture.mock_execute("wf-1", 429, r#"{"error": "slow down"}"#);

    let err = fixture
        .client
        .execute(&ExecutionRequest::new("wf-1"))
        .unwrap_err();

    assert_eq!(err.code(), Some(&ErrorCode::RateLimitExceeded));
    assert_eq!(err.to_string(), "Rate limit exceeded. Retry after 1000ms");
}

#[test]
fn test_error_body_message_and_code() {
    let mut fixture = MockServerFixture::new();
    let _mock = fixture.mock_execute(
        "wf-1",
        400,
        r#"{"error": "Workflow not deployed", "code": "WORKFLOW_NOT_DEPLOYED"}"#,
    );

    let err = fixture
        .client
        .execute(&ExecutionRequest::new("wf-1"))
        .unwrap_err();

    assert_eq!(err.to_string(), "Workflow not deployed");
    assert_eq!(err.code().map(ErrorCode::as_str), Some("WORKFLOW_NOT_DEPLOYED"));
    assert_eq!(err.status(), Some(400));
}

#[test]
fn test_unparseable_error_body_falls_back_to_status_line() {
    let mut fixture = MockServerFixture::new();
    let _mock = fixture
        .server
        .mock("POST", "/api/workflows/wf-1/execute")
        .with_status(502)
        .with_body("<html>bad gateway</html>")
        .create();

    let err = fixture
        .client
        .execute(&ExecutionRequest::new("wf-1"))
        .unwrap_err();

    assert_eq!(err.to_string(), "HTTP 502: Bad Gateway");
    assert!(err.code().is_none());
    assert_eq!(err.status(), Some(502));
}

#[test]
fn test_rate_limit_info_tracks_latest_response() {
    let mut fixture = MockServerFixture::new();
    assert!(fixture.client.rate_limit_info().is_none());

    let first = fixture
        .server
        .mock("POST", "/api/workflows/wf-1/execute")
        .with_status(200)
        .with_header("x-ratelimit-limit", "100")
        .with_header("x-ratelimit-remaining", "99")
        .with_header("x-ratelimit-reset", "1700000000")
        .with_body(r#"{"success": true}"#)
        .expect(1)
        .create();
    fixture.client.execute(&ExecutionRequest::new("wf-1")).unwrap();
    first.assert();

    let info = fixture.client.rate_limit_info().unwrap();
    assert_eq!(info.limit, 100);
    assert_eq!(info.remaining, 99);
    assert_eq!(info.reset, 1_700_000_000);
    assert_eq!(info.retry_after_ms, None);

    // No rate-limit headers: the previous snapshot stays.
    let _second = fixture
        .server
        .mock("POST", "/api/workflows/wf-2/execute")
        .with_status(200)
        .with_body(r#"{"success": true}"#)
        .create();
    fixture.client.execute(&ExecutionRequest::new("wf-2")).unwrap();
    assert_eq!(fixture.client.rate_limit_info(), Some(info));

    // Partial headers replace the snapshot wholesale.
    let _third = fixture
        .server
        .mock("POST", "/api/workflows/wf-3/execute")
        .with_status(500)
        .with_header("x-ratelimit-remaining", "42")
        .with_body(r#"{"error": "boom"}"#)
        .create();
    assert!(fixture.client.execute(&ExecutionRequest::new("wf-3")).is_err());
    let info = fixture.client.rate_limit_info().unwrap();
    assert_eq!((info.limit, info.remaining, info.reset), (0, 42, 0));
}

#[test]
fn test_timeout() {
    // Accepts connections at the socket level but never answers.
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let base_url = format!("http://{}", listener.local_addr().unwrap());
    let client = simstudio::SimClient::builder()
        .api_key("test-api-key")
        .base_url(base_url)
        .build()
        .unwrap();

    let err = client
        .execute(&ExecutionRequest::new("wf-1").timeout(Duration::from_millis(200)))
        .unwrap_err();

    assert_eq!(err.code(), Some(&ErrorCode::Timeout));
    assert!(err.to_string().contains("timed out"), "{}", err);
    drop(listener);
}

#[test]
fn test_connection_failure_is_execution_error() {
    let addr = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap()
    };
    let client = simstudio::SimClient::builder()
        .api_key("test-api-key")
        .base_url(format!("http://{}", addr))
        .build()
        .unwrap();

    let err = client
        .execute(&ExecutionRequest::new("wf-1").timeout(Duration::from_secs(5)))
        .unwrap_err();

    assert_eq!(err.code(), Some(&ErrorCode::ExecutionError));
    assert!(err.to_string().starts_with("Failed to execute workflow"), "{}", err);
}

#[test]
fn test_read_failure_is_io_error_and_nothing_is_sent() {
    struct Broken;
    impl std::io::Read for Broken {
        fn read(&mut self, _: &mut [u8]) -> std::io::Result<usize> {
            Err(std::io::Error::new(std::io::ErrorKind::Other, "disk gone"))
        }
    }

    let mut fixture = MockServerFixture::new();
    let mock = fixture
        .server
        .mock("POST", "/api/workflows/wf-1/execute")
        .expect(0)
        .create();

    let request = ExecutionRequest::new("wf-1")
        .input("doc", simstudio::StreamInput::new(Broken));
    let err = fixture.client.execute(&request).unwrap_err();

    assert!(matches!(err, simstudio::Error::Io(_)));
    mock.assert();
}
