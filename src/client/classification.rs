//! Response classification for the Sim endpoints.

use crate::error::ClientError;
use crate::error_code::ErrorCode;
use crate::resilience::rate_limit::RateLimitSnapshot;
use crate::transport::{HttpResponse, TransportError};
use crate::types::{AsyncExecutionResult, ExecutionOutcome, WorkflowExecutionResult};
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Retry-after reported in the 429 message when the server never sent one.
pub(crate) const DEFAULT_RETRY_AFTER_MS: u64 = 1000;

/// Classify an execute response into a sync result, an async handle, or an error.
pub(crate) fn classify_execution(
    resp: &HttpResponse,
    snapshot: Option<RateLimitSnapshot>,
) -> Result<ExecutionOutcome, ClientError> {
    if resp.status == 429 {
        return Err(rate_limit_error(snapshot));
    }
    if !resp.is_success() {
        return Err(error_from_response(resp));
    }

    let json: serde_json::Value = parse_body(resp, ErrorCode::ExecutionError)?;

    if resp.status == 202 && json.get("taskId").is_some() {
        let handle: AsyncExecutionResult = from_json(json, resp.status, ErrorCode::ExecutionError)?;
        return Ok(ExecutionOutcome::Async(handle));
    }

    let result: WorkflowExecutionResult = from_json(json, resp.status, ErrorCode::ExecutionError)?;
    Ok(ExecutionOutcome::Sync(result))
}

pub(crate) fn rate_limit_error(snapshot: Option<RateLimitSnapshot>) -> ClientError {
    let retry_after_ms = snapshot
        .and_then(|s| s.retry_after_ms)
        .unwrap_or(DEFAULT_RETRY_AFTER_MS);
    ClientError::new(format!(
        "Rate limit exceeded. Retry after {}ms",
        retry_after_ms
    ))
    .with_code(ErrorCode::RateLimitExceeded)
    .with_status(429)
}

/// Build an error from a non-success response.
///
/// Prefers `{"error": ..., "code": ...}` from the body and falls back to the
/// status line when the body is not a JSON object.
pub(crate) fn error_from_response(resp: &HttpResponse) -> ClientError {
    let status_line = format!("HTTP {}: {}", resp.status, resp.reason);

    let (message, code) = match serde_json::from_str::<serde_json::Value>(&resp.body) {
        Ok(serde_json::Value::Object(obj)) => {
            let message = match obj.get("error") {
                Some(serde_json::Value::String(s)) => s.clone(),
                Some(serde_json::Value::Null) | None => status_line,
                Some(other) => other.to_string(),
            };
            let code = obj
                .get("code")
                .and_then(|c| c.as_str())
                .map(ErrorCode::parse);
            (message, code)
        }
        _ => (status_line, None),
    };

    let mut err = ClientError::new(message).with_status(resp.status);
    err.code = code;
    err
}

/// Map a transport failure on the execute endpoint.
pub(crate) fn execution_transport_error(err: &TransportError, timeout: Duration) -> ClientError {
    if err.is_timeout() {
        ClientError::new(format!(
            "Workflow execution timed out after {} seconds",
            timeout.as_secs_f64()
        ))
        .with_code(ErrorCode::Timeout)
    } else {
        ClientError::new(format!("Failed to execute workflow: {}", err))
            .with_code(ErrorCode::ExecutionError)
    }
}

/// Map a transport failure on a read-only endpoint; timeouts are not singled out.
pub(crate) fn read_transport_error(err: &TransportError, what: &str, code: ErrorCode) -> ClientError {
    ClientError::new(format!("Failed to get {}: {}", what, err)).with_code(code)
}

/// Decode a success body, or fail with `code` and the response status.
pub(crate) fn parse_body<T: DeserializeOwned>(
    resp: &HttpResponse,
    code: ErrorCode,
) -> Result<T, ClientError> {
    serde_json::from_str(&resp.body).map_err(|e| {
        ClientError::new(format!("Failed to parse response body: {}", e))
            .with_code(code)
            .with_status(resp.status)
    })
}

fn from_json<T: DeserializeOwned>(
    json: serde_json::Value,
    status: u16,
    code: ErrorCode,
) -> Result<T, ClientError> {
    serde_json::from_value(json).map_err(|e| {
        ClientError::new(format!("Unexpected response shape: {}", e))
            .with_code(code)
            .with_status(status)
    })
}
