//! Single-attempt workflow execution.

use crate::error::{ClientError, Error};
use crate::error_code::ErrorCode;
use crate::types::{ExecutionOutcome, WorkflowExecutionResult};
use crate::Result;
use std::time::Instant;
use tracing::{info, warn};
use uuid::Uuid;

use super::classification::{classify_execution, execution_transport_error};
use super::core::SimClient;
use super::request::ExecutionRequest;

impl SimClient {
    /// Execute a workflow once.
    ///
    /// Returns [`ExecutionOutcome::Async`] only when the service answered 202
    /// with a task id; everything else that succeeds is a sync result. The
    /// rate-limit snapshot is refreshed from the response headers whether or
    /// not the call succeeds.
    ///
    /// Input files are read (and their cursors restored) while the body is
    /// built; a read failure surfaces as [`Error::Io`] before anything is sent.
    pub fn execute(&self, request: &ExecutionRequest) -> Result<ExecutionOutcome> {
        let body = request.body()?;
        self.dispatch(request, &body)
    }

    /// One execute exchange with an already encoded body.
    pub(crate) fn dispatch(
        &self,
        request: &ExecutionRequest,
        body: &serde_json::Value,
    ) -> Result<ExecutionOutcome> {
        let client_request_id = Uuid::new_v4().to_string();
        let path = request.path();
        let start = Instant::now();

        let resp = match self
            .transport
            .post_json(&path, body, request.headers(), request.timeout)
        {
            Ok(resp) => resp,
            Err(e) => {
                let err = execution_transport_error(&e, request.timeout);
                warn!(
                    workflow_id = request.workflow_id.as_str(),
                    client_request_id = client_request_id.as_str(),
                    code = err.code.as_ref().map(ErrorCode::as_str).unwrap_or(""),
                    duration_ms = start.elapsed().as_millis() as u64,
                    "sim workflow execution failed before a response"
                );
                return Err(err.into());
            }
        };

        self.rate_limits.observe(&resp.headers);

        match classify_execution(&resp, self.rate_limits.snapshot()) {
            Ok(outcome) => {
                info!(
                    workflow_id = request.workflow_id.as_str(),
                    client_request_id = client_request_id.as_str(),
                    http_status = resp.status,
                    is_async = outcome.is_async(),
                    duration_ms = start.elapsed().as_millis() as u64,
                    "sim workflow executed"
                );
                Ok(outcome)
            }
            Err(err) => {
                info!(
                    workflow_id = request.workflow_id.as_str(),
                    client_request_id = client_request_id.as_str(),
                    http_status = resp.status,
                    code = err.code.as_ref().map(ErrorCode::as_str).unwrap_or(""),
                    duration_ms = start.elapsed().as_millis() as u64,
                    "sim workflow execution failed"
                );
                Err(err.into())
            }
        }
    }

    /// Execute without the async mode header and insist on a final result.
    pub fn execute_sync(&self, request: &ExecutionRequest) -> Result<WorkflowExecutionResult> {
        let mut request = request.clone();
        request.async_execution = None;
        match self.execute(&request)? {
            ExecutionOutcome::Sync(result) => Ok(result),
            ExecutionOutcome::Async(handle) => Err(Error::Client(
                ClientError::new(format!(
                    "Expected a synchronous result but the workflow was queued as task {}",
                    handle.task_id
                ))
                .with_code(ErrorCode::ExecutionError)
                .with_status(202),
            )),
        }
    }
}
