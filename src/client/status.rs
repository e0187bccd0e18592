//! Read-only endpoints: deployment status, job status, usage limits.

use crate::error_code::ErrorCode;
use crate::transport::HttpResponse;
use crate::types::{UsageLimits, WorkflowStatus};
use crate::Result;
use serde::de::DeserializeOwned;
use tracing::debug;

use super::classification::{error_from_response, parse_body, read_transport_error};
use super::core::SimClient;

impl SimClient {
    /// Deployment status of a workflow.
    pub fn get_workflow_status(&self, workflow_id: &str) -> Result<WorkflowStatus> {
        self.read(
            &format!("/api/workflows/{}/status", workflow_id),
            "workflow status",
            ErrorCode::StatusError,
        )
    }

    /// `true` when the workflow exists and is deployed. Any failure, including
    /// network errors, counts as not ready.
    pub fn validate_workflow(&self, workflow_id: &str) -> bool {
        match self.get_workflow_status(workflow_id) {
            Ok(status) => status.is_deployed,
            Err(e) => {
                debug!(workflow_id, error = %e, "workflow validation failed");
                false
            }
        }
    }

    /// Status document of an async execution, returned as sent by the service.
    pub fn get_job_status(&self, task_id: &str) -> Result<serde_json::Value> {
        self.read(
            &format!("/api/jobs/{}", task_id),
            "job status",
            ErrorCode::StatusError,
        )
    }

    /// Rate-limit and usage figures for the API key's account.
    pub fn get_usage_limits(&self) -> Result<UsageLimits> {
        self.read(
            "/api/users/me/usage-limits",
            "usage limits",
            ErrorCode::UsageError,
        )
    }

    fn read<T: DeserializeOwned>(&self, path: &str, what: &str, code: ErrorCode) -> Result<T> {
        let resp: HttpResponse = self
            .transport
            .get(path)
            .map_err(|e| read_transport_error(&e, what, code.clone()))?;

        self.rate_limits.observe(&resp.headers);

        if !resp.is_success() {
            return Err(error_from_response(&resp).into());
        }
        Ok(parse_body(&resp, code)?)
    }
}
