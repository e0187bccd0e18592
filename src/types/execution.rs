//! Results of the execute endpoint.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Result of a workflow that ran to completion within a single exchange.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowExecutionResult {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<serde_json::Value>,
    /// Non-string error payloads are kept as their JSON text.
    #[serde(
        default,
        deserialize_with = "optional_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logs: Option<Vec<serde_json::Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Map<String, serde_json::Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trace_spans: Option<Vec<serde_json::Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_duration: Option<f64>,
}

/// Handle for a workflow queued for asynchronous execution (HTTP 202).
///
/// Completion is observed separately through
/// [`SimClient::get_job_status`](crate::SimClient::get_job_status).
///
/// A non-string `taskId` keeps its JSON text and `null` fields take their
/// defaults, so any 202 carrying a `taskId` decodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AsyncExecutionResult {
    #[serde(default = "default_true", deserialize_with = "bool_or_true")]
    pub success: bool,
    #[serde(deserialize_with = "text_or_empty")]
    pub task_id: String,
    #[serde(default = "default_queued", deserialize_with = "status_or_queued")]
    pub status: String,
    #[serde(default, deserialize_with = "text_or_empty")]
    pub created_at: String,
    /// Relation name (e.g. "status") to follow-up location, as sent.
    #[serde(default, deserialize_with = "object_or_empty")]
    pub links: serde_json::Map<String, Value>,
}

impl AsyncExecutionResult {
    /// Follow-up URL for `rel`, when the service sent it as a string.
    pub fn link(&self, rel: &str) -> Option<&str> {
        self.links.get(rel).and_then(Value::as_str)
    }
}

fn default_true() -> bool {
    true
}

fn default_queued() -> String {
    "queued".to_string()
}

fn json_text(value: Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s),
        other => Some(other.to_string()),
    }
}

fn optional_text<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    Ok(json_text(Value::deserialize(d)?))
}

fn text_or_empty<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    Ok(json_text(Value::deserialize(d)?).unwrap_or_default())
}

fn status_or_queued<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    Ok(json_text(Value::deserialize(d)?).unwrap_or_else(default_queued))
}

fn bool_or_true<'de, D: Deserializer<'de>>(d: D) -> Result<bool, D::Error> {
    Ok(Value::deserialize(d)?.as_bool().unwrap_or(true))
}

fn object_or_empty<'de, D: Deserializer<'de>>(
    d: D,
) -> Result<serde_json::Map<String, Value>, D::Error> {
    match Value::deserialize(d)? {
        Value::Object(map) => Ok(map),
        _ => Ok(serde_json::Map::new()),
    }
}

/// What a single execute call produced. The two variants never co-occur.
#[derive(Debug, Clone, PartialEq)]
pub enum ExecutionOutcome {
    Sync(WorkflowExecutionResult),
    Async(AsyncExecutionResult),
}

impl ExecutionOutcome {
    pub fn is_async(&self) -> bool {
        matches!(self, ExecutionOutcome::Async(_))
    }

    pub fn success(&self) -> bool {
        match self {
            ExecutionOutcome::Sync(r) => r.success,
            ExecutionOutcome::Async(h) => h.success,
        }
    }

    pub fn as_sync(&self) -> Option<&WorkflowExecutionResult> {
        match self {
            ExecutionOutcome::Sync(r) => Some(r),
            ExecutionOutcome::Async(_) => None,
        }
    }

    pub fn as_async(&self) -> Option<&AsyncExecutionResult> {
        match self {
            ExecutionOutcome::Async(h) => Some(h),
            ExecutionOutcome::Sync(_) => None,
        }
    }

    pub fn into_sync(self) -> Option<WorkflowExecutionResult> {
        match self {
            ExecutionOutcome::Sync(r) => Some(r),
            ExecutionOutcome::Async(_) => None,
        }
    }

    pub fn into_async(self) -> Option<AsyncExecutionResult> {
        match self {
            ExecutionOutcome::Async(h) => Some(h),
            ExecutionOutcome::Sync(_) => None,
        }
    }
}

impl From<WorkflowExecutionResult> for ExecutionOutcome {
    fn from(r: WorkflowExecutionResult) -> Self {
        ExecutionOutcome::Sync(r)
    }
}

impl From<AsyncExecutionResult> for ExecutionOutcome {
    fn from(h: AsyncExecutionResult) -> Self {
        ExecutionOutcome::Async(h)
    }
}
