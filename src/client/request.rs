//! Execution request builder.

use crate::encoding::{encode_map, InputMap, InputValue};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use std::io;
use std::time::Duration;

pub const DEFAULT_EXECUTION_TIMEOUT: Duration = Duration::from_secs(30);
pub const EXECUTION_MODE_HEADER: &str = "x-execution-mode";

/// Everything needed for one execute exchange.
///
/// Input fields are spread at the root of the JSON body; `stream` and
/// `selectedOutputs` are added next to them only when set.
#[derive(Debug, Clone)]
pub struct ExecutionRequest {
    pub workflow_id: String,
    pub inputs: InputMap,
    pub timeout: Duration,
    pub stream: Option<bool>,
    /// Block outputs to return, e.g. `"agent1.content"`.
    pub selected_outputs: Option<Vec<String>>,
    pub async_execution: Option<bool>,
}

impl ExecutionRequest {
    pub fn new(workflow_id: impl Into<String>) -> Self {
        Self {
            workflow_id: workflow_id.into(),
            inputs: InputMap::new(),
            timeout: DEFAULT_EXECUTION_TIMEOUT,
            stream: None,
            selected_outputs: None,
            async_execution: None,
        }
    }

    /// Set one input field. Values may contain file sources.
    pub fn input(mut self, key: impl Into<String>, value: impl Into<InputValue>) -> Self {
        self.inputs.insert(key, value);
        self
    }

    /// Replace all input fields.
    pub fn inputs(mut self, inputs: impl Into<InputMap>) -> Self {
        self.inputs = inputs.into();
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn stream(mut self, stream: bool) -> Self {
        self.stream = Some(stream);
        self
    }

    pub fn selected_outputs<I, S>(mut self, outputs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.selected_outputs = Some(outputs.into_iter().map(Into::into).collect());
        self
    }

    /// Ask the service to queue the workflow and answer with a task handle.
    pub fn async_execution(mut self, enabled: bool) -> Self {
        self.async_execution = Some(enabled);
        self
    }

    pub fn is_async(&self) -> bool {
        self.async_execution == Some(true)
    }

    pub(crate) fn path(&self) -> String {
        format!("/api/workflows/{}/execute", self.workflow_id)
    }

    /// Mode header, present only when async execution was requested.
    pub(crate) fn headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        if self.is_async() {
            headers.insert(
                HeaderName::from_static(EXECUTION_MODE_HEADER),
                HeaderValue::from_static("async"),
            );
        }
        headers
    }

    /// Encoded inputs with the control fields overlaid.
    pub(crate) fn body(&self) -> io::Result<serde_json::Value> {
        let mut body = encode_map(&self.inputs)?;
        if let Some(stream) = self.stream {
            body.insert("stream".to_string(), serde_json::Value::Bool(stream));
        }
        if let Some(outputs) = &self.selected_outputs {
            body.insert(
                "selectedOutputs".to_string(),
                serde_json::Value::from(outputs.clone()),
            );
        }
        Ok(serde_json::Value::Object(body))
    }
}

impl From<&str> for ExecutionRequest {
    fn from(workflow_id: &str) -> Self {
        ExecutionRequest::new(workflow_id)
    }
}

impl From<String> for ExecutionRequest {
    fn from(workflow_id: String) -> Self {
        ExecutionRequest::new(workflow_id)
    }
}
