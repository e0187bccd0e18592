//! Documents returned by the read-only status and usage endpoints.

use serde::{Deserialize, Serialize};

/// Deployment status of a workflow.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowStatus {
    #[serde(default)]
    pub is_deployed: bool,
    #[serde(default)]
    pub deployed_at: Option<String>,
    #[serde(default)]
    pub needs_redeployment: bool,
}

/// Usage limits and quota information for the authenticated user.
///
/// `rate_limit` and `usage` are passed through as the server shapes them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageLimits {
    #[serde(default = "default_true")]
    pub success: bool,
    #[serde(default)]
    pub rate_limit: serde_json::Map<String, serde_json::Value>,
    #[serde(default)]
    pub usage: serde_json::Map<String, serde_json::Value>,
}

fn default_true() -> bool {
    true
}
