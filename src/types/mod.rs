//! # Types Module
//!
//! Value objects returned by the Sim API. They carry no shared state and are
//! deserialized straight from the camelCase JSON bodies the service returns.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`WorkflowExecutionResult`] | Final result of a synchronous execution |
//! | [`AsyncExecutionResult`] | Task handle returned for an asynchronous execution |
//! | [`ExecutionOutcome`] | Either of the two, as returned by `execute` |
//! | [`WorkflowStatus`] | Deployment status of a workflow |
//! | [`UsageLimits`] | Rate-limit and usage quota document |

pub mod execution;
pub mod status;

pub use execution::{AsyncExecutionResult, ExecutionOutcome, WorkflowExecutionResult};
pub use status::{UsageLimits, WorkflowStatus};
