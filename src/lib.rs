//! # simstudio
//!
//! Rust SDK for Sim: execute deployed workflows over HTTP, synchronously or as
//! queued background jobs, with rate-limit aware retries.
//!
//! ## Overview
//!
//! A [`SimClient`] owns one pooled HTTP session and the most recent rate-limit
//! snapshot reported by the service. Workflow inputs may contain binary sources
//! (files, buffers, streams); they are inlined into the JSON body as base64
//! file references before the request is sent.
//!
//! The client is blocking. Each call occupies the calling thread for the
//! network exchange and, when retrying, for every backoff sleep.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use simstudio::{ExecutionRequest, FileInput, RetryPolicy, SimClient};
//!
//! fn main() -> simstudio::Result<()> {
//!     let client = SimClient::new("your-api-key")?;
//!
//!     let request = ExecutionRequest::new("workflow-id")
//!         .input("message", "Hello")
//!         .input("document", FileInput::open("report.pdf")?);
//!
//!     let outcome = client.execute_with_retry(&request, &RetryPolicy::default())?;
//!     if let Some(result) = outcome.as_sync() {
//!         println!("success: {}, output: {:?}", result.success, result.output);
//!     }
//!
//!     if let Some(limits) = client.rate_limit_info() {
//!         println!("{} of {} requests left", limits.remaining, limits.limit);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Module Organization
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`client`] | Client, builder, execution and read-only endpoints |
//! | [`encoding`] | Readable sources and the file-inlining payload encoder |
//! | [`resilience`] | Rate-limit tracking and the retry controller |
//! | [`transport`] | Pooled blocking HTTP session |
//! | [`types`] | Result and status documents returned by the service |
//! | [`error`] / [`error_code`] | Error taxonomy |

pub mod client;
pub mod encoding;
pub mod error;
pub mod error_code;
pub mod resilience;
pub mod transport;
pub mod types;

// Re-export main types for convenience
pub use client::{ExecutionRequest, SimClient, SimClientBuilder};
pub use encoding::{FileInput, FileReference, InputMap, InputValue, ReadableSource, StreamInput};
pub use error::{ClientError, Error, ErrorContext};
pub use error_code::ErrorCode;
pub use resilience::rate_limit::RateLimitSnapshot;
pub use resilience::retry::RetryPolicy;
pub use types::{
    AsyncExecutionResult, ExecutionOutcome, UsageLimits, WorkflowExecutionResult, WorkflowStatus,
};

/// Result type alias for the library
pub type Result<T> = std::result::Result<T, Error>;
