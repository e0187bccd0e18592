//! Sim client: execution, retries and the read-only endpoints.
//!
//! Keep the public surface small. Implementation details are split into
//! submodules under `src/client/`.

pub mod builder;
mod classification;
pub mod core;
mod execution;
pub mod request;
mod retry;
mod status;

pub use builder::SimClientBuilder;
pub use self::core::{SimClient, DEFAULT_BASE_URL};
pub use request::{ExecutionRequest, DEFAULT_EXECUTION_TIMEOUT, EXECUTION_MODE_HEADER};
