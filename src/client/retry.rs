//! Rate-limit aware execution.

use crate::resilience::retry::{RetryExecutor, RetryPolicy};
use crate::types::ExecutionOutcome;
use crate::Result;
use tracing::debug;

use super::core::SimClient;
use super::request::ExecutionRequest;

impl SimClient {
    /// [`execute`](Self::execute) wrapped in the rate-limit retry loop.
    ///
    /// Only `RATE_LIMIT_EXCEEDED` is retried; any other error is returned from
    /// the attempt that produced it. Waits prefer the server's `retry-after`
    /// hint and otherwise follow the policy's exponential schedule, with
    /// ±25% jitter either way. A backoff sleep cannot be interrupted once it
    /// has started.
    ///
    /// Inputs are encoded once, before the first attempt, and every attempt
    /// sends that same body. Forward-only sources such as [`StreamInput`]
    /// are therefore read exactly once.
    ///
    /// [`StreamInput`]: crate::encoding::StreamInput
    pub fn execute_with_retry(
        &self,
        request: &ExecutionRequest,
        policy: &RetryPolicy,
    ) -> Result<ExecutionOutcome> {
        let body = request.body()?;
        let executor = RetryExecutor::new(policy.clone())
            .with_sleeper(self.sleeper.clone())
            .with_jitter(self.jitter.clone());

        executor.run(
            |attempt| {
                debug!(
                    workflow_id = request.workflow_id.as_str(),
                    attempt,
                    "sim workflow execution attempt"
                );
                self.dispatch(request, &body)
            },
            || self.rate_limits.retry_after_hint(),
        )
    }
}
