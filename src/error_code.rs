//! Machine-readable error codes carried by [`ClientError`](crate::error::ClientError).
//!
//! The client produces a small, fixed set of codes for failures it detects
//! itself. Any other code string sent back by the server in an error body is
//! kept verbatim as [`ErrorCode::Server`].
//!
//! | Code                   | Raised by                         | Retried |
//! |------------------------|-----------------------------------|---------|
//! | `RATE_LIMIT_EXCEEDED`  | execute, on HTTP 429              | yes     |
//! | `TIMEOUT`              | execute, local deadline exceeded  | no      |
//! | `EXECUTION_ERROR`      | execute, other transport failures | no      |
//! | `STATUS_ERROR`         | workflow/job status lookups       | no      |
//! | `USAGE_ERROR`          | usage-limit lookup                | no      |
//! | `MAX_RETRIES_EXCEEDED` | retry loop ended without an error | no      |
//!
//! ## Example
//!
//! ```rust
//! use simstudio::error_code::ErrorCode;
//!
//! let code = ErrorCode::parse("RATE_LIMIT_EXCEEDED");
//! assert_eq!(code, ErrorCode::RateLimitExceeded);
//! assert!(code.retryable());
//! assert_eq!(ErrorCode::parse("JOB_NOT_FOUND").as_str(), "JOB_NOT_FOUND");
//! ```

use std::fmt;

/// Error code attached to a client-side or server-side failure.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// HTTP 429 from the execute endpoint
    RateLimitExceeded,
    /// The per-call timeout elapsed before a response arrived
    Timeout,
    /// Transport failure while executing a workflow, or an unreadable result body
    ExecutionError,
    /// Transport failure while reading workflow or job status
    StatusError,
    /// Transport failure while reading usage limits
    UsageError,
    /// The retry loop finished without a result and without a recorded error
    MaxRetriesExceeded,
    /// Code string supplied by the server in an error body
    Server(String),
}

impl ErrorCode {
    /// Returns the wire representation (e.g. `"RATE_LIMIT_EXCEEDED"`).
    pub fn as_str(&self) -> &str {
        match self {
            Self::RateLimitExceeded => "RATE_LIMIT_EXCEEDED",
            Self::Timeout => "TIMEOUT",
            Self::ExecutionError => "EXECUTION_ERROR",
            Self::StatusError => "STATUS_ERROR",
            Self::UsageError => "USAGE_ERROR",
            Self::MaxRetriesExceeded => "MAX_RETRIES_EXCEEDED",
            Self::Server(code) => code.as_str(),
        }
    }

    /// Maps a code string back to a known variant, keeping unknown strings as
    /// [`ErrorCode::Server`].
    pub fn parse(code: &str) -> Self {
        match code {
            "RATE_LIMIT_EXCEEDED" => Self::RateLimitExceeded,
            "TIMEOUT" => Self::Timeout,
            "EXECUTION_ERROR" => Self::ExecutionError,
            "STATUS_ERROR" => Self::StatusError,
            "USAGE_ERROR" => Self::UsageError,
            "MAX_RETRIES_EXCEEDED" => Self::MaxRetriesExceeded,
            other => Self::Server(other.to_string()),
        }
    }

    /// Only rate limiting is recoverable by waiting and trying again.
    #[inline]
    pub fn retryable(&self) -> bool {
        matches!(self, Self::RateLimitExceeded)
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
