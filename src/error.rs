use crate::error_code::ErrorCode;
use std::fmt;
use thiserror::Error;

/// Structured context for configuration failures.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ErrorContext {
    /// Builder field or environment variable that was rejected (e.g. "base_url", "SIM_API_KEY")
    pub field_path: Option<String>,
    /// Additional context about the error (e.g. the offending value or parser message)
    pub details: Option<String>,
    /// Component that raised the error (e.g. "client_builder")
    pub source: Option<String>,
}

impl ErrorContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_field_path(mut self, path: impl Into<String>) -> Self {
        self.field_path = Some(path.into());
        self
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }
}

/// A failure reported by the Sim API or detected while talking to it.
///
/// `code` is the machine-readable classification; [`ErrorCode::RateLimitExceeded`]
/// is the only one the retry controller acts on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientError {
    pub message: String,
    pub code: Option<ErrorCode>,
    pub status: Option<u16>,
}

impl ClientError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: None,
            status: None,
        }
    }

    pub fn with_code(mut self, code: ErrorCode) -> Self {
        self.code = Some(code);
        self
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for ClientError {}

/// Unified error type for the Sim client.
#[derive(Debug, Error)]
pub enum Error {
    /// API or transport failure with an optional code and HTTP status.
    #[error(transparent)]
    Client(#[from] ClientError),

    /// A readable source failed while its bytes were being encoded.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {message}{}", format_context(.context))]
    Configuration {
        message: String,
        context: ErrorContext,
    },
}

fn format_context(ctx: &ErrorContext) -> String {
    let mut parts = Vec::new();
    if let Some(ref field) = ctx.field_path {
        parts.push(format!("field: {}", field));
    }
    if let Some(ref details) = ctx.details {
        parts.push(format!("details: {}", details));
    }
    if let Some(ref source) = ctx.source {
        parts.push(format!("source: {}", source));
    }
    if parts.is_empty() {
        String::new()
    } else {
        format!(" ({})", parts.join(", "))
    }
}

impl Error {
    pub fn configuration_with_context(msg: impl Into<String>, context: ErrorContext) -> Self {
        Error::Configuration {
            message: msg.into(),
            context,
        }
    }

    /// The API failure, if this is one.
    pub fn as_client_error(&self) -> Option<&ClientError> {
        match self {
            Error::Client(e) => Some(e),
            _ => None,
        }
    }

    pub fn code(&self) -> Option<&ErrorCode> {
        self.as_client_error().and_then(|e| e.code.as_ref())
    }

    pub fn status(&self) -> Option<u16> {
        self.as_client_error().and_then(|e| e.status)
    }

    pub fn is_rate_limited(&self) -> bool {
        matches!(self.code(), Some(ErrorCode::RateLimitExceeded))
    }
}
