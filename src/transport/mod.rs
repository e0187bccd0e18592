//! HTTP transport: one pooled blocking session per client.

pub mod http;

pub use http::{HttpResponse, HttpTransport, TransportConfig, TransportError};
