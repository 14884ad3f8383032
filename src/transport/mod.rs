//! HTTP transport for outbound model calls.

mod http;

pub use http::HttpTransport;

/// Failures below the HTTP response layer: the request went out (or tried to)
/// and no response came back.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Transport error: {0}")]
    Other(String),
}
