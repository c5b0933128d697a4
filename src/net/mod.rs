//! Networking for the REST backend.
//!
//! SYSTEM CONTEXT
//! ==============
//! `client` turns a path plus options into one prepared request and
//! normalizes the response; `transport` performs the actual network call.

pub mod client;
pub mod transport;

pub use client::{ApiResponse, Body, HttpClient, MultipartField, RequestOptions, ResponseData, TokenChoice};
pub use transport::{PreparedBody, PreparedRequest, RawResponse, ReqwestTransport, Transport};

/// Failures that prevent a request from producing an HTTP status.
///
/// HTTP 4xx/5xx responses are NOT errors at this layer; they come back as
/// [`ApiResponse`] with `ok == false`.
#[derive(Debug, thiserror::Error)]
pub enum NetError {
    #[error("invalid URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },
    #[error("invalid header: {0}")]
    InvalidHeader(String),
    #[error("body encode failed: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("network request failed: {0}")]
    Network(String),
    #[error("HTTP client build failed: {0}")]
    ClientBuild(String),
}
