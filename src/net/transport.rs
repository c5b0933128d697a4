//! The single network round-trip behind [`HttpClient`](super::HttpClient).
//!
//! DESIGN
//! ======
//! Everything that can be decided without the network (URL, headers, body
//! encoding) happens before a [`PreparedRequest`] reaches a `Transport`, so
//! the trait stays a one-method seam that tests can script.

use reqwest::Method;
use reqwest::header::HeaderMap;

use super::NetError;
use crate::config::Timeouts;

/// A request body after the client has decided how to encode it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreparedBody {
    Empty,
    Bytes(Vec<u8>),
    /// Sent as `application/x-www-form-urlencoded` by the transport.
    Form(Vec<(String, String)>),
    /// Sent as `multipart/form-data` by the transport.
    Multipart(Vec<super::MultipartField>),
}

#[derive(Debug, Clone)]
pub struct PreparedRequest {
    pub method: Method,
    pub url: String,
    pub headers: HeaderMap,
    pub body: PreparedBody,
}

/// Status plus the full body text; parsing happens in the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

#[async_trait::async_trait]
pub trait Transport: Send + Sync {
    /// Perform exactly one network call.
    ///
    /// # Errors
    ///
    /// Returns [`NetError::Network`] when no HTTP status was received
    /// (DNS failure, refused connection, timeout, truncated body).
    async fn send(&self, request: PreparedRequest) -> Result<RawResponse, NetError>;
}

// =============================================================================
// REQWEST
// =============================================================================

pub struct ReqwestTransport {
    http: reqwest::Client,
}

impl ReqwestTransport {
    /// Build a transport, applying only the timeouts that are configured.
    ///
    /// # Errors
    ///
    /// Returns [`NetError::ClientBuild`] if the TLS backend cannot be initialized.
    pub fn new(timeouts: Timeouts) -> Result<Self, NetError> {
        let mut builder = reqwest::Client::builder();
        if let Some(request) = timeouts.request {
            builder = builder.timeout(request);
        }
        if let Some(connect) = timeouts.connect {
            builder = builder.connect_timeout(connect);
        }
        let http = builder.build().map_err(|e| NetError::ClientBuild(e.to_string()))?;
        Ok(Self { http })
    }
}

#[async_trait::async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: PreparedRequest) -> Result<RawResponse, NetError> {
        let PreparedRequest { method, url, headers, body } = request;
        let builder = self.http.request(method, &url).headers(headers);
        let builder = match body {
            PreparedBody::Empty => builder,
            PreparedBody::Bytes(bytes) => builder.body(bytes),
            PreparedBody::Form(pairs) => builder.form(&pairs),
            PreparedBody::Multipart(fields) => builder.multipart(multipart_form(fields)?),
        };

        let response = builder.send().await.map_err(|e| NetError::Network(e.to_string()))?;
        let status = response.status().as_u16();
        let body = response.text().await.map_err(|e| NetError::Network(e.to_string()))?;
        Ok(RawResponse { status, body })
    }
}

fn multipart_form(fields: Vec<super::MultipartField>) -> Result<reqwest::multipart::Form, NetError> {
    use super::MultipartField;

    let mut form = reqwest::multipart::Form::new();
    for field in fields {
        form = match field {
            MultipartField::Text { name, value } => form.text(name, value),
            MultipartField::File { name, file_name, content_type, bytes } => {
                let mut part = reqwest::multipart::Part::bytes(bytes).file_name(file_name);
                if let Some(content_type) = content_type {
                    part = part
                        .mime_str(&content_type)
                        .map_err(|e| NetError::InvalidHeader(e.to_string()))?;
                }
                form.part(name, part)
            }
        };
    }
    Ok(form)
}

// =============================================================================
// TEST DOUBLE
// =============================================================================
