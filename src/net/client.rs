//! HTTP client adapter: URL building, token injection, body encoding, and
//! response normalization.
//!
//! ERROR HANDLING
//! ==============
//! Only failures that prevent a status from arriving are `Err`. A 4xx/5xx is
//! returned as `ApiResponse { ok: false, .. }` and the caller decides how to
//! read `data` as an error payload. A body that is not JSON is downgraded to
//! raw text, never an error.

#[cfg(test)]
#[path = "client_test.rs"]
mod client_test;

use std::sync::Arc;

use reqwest::Method;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use serde_json::Value;

use super::NetError;
use super::transport::{PreparedBody, PreparedRequest, RawResponse, ReqwestTransport, Transport};
use crate::config::{ClientConfig, normalize_base_url};
use crate::token_store::TokenStore;

/// One field of a `multipart/form-data` body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MultipartField {
    Text { name: String, value: String },
    File { name: String, file_name: String, content_type: Option<String>, bytes: Vec<u8> },
}

/// Request payload as handed to the client.
#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    /// Serialized as JSON; `Content-Type: application/json` is added unless
    /// the caller already set a content type.
    Json(Value),
    /// Passed through unchanged.
    Form(Vec<(String, String)>),
    /// Passed through unchanged.
    Multipart(Vec<MultipartField>),
    /// Passed through unchanged.
    Raw(Vec<u8>),
}

/// Which token, if any, goes into the `Authorization` header.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TokenChoice {
    /// Whatever the token store currently holds.
    #[default]
    Stored,
    Explicit(String),
    /// Send no token even if one is stored (login, registration).
    Anonymous,
}

#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    pub method: Method,
    pub params: Vec<(String, String)>,
    pub body: Option<Body>,
    pub token: TokenChoice,
    pub headers: HeaderMap,
}

impl RequestOptions {
    #[must_use]
    pub fn get() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn post() -> Self {
        Self::with_method(Method::POST)
    }

    #[must_use]
    pub fn patch() -> Self {
        Self::with_method(Method::PATCH)
    }

    #[must_use]
    pub fn delete() -> Self {
        Self::with_method(Method::DELETE)
    }

    #[must_use]
    pub fn with_method(method: Method) -> Self {
        Self { method, ..Self::default() }
    }

    #[must_use]
    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.push((key.into(), value.into()));
        self
    }

    #[must_use]
    pub fn params(mut self, params: impl IntoIterator<Item = (String, String)>) -> Self {
        self.params.extend(params);
        self
    }

    #[must_use]
    pub fn json(mut self, value: Value) -> Self {
        self.body = Some(Body::Json(value));
        self
    }

    #[must_use]
    pub fn body(mut self, body: Body) -> Self {
        self.body = Some(body);
        self
    }

    #[must_use]
    pub fn token(mut self, token: TokenChoice) -> Self {
        self.token = token;
        self
    }

    #[must_use]
    pub fn anonymous(self) -> Self {
        self.token(TokenChoice::Anonymous)
    }

    /// Add a passthrough header.
    ///
    /// # Errors
    ///
    /// Returns [`NetError::InvalidHeader`] if the name or value is not a valid header.
    pub fn header(mut self, name: &str, value: &str) -> Result<Self, NetError> {
        let name = HeaderName::from_bytes(name.as_bytes()).map_err(|e| NetError::InvalidHeader(e.to_string()))?;
        let value = HeaderValue::from_str(value).map_err(|e| NetError::InvalidHeader(e.to_string()))?;
        self.headers.insert(name, value);
        Ok(self)
    }
}

/// Response body after best-effort JSON parsing.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseData {
    Empty,
    Json(Value),
    Text(String),
}

impl ResponseData {
    #[must_use]
    pub fn parse(text: String) -> Self {
        if text.is_empty() {
            return Self::Empty;
        }
        match serde_json::from_str::<Value>(&text) {
            Ok(value) => Self::Json(value),
            Err(_) => Self::Text(text),
        }
    }

    #[must_use]
    pub fn as_json(&self) -> Option<&Value> {
        match self {
            Self::Json(value) => Some(value),
            Self::Empty | Self::Text(_) => None,
        }
    }

    /// Collapse into a JSON value: `Empty` becomes `null`, text becomes a string.
    #[must_use]
    pub fn into_value(self) -> Value {
        match self {
            Self::Empty => Value::Null,
            Self::Json(value) => value,
            Self::Text(text) => Value::String(text),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub data: ResponseData,
    pub status: u16,
    /// True iff `status` is in `200..=299`.
    pub ok: bool,
}

impl ApiResponse {
    #[must_use]
    pub fn from_raw(raw: RawResponse) -> Self {
        Self {
            ok: (200..=299).contains(&raw.status),
            status: raw.status,
            data: ResponseData::parse(raw.body),
        }
    }
}

/// Cheap to clone: the transport and token store are shared.
#[derive(Clone)]
pub struct HttpClient {
    base_url: String,
    transport: Arc<dyn Transport>,
    tokens: Arc<dyn TokenStore>,
}

impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClient").field("base_url", &self.base_url).finish_non_exhaustive()
    }
}

impl HttpClient {
    #[must_use]
    pub fn new(base_url: &str, transport: Arc<dyn Transport>, tokens: Arc<dyn TokenStore>) -> Self {
        Self { base_url: normalize_base_url(base_url), transport, tokens }
    }

    /// Build a client backed by reqwest.
    ///
    /// # Errors
    ///
    /// Returns [`NetError::ClientBuild`] if the reqwest client cannot be built.
    pub fn from_config(config: &ClientConfig, tokens: Arc<dyn TokenStore>) -> Result<Self, NetError> {
        let transport = ReqwestTransport::new(config.timeouts)?;
        Ok(Self::new(&config.base_url, Arc::new(transport), tokens))
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    #[must_use]
    pub fn token_store(&self) -> &Arc<dyn TokenStore> {
        &self.tokens
    }

    /// Resolve `path` against the base URL and append `params` as a query.
    ///
    /// Paths starting with `http` are used as-is. Params join with `&` when
    /// the path already carries a query string.
    #[must_use]
    pub fn build_url(&self, path: &str, params: &[(String, String)]) -> String {
        let base = if path.starts_with("http") { path.to_owned() } else { format!("{}{}", self.base_url, path) };
        if params.is_empty() {
            return base;
        }
        let mut query = url::form_urlencoded::Serializer::new(String::new());
        query.extend_pairs(params);
        let separator = if base.contains('?') { '&' } else { '?' };
        format!("{base}{separator}{}", query.finish())
    }

    /// Resolve URL, token, and body into a request ready for the transport.
    ///
    /// # Errors
    ///
    /// Returns a [`NetError`] if the URL does not parse, the token is not a
    /// valid header value, or a JSON body fails to serialize.
    pub fn prepare(&self, path: &str, options: RequestOptions) -> Result<PreparedRequest, NetError> {
        let RequestOptions { method, params, body, token, mut headers } = options;

        let url = self.build_url(path, &params);
        if let Err(e) = url::Url::parse(&url) {
            return Err(NetError::InvalidUrl { url, reason: e.to_string() });
        }

        let token = match token {
            TokenChoice::Stored => self.tokens.get(),
            TokenChoice::Explicit(token) => Some(token),
            TokenChoice::Anonymous => None,
        };
        if let Some(token) = token.filter(|t| !t.is_empty()) {
            let value = HeaderValue::from_str(&format!("Token {token}"))
                .map_err(|e| NetError::InvalidHeader(e.to_string()))?;
            headers.insert(AUTHORIZATION, value);
        }

        let body = match body {
            None => PreparedBody::Empty,
            Some(Body::Json(value)) => {
                if !headers.contains_key(CONTENT_TYPE) {
                    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
                }
                PreparedBody::Bytes(serde_json::to_vec(&value)?)
            }
            Some(Body::Form(pairs)) => PreparedBody::Form(pairs),
            Some(Body::Multipart(fields)) => PreparedBody::Multipart(fields),
            Some(Body::Raw(bytes)) => PreparedBody::Bytes(bytes),
        };

        Ok(PreparedRequest { method, url, headers, body })
    }

    /// Perform one request and normalize the response.
    ///
    /// # Errors
    ///
    /// Returns a [`NetError`] if the request cannot be prepared or no HTTP
    /// status was received. HTTP error statuses are NOT errors.
    pub async fn request(&self, path: &str, options: RequestOptions) -> Result<ApiResponse, NetError> {
        let prepared = self.prepare(path, options)?;
        let method = prepared.method.clone();
        let url = prepared.url.clone();

        let raw = match self.transport.send(prepared).await {
            Ok(raw) => raw,
            Err(e) => {
                tracing::debug!(%method, %url, error = %e, "request failed");
                return Err(e);
            }
        };
        tracing::debug!(%method, %url, status = raw.status, "request completed");
        Ok(ApiResponse::from_raw(raw))
    }
}
