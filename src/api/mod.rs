//! Resource API clients: one module per backend noun.
//!
//! DESIGN
//! ======
//! Every call is a uniform translation of method, path and optional
//! query/body into one [`HttpClient::request`], followed by the shared
//! [`decode`] step.
//! No validation or retry lives here; the backend owns all consistency rules.
//!
//! ERROR HANDLING
//! ==============
//! Non-2xx responses become [`ApiError::Status`] carrying a human-readable
//! message pulled from the backend's error body. Auth flows use
//! [`ApiError::Rejected`] so the message alone is what users see.

#[cfg(test)]
#[path = "mod_test.rs"]
mod mod_test;

pub mod assignments;
pub mod auth;
pub mod book_copies;
pub mod books;
pub mod librarian;
pub mod readers;
pub mod reading_rooms;
pub mod types;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::net::{ApiResponse, HttpClient, NetError, RequestOptions, ResponseData};
use crate::token_store::TokenStoreError;
use types::Paginated;

pub use assignments::AssignmentsApi;
pub use auth::AuthApi;
pub use book_copies::BookCopiesApi;
pub use books::BooksApi;
pub use librarian::LibrarianApi;
pub use readers::ReadersApi;
pub use reading_rooms::ReadingRoomsApi;

const REQUEST_FAILED: &str = "Request failed";

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Net(#[from] NetError),
    #[error("HTTP {status}: {message}")]
    Status { status: u16, message: String },
    #[error("unexpected response body (HTTP {status}): {source}")]
    Decode { status: u16, source: serde_json::Error },
    /// The backend refused an auth action; the message is shown as-is.
    #[error("{0}")]
    Rejected(String),
    #[error(transparent)]
    Store(#[from] TokenStoreError),
}

// =============================================================================
// ERROR MESSAGES
// =============================================================================

/// `detail`, else the first `non_field_errors` entry.
#[must_use]
pub fn backend_message(data: &ResponseData) -> Option<String> {
    let value = data.as_json()?;
    if let Some(detail) = value.get("detail").and_then(Value::as_str) {
        return Some(detail.to_owned());
    }
    value
        .get("non_field_errors")
        .and_then(Value::as_array)
        .and_then(|errors| errors.first())
        .and_then(Value::as_str)
        .map(ToOwned::to_owned)
}

/// [`backend_message`], else an `error` string, else the whole payload
/// rendered as text, else `fallback`.
#[must_use]
pub fn describe_failure(data: &ResponseData, fallback: &str) -> String {
    if let Some(message) = backend_message(data) {
        return message;
    }
    match data {
        ResponseData::Json(Value::Null) | ResponseData::Empty => fallback.to_owned(),
        ResponseData::Json(value) => value
            .get("error")
            .and_then(Value::as_str)
            .map_or_else(|| value.to_string(), ToOwned::to_owned),
        ResponseData::Text(text) if text.trim().is_empty() => fallback.to_owned(),
        ResponseData::Text(text) => text.clone(),
    }
}

// =============================================================================
// DECODING
// =============================================================================

/// Turn a response into `T`, or into [`ApiError::Status`] when not ok.
///
/// # Errors
///
/// Returns [`ApiError::Status`] for non-2xx and [`ApiError::Decode`] when the
/// body does not match `T`.
pub fn decode<T: DeserializeOwned>(response: ApiResponse) -> Result<T, ApiError> {
    let response = ensure_ok(response)?;
    let status = response.status;
    serde_json::from_value(response.data.into_value()).map_err(|source| ApiError::Decode { status, source })
}

fn ensure_ok(response: ApiResponse) -> Result<ApiResponse, ApiError> {
    if response.ok {
        return Ok(response);
    }
    Err(ApiError::Status { status: response.status, message: describe_failure(&response.data, REQUEST_FAILED) })
}

pub(crate) fn json_body(value: &impl Serialize) -> Result<Value, ApiError> {
    serde_json::to_value(value).map_err(|e| ApiError::Net(NetError::Encode(e)))
}

pub(crate) async fn fetch<T: DeserializeOwned>(
    http: &HttpClient,
    path: &str,
    options: RequestOptions,
) -> Result<T, ApiError> {
    decode(http.request(path, options).await?)
}

pub(crate) async fn discard(http: &HttpClient, path: &str, options: RequestOptions) -> Result<(), ApiError> {
    ensure_ok(http.request(path, options).await?).map(|_| ())
}

// =============================================================================
// LIST PARAMS
// =============================================================================

/// Query filters shared by the list endpoints; unset fields are not sent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListParams {
    pub search: Option<String>,
    pub ordering: Option<String>,
    pub is_active: Option<bool>,
    pub is_returned: Option<bool>,
    pub page: Option<u32>,
    pub extra: Vec<(String, String)>,
}

impl ListParams {
    #[must_use]
    pub fn search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    #[must_use]
    pub fn ordering(mut self, ordering: impl Into<String>) -> Self {
        self.ordering = Some(ordering.into());
        self
    }

    #[must_use]
    pub fn active(mut self, is_active: bool) -> Self {
        self.is_active = Some(is_active);
        self
    }

    #[must_use]
    pub fn returned(mut self, is_returned: bool) -> Self {
        self.is_returned = Some(is_returned);
        self
    }

    #[must_use]
    pub fn page(mut self, page: u32) -> Self {
        self.page = Some(page);
        self
    }

    #[must_use]
    pub fn filter(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra.push((key.into(), value.into()));
        self
    }

    #[must_use]
    pub fn to_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::new();
        if let Some(search) = &self.search {
            pairs.push(("search".to_owned(), search.clone()));
        }
        if let Some(ordering) = &self.ordering {
            pairs.push(("ordering".to_owned(), ordering.clone()));
        }
        if let Some(is_active) = self.is_active {
            pairs.push(("is_active".to_owned(), is_active.to_string()));
        }
        if let Some(is_returned) = self.is_returned {
            pairs.push(("is_returned".to_owned(), is_returned.to_string()));
        }
        if let Some(page) = self.page {
            pairs.push(("page".to_owned(), page.to_string()));
        }
        pairs.extend(self.extra.iter().cloned());
        pairs
    }
}

// =============================================================================
// FACADE
// =============================================================================

/// Entry point bundling every resource client over one [`HttpClient`].
#[derive(Debug, Clone)]
pub struct LibraryApi {
    http: HttpClient,
}

impl LibraryApi {
    #[must_use]
    pub fn new(http: HttpClient) -> Self {
        Self { http }
    }

    #[must_use]
    pub fn http(&self) -> &HttpClient {
        &self.http
    }

    #[must_use]
    pub fn auth(&self) -> AuthApi<'_> {
        AuthApi::new(&self.http)
    }

    #[must_use]
    pub fn reading_rooms(&self) -> ReadingRoomsApi<'_> {
        ReadingRoomsApi::new(&self.http)
    }

    #[must_use]
    pub fn readers(&self) -> ReadersApi<'_> {
        ReadersApi::new(&self.http)
    }

    #[must_use]
    pub fn books(&self) -> BooksApi<'_> {
        BooksApi::new(&self.http)
    }

    #[must_use]
    pub fn book_copies(&self) -> BookCopiesApi<'_> {
        BookCopiesApi::new(&self.http)
    }

    #[must_use]
    pub fn assignments(&self) -> AssignmentsApi<'_> {
        AssignmentsApi::new(&self.http)
    }

    #[must_use]
    pub fn librarian(&self) -> LibrarianApi<'_> {
        LibrarianApi::new(&self.http)
    }

    /// Follow the absolute `next` link of a page, if there is one.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] if the request fails or the page does not decode.
    pub async fn next_page<T: DeserializeOwned>(&self, page: &Paginated<T>) -> Result<Option<Paginated<T>>, ApiError> {
        let Some(next) = page.next.as_deref() else {
            return Ok(None);
        };
        fetch(&self.http, next, RequestOptions::get()).await.map(Some)
    }
}
