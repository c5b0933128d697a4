//! Copies of a book shelved in a reading room: `/api/book-copies/`.
//!
//! The backend exposes no per-copy read or delete to this client; copies
//! disappear when their book is written off.

use super::types::{BookCopy, BookCopyDraft, Paginated};
use super::{ApiError, ListParams, fetch, json_body};
use crate::net::{HttpClient, RequestOptions};

const BASE: &str = "/api/book-copies/";

pub struct BookCopiesApi<'a> {
    http: &'a HttpClient,
}

impl<'a> BookCopiesApi<'a> {
    #[must_use]
    pub fn new(http: &'a HttpClient) -> Self {
        Self { http }
    }

    /// # Errors
    ///
    /// Returns an [`ApiError`] on network failure, non-2xx, or an unexpected body.
    pub async fn list(&self, params: &ListParams) -> Result<Paginated<BookCopy>, ApiError> {
        fetch(self.http, BASE, RequestOptions::get().params(params.to_pairs())).await
    }

    /// # Errors
    ///
    /// Returns an [`ApiError`] on network failure, non-2xx, or an unexpected body.
    pub async fn create(&self, draft: &BookCopyDraft) -> Result<BookCopy, ApiError> {
        fetch(self.http, BASE, RequestOptions::post().json(json_body(draft)?)).await
    }

    /// # Errors
    ///
    /// Returns an [`ApiError`] on network failure, non-2xx, or an unexpected body.
    pub async fn update(&self, id: u64, draft: &BookCopyDraft) -> Result<BookCopy, ApiError> {
        let path = format!("{BASE}{id}/");
        fetch(self.http, &path, RequestOptions::patch().json(json_body(draft)?)).await
    }
}
