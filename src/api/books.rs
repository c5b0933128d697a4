//! Book catalogue: `/api/books/`.

use super::types::{Book, BookDraft, Paginated};
use super::{ApiError, ListParams, discard, fetch, json_body};
use crate::net::{HttpClient, RequestOptions};

const BASE: &str = "/api/books/";

fn item_path(id: u64) -> String {
    format!("{BASE}{id}/")
}

pub struct BooksApi<'a> {
    http: &'a HttpClient,
}

impl<'a> BooksApi<'a> {
    #[must_use]
    pub fn new(http: &'a HttpClient) -> Self {
        Self { http }
    }

    /// Supports `is_active` and `search`.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] on network failure, non-2xx, or an unexpected body.
    pub async fn list(&self, params: &ListParams) -> Result<Paginated<Book>, ApiError> {
        fetch(self.http, BASE, RequestOptions::get().params(params.to_pairs())).await
    }

    /// # Errors
    ///
    /// Returns an [`ApiError`] on network failure, non-2xx, or an unexpected body.
    pub async fn get(&self, id: u64) -> Result<Book, ApiError> {
        fetch(self.http, &item_path(id), RequestOptions::get()).await
    }

    /// # Errors
    ///
    /// Returns an [`ApiError`] on network failure, non-2xx, or an unexpected body.
    pub async fn create(&self, draft: &BookDraft) -> Result<Book, ApiError> {
        fetch(self.http, BASE, RequestOptions::post().json(json_body(draft)?)).await
    }

    /// # Errors
    ///
    /// Returns an [`ApiError`] on network failure, non-2xx, or an unexpected body.
    pub async fn update(&self, id: u64, draft: &BookDraft) -> Result<Book, ApiError> {
        fetch(self.http, &item_path(id), RequestOptions::patch().json(json_body(draft)?)).await
    }

    /// # Errors
    ///
    /// Returns an [`ApiError`] on network failure or non-2xx.
    pub async fn delete(&self, id: u64) -> Result<(), ApiError> {
        discard(self.http, &item_path(id), RequestOptions::delete()).await
    }
}
