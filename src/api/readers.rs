//! Library readers: `/api/readers/` plus the report actions hanging off it.

use super::types::{BookAssignment, EducationStats, Paginated, Reader, ReaderDraft, YoungReaders};
use super::{ApiError, ListParams, discard, fetch, json_body};
use crate::net::{HttpClient, RequestOptions};

const BASE: &str = "/api/readers/";

fn item_path(id: u64) -> String {
    format!("{BASE}{id}/")
}

pub struct ReadersApi<'a> {
    http: &'a HttpClient,
}

impl<'a> ReadersApi<'a> {
    #[must_use]
    pub fn new(http: &'a HttpClient) -> Self {
        Self { http }
    }

    /// Supports `is_active` and `search`.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] on network failure, non-2xx, or an unexpected body.
    pub async fn list(&self, params: &ListParams) -> Result<Paginated<Reader>, ApiError> {
        fetch(self.http, BASE, RequestOptions::get().params(params.to_pairs())).await
    }

    /// # Errors
    ///
    /// Returns an [`ApiError`] on network failure, non-2xx, or an unexpected body.
    pub async fn get(&self, id: u64) -> Result<Reader, ApiError> {
        fetch(self.http, &item_path(id), RequestOptions::get()).await
    }

    /// Loans the reader has not returned yet.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] on network failure, non-2xx, or an unexpected body.
    pub async fn books(&self, id: u64) -> Result<Vec<BookAssignment>, ApiError> {
        let path = format!("{BASE}{id}/books/");
        fetch(self.http, &path, RequestOptions::get()).await
    }

    /// Readers holding a book for more than a month.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] on network failure, non-2xx, or an unexpected body.
    pub async fn old_assignments(&self) -> Result<Vec<Reader>, ApiError> {
        self.report("old_assignments").await
    }

    /// Readers holding a book with at most two copies in the library.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] on network failure, non-2xx, or an unexpected body.
    pub async fn with_rare_books(&self) -> Result<Vec<Reader>, ApiError> {
        self.report("with_rare_books").await
    }

    /// Number of active readers younger than twenty.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] on network failure, non-2xx, or an unexpected body.
    pub async fn young_readers(&self) -> Result<YoungReaders, ApiError> {
        self.report("young_readers").await
    }

    /// # Errors
    ///
    /// Returns an [`ApiError`] on network failure, non-2xx, or an unexpected body.
    pub async fn education_stats(&self) -> Result<EducationStats, ApiError> {
        self.report("education_stats").await
    }

    /// # Errors
    ///
    /// Returns an [`ApiError`] on network failure, non-2xx, or an unexpected body.
    pub async fn create(&self, draft: &ReaderDraft) -> Result<Reader, ApiError> {
        fetch(self.http, BASE, RequestOptions::post().json(json_body(draft)?)).await
    }

    /// # Errors
    ///
    /// Returns an [`ApiError`] on network failure, non-2xx, or an unexpected body.
    pub async fn update(&self, id: u64, draft: &ReaderDraft) -> Result<Reader, ApiError> {
        fetch(self.http, &item_path(id), RequestOptions::patch().json(json_body(draft)?)).await
    }

    /// # Errors
    ///
    /// Returns an [`ApiError`] on network failure or non-2xx.
    pub async fn delete(&self, id: u64) -> Result<(), ApiError> {
        discard(self.http, &item_path(id), RequestOptions::delete()).await
    }

    async fn report<T: serde::de::DeserializeOwned>(&self, action: &str) -> Result<T, ApiError> {
        let path = format!("{BASE}{action}/");
        fetch(self.http, &path, RequestOptions::get()).await
    }
}
