//! Librarian operations: `/api/librarian-operations/`.
//!
//! These are actions rather than a resource; each is a single POST or GET
//! whose effect (deactivation, write-off, shelving) happens server-side.

use serde_json::json;

use super::types::{AcceptBookDraft, Book, MonthlyReport, Reader, ReaderDraft, UnregisterResult, WriteOffResult};
use super::{ApiError, fetch, json_body};
use crate::net::{HttpClient, RequestOptions};

const BASE: &str = "/api/librarian-operations/";

fn action_path(action: &str) -> String {
    format!("{BASE}{action}/")
}

pub struct LibrarianApi<'a> {
    http: &'a HttpClient,
}

impl<'a> LibrarianApi<'a> {
    #[must_use]
    pub fn new(http: &'a HttpClient) -> Self {
        Self { http }
    }

    /// # Errors
    ///
    /// Returns [`ApiError::Status`] with the backend's validation message on 400.
    pub async fn register_reader(&self, draft: &ReaderDraft) -> Result<Reader, ApiError> {
        let options = RequestOptions::post().json(json_body(draft)?);
        fetch(self.http, &action_path("register_reader"), options).await
    }

    /// Deactivate readers registered over a year ago who never re-registered.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] on network failure, non-2xx, or an unexpected body.
    pub async fn unregister_old_readers(&self) -> Result<UnregisterResult, ApiError> {
        fetch(self.http, &action_path("unregister_old_readers"), RequestOptions::post()).await
    }

    /// # Errors
    ///
    /// Returns [`ApiError::Status`] (404) if the book does not exist.
    pub async fn write_off_book(&self, book_id: u64) -> Result<WriteOffResult, ApiError> {
        let options = RequestOptions::post().json(json!({ "book_id": book_id }));
        fetch(self.http, &action_path("write_off_book"), options).await
    }

    /// # Errors
    ///
    /// Returns [`ApiError::Status`] with the backend's validation message on 400.
    pub async fn accept_book(&self, draft: &AcceptBookDraft) -> Result<Book, ApiError> {
        let options = RequestOptions::post().json(json_body(draft)?);
        fetch(self.http, &action_path("accept_book"), options).await
    }

    /// # Errors
    ///
    /// Returns an [`ApiError`] on network failure, non-2xx, or an unexpected body.
    pub async fn monthly_report(&self, month: u32, year: i32) -> Result<MonthlyReport, ApiError> {
        let options = RequestOptions::get().param("month", month.to_string()).param("year", year.to_string());
        fetch(self.http, &action_path("monthly_report"), options).await
    }
}
