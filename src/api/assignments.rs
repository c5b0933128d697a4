//! Loans of a book to a reader: `/api/book-assignments/`.

use super::types::{AssignmentDraft, BookAssignment, Paginated};
use super::{ApiError, ListParams, discard, fetch, json_body};
use crate::net::{HttpClient, RequestOptions};

const BASE: &str = "/api/book-assignments/";

fn item_path(id: u64) -> String {
    format!("{BASE}{id}/")
}

pub struct AssignmentsApi<'a> {
    http: &'a HttpClient,
}

impl<'a> AssignmentsApi<'a> {
    #[must_use]
    pub fn new(http: &'a HttpClient) -> Self {
        Self { http }
    }

    /// Supports `is_returned`.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] on network failure, non-2xx, or an unexpected body.
    pub async fn list(&self, params: &ListParams) -> Result<Paginated<BookAssignment>, ApiError> {
        fetch(self.http, BASE, RequestOptions::get().params(params.to_pairs())).await
    }

    /// # Errors
    ///
    /// Returns an [`ApiError`] on network failure, non-2xx, or an unexpected body.
    pub async fn get(&self, id: u64) -> Result<BookAssignment, ApiError> {
        fetch(self.http, &item_path(id), RequestOptions::get()).await
    }

    /// # Errors
    ///
    /// Returns an [`ApiError`] on network failure, non-2xx, or an unexpected body.
    pub async fn create(&self, draft: AssignmentDraft) -> Result<BookAssignment, ApiError> {
        fetch(self.http, BASE, RequestOptions::post().json(json_body(&draft)?)).await
    }

    /// Mark the loan returned; the backend stamps `return_date`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Status`] if the book was already returned.
    pub async fn return_book(&self, id: u64) -> Result<BookAssignment, ApiError> {
        let path = format!("{BASE}{id}/return_book/");
        fetch(self.http, &path, RequestOptions::post()).await
    }

    /// # Errors
    ///
    /// Returns an [`ApiError`] on network failure or non-2xx.
    pub async fn delete(&self, id: u64) -> Result<(), ApiError> {
        discard(self.http, &item_path(id), RequestOptions::delete()).await
    }
}
