//! Reading rooms: `/api/reading-rooms/`.

use super::types::{Paginated, ReadingRoom, ReadingRoomDraft};
use super::{ApiError, ListParams, discard, fetch, json_body};
use crate::net::{HttpClient, RequestOptions};

const BASE: &str = "/api/reading-rooms/";

fn item_path(id: u64) -> String {
    format!("{BASE}{id}/")
}

pub struct ReadingRoomsApi<'a> {
    http: &'a HttpClient,
}

impl<'a> ReadingRoomsApi<'a> {
    #[must_use]
    pub fn new(http: &'a HttpClient) -> Self {
        Self { http }
    }

    /// Supports `search` and `ordering` (`number`, `name`, `capacity`).
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] on network failure, non-2xx, or an unexpected body.
    pub async fn list(&self, params: &ListParams) -> Result<Paginated<ReadingRoom>, ApiError> {
        fetch(self.http, BASE, RequestOptions::get().params(params.to_pairs())).await
    }

    /// # Errors
    ///
    /// Returns an [`ApiError`] on network failure, non-2xx, or an unexpected body.
    pub async fn get(&self, id: u64) -> Result<ReadingRoom, ApiError> {
        fetch(self.http, &item_path(id), RequestOptions::get()).await
    }

    /// # Errors
    ///
    /// Returns an [`ApiError`] on network failure, non-2xx, or an unexpected body.
    pub async fn create(&self, draft: &ReadingRoomDraft) -> Result<ReadingRoom, ApiError> {
        fetch(self.http, BASE, RequestOptions::post().json(json_body(draft)?)).await
    }

    /// # Errors
    ///
    /// Returns an [`ApiError`] on network failure, non-2xx, or an unexpected body.
    pub async fn update(&self, id: u64, draft: &ReadingRoomDraft) -> Result<ReadingRoom, ApiError> {
        fetch(self.http, &item_path(id), RequestOptions::patch().json(json_body(draft)?)).await
    }

    /// # Errors
    ///
    /// Returns an [`ApiError`] on network failure or non-2xx.
    pub async fn delete(&self, id: u64) -> Result<(), ApiError> {
        discard(self.http, &item_path(id), RequestOptions::delete()).await
    }
}
