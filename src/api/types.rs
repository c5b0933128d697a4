//! Wire DTOs for the library backend.
//!
//! DESIGN
//! ======
//! Read models mirror the backend serializers; fields the backend computes
//! (counts, names of related rows) are optional because list and detail
//! endpoints do not always include them. Draft types are write payloads:
//! every field is optional and omitted when unset, so one type serves both
//! create (POST) and partial update (PATCH).

#[cfg(test)]
#[path = "types_test.rs"]
mod types_test;

use serde::{Deserialize, Deserializer, Serialize};

/// Distinguish an explicit `null` (`Some(None)`) from a missing field (`None`).
fn explicit_null<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

// =============================================================================
// AUTH
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: u64,
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginPayload<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Clone, Serialize)]
pub struct RegisterPayload<'a> {
    pub username: &'a str,
    pub password: &'a str,
    pub re_password: &'a str,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub auth_token: String,
}

/// Partial update of the current user's profile.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateMe {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub re_new_password: Option<String>,
}

// =============================================================================
// PAGINATION
// =============================================================================

/// Page envelope, passed through verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Paginated<T> {
    pub count: u64,
    pub next: Option<String>,
    pub previous: Option<String>,
    pub results: Vec<T>,
}

// =============================================================================
// READ MODELS
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadingRoom {
    pub id: u64,
    pub number: String,
    pub name: String,
    pub capacity: u32,
    #[serde(default)]
    pub readers_count: Option<u32>,
    #[serde(default)]
    pub total_books_count: Option<u32>,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// Education level as stored by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Education {
    Primary,
    Secondary,
    Higher,
    Degree,
    #[serde(untagged)]
    Other(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reader {
    pub id: u64,
    pub ticket_number: String,
    pub full_name: String,
    pub passport_number: String,
    pub birth_date: String,
    #[serde(default)]
    pub age: Option<u32>,
    pub address: String,
    pub phone_number: String,
    pub education: Education,
    pub has_degree: bool,
    #[serde(default)]
    pub reading_room: Option<u64>,
    #[serde(default)]
    pub reading_room_name: Option<String>,
    pub registration_date: String,
    #[serde(default)]
    pub unregistration_date: Option<String>,
    pub is_active: bool,
    #[serde(default)]
    pub active_books_count: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    pub id: u64,
    pub title: String,
    pub authors: String,
    pub publisher: String,
    pub publication_year: u32,
    pub section: String,
    pub code: String,
    #[serde(default)]
    pub total_copies: Option<u32>,
    #[serde(default)]
    pub active_assignments_count: Option<u32>,
    pub is_active: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookCopy {
    pub id: u64,
    pub book: u64,
    #[serde(default)]
    pub book_title: Option<String>,
    pub reading_room: u64,
    #[serde(default)]
    pub reading_room_name: Option<String>,
    pub quantity: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookAssignment {
    pub id: u64,
    pub book: u64,
    #[serde(default)]
    pub book_title: Option<String>,
    pub reader: u64,
    #[serde(default)]
    pub reader_name: Option<String>,
    #[serde(default)]
    pub reader_ticket: Option<String>,
    pub assignment_date: String,
    #[serde(default)]
    pub return_date: Option<String>,
    pub is_returned: bool,
    /// `None` once the book is back.
    #[serde(default)]
    pub days_since_assignment: Option<i64>,
}

// =============================================================================
// REPORTS
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct YoungReaders {
    pub count: u64,
}

/// Share of active readers per education level, in percent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EducationStats {
    pub primary: f64,
    pub secondary: f64,
    pub higher: f64,
    pub degree: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnregisterResult {
    pub message: String,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WriteOffResult {
    pub message: String,
    pub book: Book,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomDailyStat {
    pub room_id: u64,
    pub room_name: String,
    pub books_count: u64,
    pub readers_count: u64,
    pub new_readers_count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyStat {
    pub date: String,
    pub books_count: u64,
    pub readers_count: u64,
    pub new_readers_count: u64,
    #[serde(default)]
    pub rooms: Vec<RoomDailyStat>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyReport {
    pub month: u32,
    pub year: i32,
    pub daily_stats: Vec<DailyStat>,
    pub total_new_readers: u64,
}

// =============================================================================
// DRAFTS
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadingRoomDraft {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capacity: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReaderDraft {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ticket_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub passport_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub birth_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub education: Option<Education>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_degree: Option<bool>,
    /// `Some(None)` clears the room assignment.
    #[serde(default, deserialize_with = "explicit_null", skip_serializing_if = "Option::is_none")]
    pub reading_room: Option<Option<u64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookDraft {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authors: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publisher: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publication_year: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookCopyDraft {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub book: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reading_room: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignmentDraft {
    pub book: u64,
    pub reader: u64,
}

/// A new book plus, optionally, the copies to shelve in one room.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AcceptBookDraft {
    #[serde(flatten)]
    pub book: BookDraft,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reading_room_id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<u32>,
}
