use std::sync::Arc;

use reqwest::Method;
use serde_json::json;

use super::types::*;
use super::*;
use crate::net::transport::testing::ScriptedTransport;
use crate::net::{PreparedBody, PreparedRequest};
use crate::token_store::MemoryTokenStore;

fn api_with(transport: ScriptedTransport) -> (LibraryApi, Arc<ScriptedTransport>) {
    let transport = Arc::new(transport);
    let http = HttpClient::new("http://library.test", transport.clone(), Arc::new(MemoryTokenStore::with_token("t0k")));
    (LibraryApi::new(http), transport)
}

fn sent_json(request: &PreparedRequest) -> Value {
    let PreparedBody::Bytes(bytes) = &request.body else {
        panic!("expected JSON bytes, got {:?}", request.body);
    };
    serde_json::from_slice(bytes).unwrap()
}

fn room_json(id: u64) -> Value {
    json!({ "id": id, "number": format!("R{id}"), "name": "Main", "capacity": 40 })
}

fn book_json(id: u64) -> Value {
    json!({
        "id": id, "title": "Dune", "authors": "F. Herbert", "publisher": "Ace",
        "publication_year": 1965, "section": "SF", "code": "SF-1", "is_active": false
    })
}

// =============================================================================
// error messages
// =============================================================================

#[test]
fn backend_message_prefers_detail() {
    let data = ResponseData::Json(json!({ "detail": "Invalid token.", "non_field_errors": ["x"] }));
    assert_eq!(backend_message(&data).as_deref(), Some("Invalid token."));
}

#[test]
fn backend_message_falls_back_to_first_non_field_error() {
    let data = ResponseData::Json(json!({ "non_field_errors": ["first", "second"] }));
    assert_eq!(backend_message(&data).as_deref(), Some("first"));
}

#[test]
fn backend_message_none_for_text_or_other_shapes() {
    assert_eq!(backend_message(&ResponseData::Text("oops".to_owned())), None);
    assert_eq!(backend_message(&ResponseData::Json(json!({ "username": ["taken"] }))), None);
}

#[test]
fn describe_failure_uses_error_key_then_dump_then_fallback() {
    let error_key = ResponseData::Json(json!({ "error": "Book already returned" }));
    assert_eq!(describe_failure(&error_key, "fallback"), "Book already returned");

    let field_errors = ResponseData::Json(json!({ "username": ["taken"] }));
    assert_eq!(describe_failure(&field_errors, "fallback"), r#"{"username":["taken"]}"#);

    assert_eq!(describe_failure(&ResponseData::Empty, "fallback"), "fallback");
    assert_eq!(describe_failure(&ResponseData::Text("  ".to_owned()), "fallback"), "fallback");
    assert_eq!(describe_failure(&ResponseData::Text("Bad Gateway".to_owned()), "fallback"), "Bad Gateway");
}

// =============================================================================
// decode
// =============================================================================

#[test]
fn decode_non_ok_is_status_error() {
    let response = ApiResponse { data: ResponseData::Json(json!({ "detail": "Not found." })), status: 404, ok: false };
    let err = decode::<ReadingRoom>(response).unwrap_err();
    assert!(matches!(err, ApiError::Status { status: 404, ref message } if message == "Not found."));
}

#[test]
fn decode_wrong_shape_is_decode_error() {
    let response = ApiResponse { data: ResponseData::Text("<html>".to_owned()), status: 200, ok: true };
    assert!(matches!(decode::<ReadingRoom>(response), Err(ApiError::Decode { status: 200, .. })));
}

// =============================================================================
// ListParams
// =============================================================================

#[test]
fn list_params_only_sends_set_filters() {
    assert!(ListParams::default().to_pairs().is_empty());

    let pairs = ListParams::default().search("ann").active(true).page(2).filter("book", "3").to_pairs();
    assert_eq!(
        pairs,
        vec![
            ("search".to_owned(), "ann".to_owned()),
            ("is_active".to_owned(), "true".to_owned()),
            ("page".to_owned(), "2".to_owned()),
            ("book".to_owned(), "3".to_owned()),
        ]
    );
}

// =============================================================================
// resource clients
// =============================================================================

#[tokio::test]
async fn reading_rooms_list_passes_params_and_envelope() {
    let page = json!({ "count": 1, "next": null, "previous": null, "results": [room_json(1)] });
    let (api, transport) = api_with(ScriptedTransport::new().respond_json(200, &page));

    let rooms = api.reading_rooms().list(&ListParams::default().ordering("capacity")).await.unwrap();
    assert_eq!(rooms.count, 1);
    assert_eq!(rooms.results[0].number, "R1");

    let request = &transport.requests()[0];
    assert_eq!(request.method, Method::GET);
    assert_eq!(request.url, "http://library.test/api/reading-rooms/?ordering=capacity");
    assert_eq!(request.headers.get("authorization").unwrap(), "Token t0k");
}

#[tokio::test]
async fn reading_rooms_update_patches_item_path() {
    let (api, transport) = api_with(ScriptedTransport::new().respond_json(200, &room_json(4)));
    let draft = ReadingRoomDraft { capacity: Some(55), ..ReadingRoomDraft::default() };

    api.reading_rooms().update(4, &draft).await.unwrap();

    let request = &transport.requests()[0];
    assert_eq!(request.method, Method::PATCH);
    assert_eq!(request.url, "http://library.test/api/reading-rooms/4/");
    assert_eq!(sent_json(request), json!({ "capacity": 55 }));
}

#[tokio::test]
async fn delete_accepts_empty_204() {
    let (api, transport) = api_with(ScriptedTransport::new().respond(204, ""));
    api.books().delete(9).await.unwrap();
    let request = &transport.requests()[0];
    assert_eq!(request.method, Method::DELETE);
    assert_eq!(request.url, "http://library.test/api/books/9/");
}

#[tokio::test]
async fn readers_report_actions_hit_their_paths() {
    let transport = ScriptedTransport::new()
        .respond_json(200, &json!([]))
        .respond_json(200, &json!([]))
        .respond_json(200, &json!({ "count": 3 }))
        .respond_json(200, &json!({ "primary": 10.0, "secondary": 40.0, "higher": 45.5, "degree": 4.5 }))
        .respond_json(200, &json!([]));
    let (api, transport) = api_with(transport);
    let readers = api.readers();

    assert!(readers.old_assignments().await.unwrap().is_empty());
    assert!(readers.with_rare_books().await.unwrap().is_empty());
    assert_eq!(readers.young_readers().await.unwrap().count, 3);
    assert!((readers.education_stats().await.unwrap().higher - 45.5).abs() < f64::EPSILON);
    assert!(readers.books(12).await.unwrap().is_empty());

    let urls: Vec<String> = transport.requests().into_iter().map(|r| r.url).collect();
    assert_eq!(
        urls,
        vec![
            "http://library.test/api/readers/old_assignments/",
            "http://library.test/api/readers/with_rare_books/",
            "http://library.test/api/readers/young_readers/",
            "http://library.test/api/readers/education_stats/",
            "http://library.test/api/readers/12/books/",
        ]
    );
}

#[tokio::test]
async fn assignments_create_and_return() {
    let loan = json!({ "id": 5, "book": 1, "reader": 2, "assignment_date": "2026-10-01", "is_returned": false });
    let returned = json!({
        "id": 5, "book": 1, "reader": 2, "assignment_date": "2026-10-01",
        "is_returned": true, "return_date": "2026-10-19"
    });
    let transport = ScriptedTransport::new().respond_json(201, &loan).respond_json(200, &returned);
    let (api, transport) = api_with(transport);

    let created = api.assignments().create(AssignmentDraft { book: 1, reader: 2 }).await.unwrap();
    assert!(!created.is_returned);
    let back = api.assignments().return_book(5).await.unwrap();
    assert_eq!(back.return_date.as_deref(), Some("2026-10-19"));

    let requests = transport.requests();
    assert_eq!(sent_json(&requests[0]), json!({ "book": 1, "reader": 2 }));
    assert_eq!(requests[1].method, Method::POST);
    assert_eq!(requests[1].url, "http://library.test/api/book-assignments/5/return_book/");
    assert_eq!(requests[1].body, PreparedBody::Empty);
}

#[tokio::test]
async fn return_book_twice_surfaces_backend_error() {
    let transport = ScriptedTransport::new().respond_json(400, &json!({ "error": "Book already returned" }));
    let (api, _) = api_with(transport);
    let err = api.assignments().return_book(5).await.unwrap_err();
    assert_eq!(err.to_string(), "HTTP 400: Book already returned");
}

#[tokio::test]
async fn book_copies_update_patches_copy() {
    let copy = json!({ "id": 3, "book": 1, "reading_room": 2, "quantity": 6 });
    let (api, transport) = api_with(ScriptedTransport::new().respond_json(200, &copy));
    let draft = BookCopyDraft { quantity: Some(6), ..BookCopyDraft::default() };

    assert_eq!(api.book_copies().update(3, &draft).await.unwrap().quantity, 6);
    assert_eq!(transport.requests()[0].url, "http://library.test/api/book-copies/3/");
}

#[tokio::test]
async fn librarian_write_off_sends_book_id() {
    let body = json!({ "message": "Book \"Dune\" written off", "book": book_json(8) });
    let (api, transport) = api_with(ScriptedTransport::new().respond_json(200, &body));

    let result = api.librarian().write_off_book(8).await.unwrap();
    assert!(!result.book.is_active);

    let request = &transport.requests()[0];
    assert_eq!(request.url, "http://library.test/api/librarian-operations/write_off_book/");
    assert_eq!(sent_json(request), json!({ "book_id": 8 }));
}

#[tokio::test]
async fn librarian_monthly_report_sends_month_and_year() {
    let body = json!({ "month": 2, "year": 2026, "daily_stats": [], "total_new_readers": 0 });
    let (api, transport) = api_with(ScriptedTransport::new().respond_json(200, &body));

    let report = api.librarian().monthly_report(2, 2026).await.unwrap();
    assert_eq!(report.month, 2);
    assert_eq!(
        transport.requests()[0].url,
        "http://library.test/api/librarian-operations/monthly_report/?month=2&year=2026"
    );
}

#[tokio::test]
async fn librarian_unregister_and_accept() {
    let transport = ScriptedTransport::new()
        .respond_json(200, &json!({ "message": "Unregistered 2 readers", "count": 2 }))
        .respond_json(201, &book_json(10));
    let (api, transport) = api_with(transport);

    assert_eq!(api.librarian().unregister_old_readers().await.unwrap().count, 2);
    let draft = AcceptBookDraft {
        book: BookDraft { title: Some("Dune".to_owned()), ..BookDraft::default() },
        reading_room_id: Some(1),
        quantity: Some(3),
    };
    assert_eq!(api.librarian().accept_book(&draft).await.unwrap().id, 10);

    let requests = transport.requests();
    assert_eq!(requests[0].url, "http://library.test/api/librarian-operations/unregister_old_readers/");
    assert_eq!(sent_json(&requests[1]), json!({ "title": "Dune", "reading_room_id": 1, "quantity": 3 }));
}

#[tokio::test]
async fn next_page_follows_absolute_link() {
    let second = json!({ "count": 2, "next": null, "previous": "http://library.test/api/books/", "results": [book_json(2)] });
    let (api, transport) = api_with(ScriptedTransport::new().respond_json(200, &second));
    let first: Paginated<Book> = Paginated {
        count: 2,
        next: Some("http://library.test/api/books/?page=2".to_owned()),
        previous: None,
        results: Vec::new(),
    };

    let page = api.next_page(&first).await.unwrap().unwrap();
    assert_eq!(page.results[0].id, 2);
    assert!(api.next_page(&page).await.unwrap().is_none());
    assert_eq!(transport.requests().len(), 1);
    assert_eq!(transport.requests()[0].url, "http://library.test/api/books/?page=2");
}
