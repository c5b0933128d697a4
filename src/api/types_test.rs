use super::*;
use serde_json::json;

#[test]
fn reader_parses_backend_payload() {
    let reader: Reader = serde_json::from_value(json!({
        "id": 7,
        "ticket_number": "T-007",
        "full_name": "Anna Petrova",
        "passport_number": "4010 123456",
        "birth_date": "2006-03-14",
        "age": 20,
        "address": "Nevsky 1",
        "phone_number": "+7 900 000 00 00",
        "education": "secondary",
        "has_degree": false,
        "reading_room": null,
        "reading_room_name": null,
        "registration_date": "2026-01-10",
        "unregistration_date": null,
        "is_active": true,
        "active_books_count": 2,
        "created_at": "2026-01-10T10:00:00Z"
    }))
    .unwrap();
    assert_eq!(reader.education, Education::Secondary);
    assert_eq!(reader.reading_room, None);
    assert_eq!(reader.active_books_count, Some(2));
}

#[test]
fn education_unknown_value_is_kept() {
    let education: Education = serde_json::from_value(json!("postdoc")).unwrap();
    assert_eq!(education, Education::Other("postdoc".to_owned()));
    assert_eq!(serde_json::to_value(&education).unwrap(), json!("postdoc"));
    assert_eq!(serde_json::to_value(Education::Degree).unwrap(), json!("degree"));
}

#[test]
fn assignment_without_computed_fields_parses() {
    let assignment: BookAssignment = serde_json::from_value(json!({
        "id": 1,
        "book": 2,
        "reader": 3,
        "assignment_date": "2026-09-01",
        "is_returned": true,
        "return_date": "2026-09-20"
    }))
    .unwrap();
    assert_eq!(assignment.days_since_assignment, None);
    assert_eq!(assignment.book_title, None);
}

#[test]
fn paginated_envelope_passes_through() {
    let page: Paginated<ReadingRoom> = serde_json::from_value(json!({
        "count": 11,
        "next": "http://library.test/api/reading-rooms/?page=2",
        "previous": null,
        "results": [{ "id": 1, "number": "1", "name": "Main", "capacity": 40 }]
    }))
    .unwrap();
    assert_eq!(page.count, 11);
    assert_eq!(page.results[0].readers_count, None);
    assert!(page.previous.is_none());
}

#[test]
fn drafts_omit_unset_fields() {
    let draft = ReadingRoomDraft { capacity: Some(25), ..ReadingRoomDraft::default() };
    assert_eq!(serde_json::to_value(&draft).unwrap(), json!({ "capacity": 25 }));
}

#[test]
fn reader_draft_distinguishes_null_from_missing() {
    let cleared: ReaderDraft = serde_json::from_value(json!({ "reading_room": null })).unwrap();
    assert_eq!(cleared.reading_room, Some(None));
    assert_eq!(serde_json::to_value(&cleared).unwrap(), json!({ "reading_room": null }));

    let untouched: ReaderDraft = serde_json::from_value(json!({ "full_name": "A" })).unwrap();
    assert_eq!(untouched.reading_room, None);
    assert_eq!(serde_json::to_value(&untouched).unwrap(), json!({ "full_name": "A" }));
}

#[test]
fn accept_book_draft_flattens_book_fields() {
    let draft = AcceptBookDraft {
        book: BookDraft { title: Some("Dune".to_owned()), code: Some("F-1".to_owned()), ..BookDraft::default() },
        reading_room_id: Some(3),
        quantity: Some(2),
    };
    assert_eq!(
        serde_json::to_value(&draft).unwrap(),
        json!({ "title": "Dune", "code": "F-1", "reading_room_id": 3, "quantity": 2 })
    );
}

#[test]
fn update_me_serializes_only_set_fields() {
    let payload = UpdateMe { email: Some("a@b.test".to_owned()), ..UpdateMe::default() };
    assert_eq!(serde_json::to_value(&payload).unwrap(), json!({ "email": "a@b.test" }));
}

#[test]
fn monthly_report_parses() {
    let report: MonthlyReport = serde_json::from_value(json!({
        "month": 9,
        "year": 2026,
        "daily_stats": [{
            "date": "2026-09-01",
            "books_count": 120,
            "readers_count": 40,
            "new_readers_count": 1,
            "rooms": [{ "room_id": 1, "room_name": "Main", "books_count": 80, "readers_count": 30, "new_readers_count": 1 }]
        }],
        "total_new_readers": 5
    }))
    .unwrap();
    assert_eq!(report.daily_stats[0].rooms[0].room_name, "Main");
    assert_eq!(report.total_new_readers, 5);
}
