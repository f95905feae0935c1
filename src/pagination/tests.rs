//! Tests for pagination module

use super::*;
use serde_json::json;
use test_case::test_case;

fn page_of(count: usize) -> PageResponse {
    let records: Vec<_> = (0..count)
        .map(|i| json!({"id": i, "started_at": 1650000000 + i}))
        .collect();
    PageResponse::parse(json!({ "calls": records }), Some("calls")).unwrap()
}

// ============================================================================
// PageResponse Tests
// ============================================================================

#[test]
fn test_parse_with_data_field() {
    let body = json!({"calls": [{"id": 1}, {"id": 2}], "meta": {"count": 2}});
    let page = PageResponse::parse(body, Some("calls")).unwrap();

    assert_eq!(page.len(), 2);
    assert!(!page.is_empty());
    assert_eq!(page.records[0]["id"], 1);
}

#[test]
fn test_parse_bare_array() {
    let body = json!([{"id": 1}, {"id": 2}, {"id": 3}]);
    let page = PageResponse::parse(body, None).unwrap();

    assert_eq!(page.len(), 3);
}

#[test]
fn test_parse_missing_field_fails() {
    let body = json!({"values": []});
    let err = PageResponse::parse(body, Some("calls")).unwrap_err();
    assert!(err.to_string().contains("calls"));
}

#[test]
fn test_parse_non_array_field_fails() {
    let body = json!({"calls": {"id": 1}});
    assert!(PageResponse::parse(body, Some("calls")).is_err());
}

#[test]
fn test_last_record_value() {
    let body = json!({"calls": [
        {"id": 1, "started_at": 1650000000},
        {"id": 2, "started_at": 1650000100}
    ]});
    let page = PageResponse::parse(body, Some("calls")).unwrap();

    assert_eq!(
        page.last_record_value("started_at"),
        Some("1650000100".to_string())
    );
    assert_eq!(page.last_record_value("missing"), None);
}

#[test]
fn test_extract_path() {
    let body = json!({"pagination": {"page": 2, "lastPage": 5}});

    assert_eq!(extract_path(&body, "pagination.page"), Some(&json!(2)));
    assert_eq!(extract_path(&body, "$.pagination.lastPage"), Some(&json!(5)));
    assert_eq!(extract_path(&body, "pagination.missing"), None);
}

// ============================================================================
// SinglePagePaginator Tests
// ============================================================================

#[test]
fn test_single_page_always_stops() {
    let paginator = SinglePagePaginator;
    let cursor = paginator.initial(None);

    assert!(paginator.request(&cursor).query.is_empty());
    assert!(paginator.next(&cursor, &page_of(100)).is_none());
}

// ============================================================================
// ShortPagePaginator Tests
// ============================================================================

fn short_page() -> ShortPagePaginator {
    ShortPagePaginator::new("page", 1, "per_page", 20).with_window("from")
}

#[test]
fn test_short_page_initial_cursor() {
    let paginator = short_page();
    let cursor = paginator.initial(Some("1650000000".to_string()));

    assert_eq!(cursor.page, 1);
    assert_eq!(cursor.window_start, Some("1650000000".to_string()));
}

#[test]
fn test_short_page_request_params() {
    let paginator = short_page();
    let cursor = paginator.initial(Some("1650000000".to_string()));
    let request = paginator.request(&cursor);

    assert_eq!(request.query.get("page"), Some(&"1".to_string()));
    assert_eq!(request.query.get("per_page"), Some(&"20".to_string()));
    assert_eq!(request.query.get("from"), Some(&"1650000000".to_string()));
}

#[test]
fn test_short_page_request_omits_absent_window() {
    let paginator = short_page();
    let cursor = paginator.initial(None);
    let request = paginator.request(&cursor);

    assert!(!request.query.contains_key("from"));
}

#[test_case(20, true ; "full page continues")]
#[test_case(19, false ; "short page terminates")]
#[test_case(0, false ; "empty page terminates")]
fn test_short_page_termination(count: usize, continues: bool) {
    let paginator = short_page();
    let cursor = paginator.initial(None);

    let next = paginator.next(&cursor, &page_of(count));
    assert_eq!(next.is_some(), continues);
}

#[test]
fn test_short_page_advances_keeping_window() {
    let paginator = short_page();
    let cursor = paginator.initial(Some("1650000000".to_string()));

    let next = paginator.next(&cursor, &page_of(20)).unwrap();
    assert_eq!(next.page, 2);
    assert_eq!(next.window_start, Some("1650000000".to_string()));

    let after = paginator.next(&next, &page_of(20)).unwrap();
    assert_eq!(after.page, 3);
    assert_eq!(after.window_start, Some("1650000000".to_string()));
}

#[test]
fn test_short_page_depth_ceiling_rewindows() {
    // Ceiling of 4 records at 2 per page: the scan past page 2 must restart
    // at the initial page with the window rolled to the last creation stamp.
    let paginator = ShortPagePaginator::new("page", 1, "per_page", 2)
        .with_window("from")
        .with_depth_ceiling(4, "started_at");

    let page1 = paginator.initial(Some("0".to_string()));
    let response = PageResponse::parse(
        json!({"calls": [
            {"id": 1, "started_at": 1650000000},
            {"id": 2, "started_at": 1650000100}
        ]}),
        Some("calls"),
    )
    .unwrap();

    let page2 = paginator.next(&page1, &response).unwrap();
    assert_eq!(page2.page, 2);

    let response = PageResponse::parse(
        json!({"calls": [
            {"id": 3, "started_at": 1650000200},
            {"id": 4, "started_at": 1650000300}
        ]}),
        Some("calls"),
    )
    .unwrap();

    let rewound = paginator.next(&page2, &response).unwrap();
    assert_eq!(rewound.page, 1);
    assert_eq!(rewound.window_start, Some("1650000300".to_string()));

    // The re-windowed request carries the new filter
    let request = paginator.request(&rewound);
    assert_eq!(request.query.get("from"), Some(&"1650000300".to_string()));
    assert_eq!(request.query.get("page"), Some(&"1".to_string()));
}

#[test]
fn test_short_page_below_ceiling_does_not_rewindow() {
    let paginator = ShortPagePaginator::new("page", 1, "per_page", 2)
        .with_window("from")
        .with_depth_ceiling(100, "started_at");

    let cursor = paginator.initial(Some("0".to_string()));
    let next = paginator.next(&cursor, &page_of(2)).unwrap();

    assert_eq!(next.page, 2);
    assert_eq!(next.window_start, Some("0".to_string()));
}

#[test]
fn test_short_page_zero_based_counter() {
    // Some providers number pages from zero; the ceiling math must not
    // depend on the numbering origin.
    let paginator = ShortPagePaginator::new("page", 0, "per_page", 2)
        .with_window("from")
        .with_depth_ceiling(4, "started_at");

    let page0 = paginator.initial(None);
    let page1 = paginator.next(&page0, &page_of(2)).unwrap();
    assert_eq!(page1.page, 1);

    let response = PageResponse::parse(
        json!({"calls": [
            {"id": 3, "started_at": 1650000200},
            {"id": 4, "started_at": 1650000300}
        ]}),
        Some("calls"),
    )
    .unwrap();
    let rewound = paginator.next(&page1, &response).unwrap();
    assert_eq!(rewound.page, 0);
    assert_eq!(rewound.window_start, Some("1650000300".to_string()));
}

// ============================================================================
// EnvelopePaginator Tests
// ============================================================================

fn envelope() -> EnvelopePaginator {
    EnvelopePaginator::new(
        "page",
        1,
        "pagination.page",
        "pagination.lastPage",
        "pagination.nextPage",
    )
    .with_page_size("perPage", 50)
}

#[test]
fn test_envelope_request_params() {
    let paginator = envelope();
    let cursor = paginator.initial(None);
    let request = paginator.request(&cursor);

    assert_eq!(request.query.get("page"), Some(&"1".to_string()));
    assert_eq!(request.query.get("perPage"), Some(&"50".to_string()));
}

#[test]
fn test_envelope_continues_to_next_page() {
    let paginator = envelope();
    let cursor = paginator.initial(None);

    let response = PageResponse::parse(
        json!({
            "values": [{"id": 1}],
            "pagination": {"page": 1, "lastPage": 3, "nextPage": 2}
        }),
        Some("values"),
    )
    .unwrap();

    let next = paginator.next(&cursor, &response).unwrap();
    assert_eq!(next.page, 2);
}

#[test]
fn test_envelope_stops_on_last_page() {
    let paginator = envelope();
    let cursor = PageCursor::new(3, None);

    let response = PageResponse::parse(
        json!({
            "values": [{"id": 9}],
            "pagination": {"page": 3, "lastPage": 3, "nextPage": null}
        }),
        Some("values"),
    )
    .unwrap();

    assert!(paginator.next(&cursor, &response).is_none());
}

#[test]
fn test_envelope_stops_without_envelope() {
    let paginator = envelope();
    let cursor = paginator.initial(None);

    let response = PageResponse::parse(json!({"values": [{"id": 1}]}), Some("values")).unwrap();
    assert!(paginator.next(&cursor, &response).is_none());
}

#[test]
fn test_envelope_falls_back_to_increment() {
    let paginator = envelope();
    let cursor = paginator.initial(None);

    // nextPage missing but lastPage says there is more
    let response = PageResponse::parse(
        json!({
            "values": [{"id": 1}],
            "pagination": {"page": 1, "lastPage": 2}
        }),
        Some("values"),
    )
    .unwrap();

    let next = paginator.next(&cursor, &response).unwrap();
    assert_eq!(next.page, 2);
}

#[test]
fn test_envelope_preserves_window() {
    let paginator = envelope();
    let cursor = paginator.initial(Some("2024-01-01".to_string()));

    let response = PageResponse::parse(
        json!({
            "values": [{"id": 1}],
            "pagination": {"page": 1, "lastPage": 2, "nextPage": 2}
        }),
        Some("values"),
    )
    .unwrap();

    let next = paginator.next(&cursor, &response).unwrap();
    assert_eq!(next.window_start, Some("2024-01-01".to_string()));
}
