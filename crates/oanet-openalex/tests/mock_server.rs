//! End-to-end retrieval against a local mock of the listing endpoint

use mockito::Matcher;
use oanet_core::{EntityRecord, ProgressContext, Verbosity, init_logging, read_jsonl};
use oanet_openalex::{ApiClient, ApiConfig, Entity, FetchError, FilterSpec, PagingMode, Query};
use serde_json::json;

fn config(server: &mockito::Server, paging: PagingMode, per_page: u32) -> ApiConfig {
    ApiConfig {
        paging,
        per_page,
        email: None,
        ..ApiConfig::default()
    }
    .with_base_url(server.url())
}

fn body(ids: std::ops::Range<usize>, count: usize, per_page: usize, next_cursor: Option<&str>) -> String {
    let results: Vec<_> = ids
        .map(|i| json!({"id": format!("https://openalex.org/W{i}"), "referenced_works": []}))
        .collect();
    json!({
        "meta": {"count": count, "per_page": per_page, "next_cursor": next_cursor},
        "results": results,
    })
    .to_string()
}

#[test]
fn offset_paging_three_requests() {
    let mut server = mockito::Server::new();
    let pages: Vec<_> = [(1, 0..10), (2, 10..20), (3, 20..25)]
        .into_iter()
        .map(|(page, ids)| {
            server
                .mock("GET", "/works")
                .match_query(Matcher::AllOf(vec![
                    Matcher::UrlEncoded("page".into(), page.to_string()),
                    Matcher::UrlEncoded("per-page".into(), "10".into()),
                    Matcher::UrlEncoded("filter".into(), "publication_year:2020,is_oa:true".into()),
                ]))
                .with_status(200)
                .with_header("content-type", "application/json")
                .with_body(body(ids, 25, 10, None))
                .expect(1)
                .create()
        })
        .collect();

    let client = ApiClient::new(config(&server, PagingMode::Offset, 10)).unwrap();
    let query = Query::new(Entity::Works).filter(
        FilterSpec::new()
            .with("publication_year", "2020")
            .with("is_oa", "true"),
    );
    let records: Vec<EntityRecord> = client
        .entities(&query)
        .collect::<Result<_, _>>()
        .unwrap();

    assert_eq!(records.len(), 25);
    assert_eq!(records[24].id(), Some("https://openalex.org/W24"));
    for mock in pages {
        mock.assert();
    }
}

#[test]
fn cursor_paging_stops_without_next_cursor() {
    let mut server = mockito::Server::new();
    let tokens = [("*", Some("c2")), ("c2", Some("c3")), ("c3", None)];
    let mocks: Vec<_> = tokens
        .iter()
        .enumerate()
        .map(|(i, (cursor, next))| {
            server
                .mock("GET", "/works")
                .match_query(Matcher::UrlEncoded("cursor".into(), cursor.to_string()))
                .with_status(200)
                .with_body(body(i * 5..i * 5 + 5, 100_000, 5, *next))
                .expect(1)
                .create()
        })
        .collect();
    let page_four = server
        .mock("GET", "/works")
        .match_query(Matcher::UrlEncoded("cursor".into(), "c4".into()))
        .expect(0)
        .create();

    let client = ApiClient::new(config(&server, PagingMode::Cursor, 5)).unwrap();
    let count = client
        .entities(&Query::new(Entity::Works))
        .map(|r| r.unwrap())
        .count();

    assert_eq!(count, 15);
    for mock in mocks {
        mock.assert();
    }
    page_four.assert();
}

#[test]
fn rate_limited_page_ends_session() {
    let mut server = mockito::Server::new();
    let first = server
        .mock("GET", "/authors")
        .match_query(Matcher::UrlEncoded("page".into(), "1".into()))
        .with_status(200)
        .with_body(body(0..10, 30, 10, None))
        .create();
    let limited = server
        .mock("GET", "/authors")
        .match_query(Matcher::UrlEncoded("page".into(), "2".into()))
        .with_status(429)
        .with_body(r#"{"error":"Too Many Requests","message":"rate limit exceeded"}"#)
        .expect(1)
        .create();
    let third = server
        .mock("GET", "/authors")
        .match_query(Matcher::UrlEncoded("page".into(), "3".into()))
        .expect(0)
        .create();

    let client = ApiClient::new(config(&server, PagingMode::Offset, 10)).unwrap();
    let query = Query::new(Entity::Authors);
    let mut pager = client.entities(&query);
    let ok = pager.by_ref().take(10).filter(Result::is_ok).count();
    assert_eq!(ok, 10);

    match pager.next() {
        Some(Err(FetchError::Retrieval { status, entity, .. })) => {
            assert_eq!(status, 429);
            assert_eq!(entity, Entity::Authors);
        }
        other => panic!("expected retrieval error, got {other:?}"),
    }
    assert!(pager.next().is_none());

    first.assert();
    limited.assert();
    third.assert();
}

#[test]
fn courtesy_email_is_passed_through() {
    let mut server = mockito::Server::new();
    let mock = server
        .mock("GET", "/works")
        .match_query(Matcher::UrlEncoded("mailto".into(), "me+oa@example.org".into()))
        .match_header("user-agent", Matcher::Regex(r"\(mailto:me\+oa@example\.org\)$".into()))
        .with_status(200)
        .with_body(body(0..1, 1, 200, None))
        .expect(1)
        .create();

    let client =
        ApiClient::new(config(&server, PagingMode::Offset, 200).with_email("me+oa@example.org"))
            .unwrap();
    assert_eq!(client.entities(&Query::new(Entity::Works)).count(), 1);
    mock.assert();
}

#[test]
fn malformed_body_is_decode_error() {
    let mut server = mockito::Server::new();
    let _mock = server
        .mock("GET", "/works")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body("{\"results\": [")
        .create();

    let client = ApiClient::new(config(&server, PagingMode::Cursor, 10)).unwrap();
    let items: Vec<_> = client.entities(&Query::new(Entity::Works)).collect();
    assert_eq!(items.len(), 1);
    assert!(matches!(items[0], Err(FetchError::Decode { .. })));
}

#[test]
fn fetch_to_jsonl_roundtrip() {
    let mut server = mockito::Server::new();
    let _mock = server
        .mock("GET", "/works")
        .match_query(Matcher::UrlEncoded("page".into(), "1".into()))
        .with_status(200)
        .with_body(body(0..3, 3, 200, None))
        .create();

    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("works.jsonl");
    let client = ApiClient::new(config(&server, PagingMode::Offset, 200)).unwrap();
    let progress = ProgressContext::with_tty(false);
    init_logging(Verbosity::Debug, &progress);
    let summary =
        oanet_openalex::fetch_to_jsonl(&client, &Query::new(Entity::Works), &path, &progress)
            .unwrap();
    assert_eq!(summary.records, 3);

    let back: Vec<EntityRecord> = read_jsonl(&path)
        .unwrap()
        .collect::<std::io::Result<_>>()
        .unwrap();
    assert_eq!(back.len(), 3);
    assert_eq!(back[0].str_list("referenced_works"), Some(vec![]));
}
