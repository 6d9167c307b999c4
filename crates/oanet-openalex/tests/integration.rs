//! Integration tests against the live OpenAlex API
//!
//! These tests require network access and are marked #[ignore] by default.
//! Run with: cargo test -p oanet-openalex --test integration -- --ignored

use oanet_core::{ProgressContext, Verbosity, init_logging};
use oanet_openalex::{ApiClient, ApiConfig, Entity, FilterSpec, PagingMode, Query};

fn setup() {
    init_logging(Verbosity::Debug, &ProgressContext::new());
}

/// Offset paging over a small, stable result set
#[test]
#[ignore]
fn fetch_small_offset_session() {
    setup();
    let config = ApiConfig {
        per_page: 25,
        paging: PagingMode::Offset,
        ..ApiConfig::from_env()
    };
    let client = ApiClient::new(config).expect("client should build");
    let query = Query::new(Entity::Works)
        .filter(FilterSpec::new().with("publication_year", "2020"))
        .max_entities(60);

    let mut pager = client.entities(&query);
    let records: Vec<_> = pager
        .by_ref()
        .collect::<Result<_, _>>()
        .expect("retrieval should succeed");

    assert_eq!(records.len(), 60);
    assert_eq!(pager.pages_fetched(), 3);
    assert!(records.iter().all(|r| r.id().is_some()));
}

/// Cursor paging with a cap
#[test]
#[ignore]
fn fetch_cursor_session() {
    setup();
    let config = ApiConfig {
        per_page: 50,
        paging: PagingMode::Cursor,
        ..ApiConfig::from_env()
    };
    let client = ApiClient::new(config).expect("client should build");
    let query = Query::new(Entity::Authors)
        .sort("cited_by_count:desc")
        .select(["id", "display_name"])
        .max_entities(120);

    let records: Vec<_> = client
        .entities(&query)
        .collect::<Result<_, _>>()
        .expect("retrieval should succeed");
    assert_eq!(records.len(), 120);
}
