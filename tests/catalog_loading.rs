//! Behavior-driven tests for catalog retrieval
//!
//! These tests verify HOW the session handles the one-shot catalog fetch:
//! successful loads in both layouts, transport failures and late duplicates.

use std::io::Write;
use std::sync::Arc;

use bourse_core::{
    ApplyOutcome, CatalogError, CatalogLoader, CatalogLocation, CatalogShape, CatalogSource,
    HttpError, HttpResponse, IngestOutcome, MarketOverview, StaticHttpClient,
};

const FLAT_CATALOG: &str = r#"[
    {"code":"NYSE","mic":"xnys","name":"New York Stock Exchange","country":"us","city":"New York"},
    {"code":"NASDAQ","mic":"xnas","name":"Nasdaq","country":"us","city":"New York"},
    {"code":"LSE","mic":"xlon","name":"London Stock Exchange","country":"gb","city":"London"}
]"#;

const GROUPED_CATALOG: &str = r#"{
    "ro": [{"code":"BVB","mic":"xbse","name":"Bucharest Stock Exchange","country":"ro","city":"Bucharest"}],
    "at": [{"code":"WBAG","mic":"xwbo","name":"Wiener Boerse","country":"at","city":"Vienna"}]
}"#;

fn url_source(shape: CatalogShape) -> CatalogSource {
    CatalogSource::parse("https://example.test/assets/data/exchanges.json", shape)
}

fn loader_with(client: &StaticHttpClient) -> CatalogLoader {
    CatalogLoader::new(Arc::new(client.clone())).with_timeout_ms(500)
}

// =============================================================================
// Successful loads
// =============================================================================

#[tokio::test]
async fn flat_catalog_over_http_populates_the_session() {
    // Given: An endpoint serving the flat exchange list
    let client = StaticHttpClient::json(FLAT_CATALOG);
    let loader = loader_with(&client);
    let mut overview = MarketOverview::new();

    // When: The session loads it
    let outcome = overview
        .load_from(&loader, &url_source(CatalogShape::Auto))
        .await
        .expect("catalog loads");

    // Then: Every country is available and the initial view shows everything
    assert_eq!(outcome, IngestOutcome::Accepted { countries: 2, records: 3 });
    assert_eq!(overview.filters().available_countries(), ["GB", "US"]);
    assert_eq!(overview.current().record_count(), 3);
}

#[tokio::test]
async fn grouped_catalog_keeps_published_country_order() {
    let client = StaticHttpClient::json(GROUPED_CATALOG);
    let loader = loader_with(&client);
    let mut overview = MarketOverview::new();

    overview
        .load_from(&loader, &url_source(CatalogShape::Grouped))
        .await
        .expect("catalog loads");

    assert_eq!(overview.all().countries().collect::<Vec<_>>(), vec!["RO", "AT"]);

    overview.filters_mut().set_countries(["at"]);
    assert_eq!(overview.filters().legal_exchanges(), ["XWBO"]);
    assert_eq!(overview.current().countries().collect::<Vec<_>>(), vec!["AT"]);
}

#[tokio::test]
async fn catalog_file_on_disk_is_supported() {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    file.write_all(FLAT_CATALOG.as_bytes()).expect("write catalog");
    let source = CatalogSource::new(
        CatalogLocation::File(file.path().to_path_buf()),
        CatalogShape::Flat,
    );

    let payload = CatalogLoader::new(Arc::new(StaticHttpClient::json("")))
        .fetch(&source)
        .await
        .expect("file catalog loads");

    assert_eq!(payload.record_count(), 3);
}

#[tokio::test]
async fn catalog_is_fetched_only_once_per_session() {
    let client = StaticHttpClient::json(FLAT_CATALOG);
    let loader = loader_with(&client);
    let mut overview = MarketOverview::new();

    overview
        .load_from(&loader, &url_source(CatalogShape::Auto))
        .await
        .expect("first load");
    let second = overview
        .load_from(&loader, &url_source(CatalogShape::Auto))
        .await
        .expect("second load is a no-op");

    assert_eq!(second, IngestOutcome::Ignored);
    assert_eq!(client.calls(), 1);
}

// =============================================================================
// Failures
// =============================================================================

#[tokio::test]
async fn transport_failure_leaves_the_session_empty_but_usable() {
    // Given: The catalog endpoint is unreachable
    let client = StaticHttpClient::replying(Err(HttpError::new("connection refused")));
    let loader = loader_with(&client);
    let mut overview = MarketOverview::new();

    // When: The load fails
    let err = overview
        .load_from(&loader, &url_source(CatalogShape::Auto))
        .await
        .expect_err("must fail");

    // Then: The error is reported and filtering stays a harmless no-op
    assert!(matches!(err, CatalogError::Transport { .. }));
    assert!(err.retryable());

    overview.filters_mut().set_countries(["us"]);
    assert_eq!(overview.last_outcome(), Some(ApplyOutcome::NotLoaded));
    assert!(overview.current().is_empty());
    assert!(overview.filters().legal_exchanges().is_empty());
}

#[tokio::test]
async fn error_status_is_reported_with_the_url() {
    let client = StaticHttpClient::replying(Ok(HttpResponse::with_status(404, "not found")));
    let loader = loader_with(&client);

    let err = loader
        .fetch(&url_source(CatalogShape::Auto))
        .await
        .expect_err("must fail");

    match err {
        CatalogError::Status { url, status } => {
            assert_eq!(status, 404);
            assert!(url.ends_with("exchanges.json"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn malformed_json_is_rejected() {
    let client = StaticHttpClient::json("{\"us\": 42}");
    let loader = loader_with(&client);

    let err = loader
        .fetch(&url_source(CatalogShape::Auto))
        .await
        .expect_err("must fail");

    assert!(matches!(err, CatalogError::Malformed(_)));
    assert!(!err.retryable());
}

#[tokio::test]
async fn missing_file_is_a_file_error() {
    let source = CatalogSource::parse("/definitely/not/here/exchanges.json", CatalogShape::Auto);

    let err = CatalogLoader::new(Arc::new(StaticHttpClient::json("[]")))
        .fetch(&source)
        .await
        .expect_err("must fail");

    assert!(matches!(err, CatalogError::File { .. }));
}
