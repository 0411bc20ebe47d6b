//! Catalog E2E tests against a mock marketplace server

mod helper;

use std::collections::HashSet;

use mockito::{Matcher, Server};

use helper::{MockRegistry, create_test_catalog, lifecycle_record, mock_marketplace_page};
use package_script_writer::marketplace::QueryKind;
use package_script_writer::version::lts::LtsResolver;

fn ids(range: std::ops::Range<usize>) -> Vec<String> {
    range.map(|i| format!("Package.{}", i)).collect()
}

#[tokio::test]
async fn listing_walks_all_pages_with_shrunk_tail_page() {
    let mut server = Server::new_async().await;

    let first = mock_marketplace_page(&mut server, 1, 50, &ids(0..50), 130).await;
    let second = mock_marketplace_page(&mut server, 2, 50, &ids(50..100), 130).await;
    let tail = mock_marketplace_page(&mut server, 3, 30, &ids(100..130), 130).await;

    let catalog = create_test_catalog(&server.url(), MockRegistry::new());
    let records = catalog.all_packages().await;

    first.assert_async().await;
    second.assert_async().await;
    tail.assert_async().await;

    assert_eq!(records.len(), 130);
    let unique: HashSet<_> = records.iter().map(|r| r.package_id.as_str()).collect();
    assert_eq!(unique.len(), 130);
}

#[tokio::test]
async fn listing_is_served_from_cache_on_second_call() {
    let mut server = Server::new_async().await;

    // expect(1) inside the helper fails the assertion if the page is requested twice
    let only_page = mock_marketplace_page(&mut server, 1, 50, &ids(0..3), 3).await;

    let catalog = create_test_catalog(&server.url(), MockRegistry::new());
    let first = catalog.listing(QueryKind::Templates).await;
    let second = catalog.listing(QueryKind::Templates).await;

    only_page.assert_async().await;
    assert_eq!(first, second);
}

#[tokio::test]
async fn listing_returns_partial_result_when_upstream_fails_mid_walk() {
    let mut server = Server::new_async().await;

    let first = mock_marketplace_page(&mut server, 1, 50, &ids(0..50), 120).await;
    let failing = server
        .mock("GET", "/packages")
        .match_query(Matcher::UrlEncoded("pageNumber".into(), "2".into()))
        .with_status(500)
        .create_async()
        .await;

    let catalog = create_test_catalog(&server.url(), MockRegistry::new());
    let records = catalog.all_packages().await;

    first.assert_async().await;
    failing.assert_async().await;
    assert_eq!(records.len(), 50);
}

#[tokio::test]
async fn lts_resolves_through_catalog_versions() {
    let registry = MockRegistry::new().with_versions(
        "Umbraco.Templates",
        vec!["14.0.0", "13.5.0", "13.4.0-rc1", "13.4.0"],
    );
    let catalog = create_test_catalog("http://127.0.0.1:9", registry);

    let lifecycle = vec![
        lifecycle_record(13, "LTS", (2023, 1, 1), (2100, 1, 1)),
        lifecycle_record(14, "STS", (2024, 1, 1), (2100, 1, 1)),
    ];

    let resolver = LtsResolver::new(catalog, "Umbraco.Templates");

    assert_eq!(
        resolver.latest_lts(&lifecycle).await,
        Some("13.5.0".to_string())
    );
}

#[tokio::test]
async fn lts_is_none_when_tracked_package_is_unknown() {
    let catalog = create_test_catalog("http://127.0.0.1:9", MockRegistry::new());
    let lifecycle = vec![lifecycle_record(13, "LTS", (2023, 1, 1), (2100, 1, 1))];

    let resolver = LtsResolver::new(catalog, "Umbraco.Templates");

    assert_eq!(resolver.latest_lts(&lifecycle).await, None);
}

#[tokio::test]
async fn enrich_versions_fills_picked_packages() {
    let mut server = Server::new_async().await;
    let _page = mock_marketplace_page(
        &mut server,
        1,
        50,
        &["Umbraco.Forms".to_string(), "uSync".to_string()],
        2,
    )
    .await;

    let registry = MockRegistry::new()
        .with_versions("Umbraco.Forms", vec!["14.2.0", "14.1.0"])
        .with_versions("uSync", vec!["14.0.1"]);
    let catalog = create_test_catalog(&server.url(), registry);

    let mut picked = catalog.all_packages().await.as_ref().clone();
    catalog.enrich_versions(&mut picked).await;

    assert_eq!(picked[0].selected_version.as_deref(), Some("14.2.0"));
    assert_eq!(picked[0].package_versions, vec!["14.2.0", "14.1.0"]);
    assert_eq!(picked[1].selected_version.as_deref(), Some("14.0.1"));
}
