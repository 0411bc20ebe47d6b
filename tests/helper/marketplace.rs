//! Marketplace server test utilities

use mockito::{Matcher, Mock, ServerGuard};
use serde_json::{Value, json};

/// JSON for one marketplace record
pub fn package_json(id: &str) -> Value {
    json!({
        "packageId": id,
        "title": format!("{} title", id),
        "downloads": 10,
        "tags": ["test"],
        "supportedMajorVersions": [14]
    })
}

/// Mock one marketplace page holding `ids`
pub async fn mock_marketplace_page(
    server: &mut ServerGuard,
    page_number: u32,
    page_size: u32,
    ids: &[String],
    total: usize,
) -> Mock {
    let results: Vec<Value> = ids.iter().map(|id| package_json(id)).collect();

    server
        .mock("GET", "/packages")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("pageNumber".into(), page_number.to_string()),
            Matcher::UrlEncoded("pageSize".into(), page_size.to_string()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(json!({ "results": results, "totalResults": total }).to_string())
        .expect(1)
        .create_async()
        .await
}
