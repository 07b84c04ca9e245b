//! Community listing driven by URL query parameters.

mod common;

use axum::http::StatusCode;
use common::{fixtures, TestFixture};

async fn fixture_with(n: usize) -> TestFixture {
    let fixture = TestFixture::new().await;
    fixture.api.set_communities(fixtures::communities(n)).await;
    fixture
}

fn ids(body: &serde_json::Value) -> Vec<String> {
    body["communities"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["id"].as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn test_first_page_defaults() {
    let fixture = fixture_with(45).await;

    let response = fixture.get("/api/v1/communities").await;

    assert_status!(response, StatusCode::OK);
    assert_eq!(ids(&response.body).len(), 21);
    assert_eq!(response.body["page"], 1);
    assert_eq!(response.body["page_count"], 3);
    assert_eq!(response.body["total"], 45);
    assert_eq!(response.body["query"], "page=1");
    assert_eq!(response.body["next"], "/api/v1/communities?page=2");
    assert!(response.body["prev"].is_null());
}

#[tokio::test]
async fn test_last_partial_page() {
    let fixture = fixture_with(45).await;

    let response = fixture.get("/api/v1/communities?page=3").await;

    assert_status!(response, StatusCode::OK);
    assert_eq!(ids(&response.body), vec!["c42", "c43", "c44"]);
    assert!(response.body["next"].is_null());
    assert_eq!(response.body["prev"], "/api/v1/communities?page=2");
}

#[tokio::test]
async fn test_malformed_page_falls_back_to_first() {
    let fixture = fixture_with(45).await;

    let response = fixture.get("/api/v1/communities?page=abc").await;

    assert_status!(response, StatusCode::OK);
    assert_eq!(response.body["page"], 1);
    assert_eq!(ids(&response.body)[0], "c0");
}

#[tokio::test]
async fn test_page_past_end_is_empty() {
    let fixture = fixture_with(45).await;

    let response = fixture.get("/api/v1/communities?page=9").await;

    assert_status!(response, StatusCode::OK);
    assert!(ids(&response.body).is_empty());
    assert_eq!(response.body["page_count"], 3);
}

#[tokio::test]
async fn test_category_filter_in_query() {
    let fixture = fixture_with(45).await;

    let response = fixture.get("/api/v1/communities?category=Tech").await;

    assert_status!(response, StatusCode::OK);
    // Every fourth fixture community is Tech.
    assert_eq!(response.body["total"], 12);
    assert_eq!(response.body["page_count"], 1);
    assert_eq!(response.body["category"], "Tech");
    assert_eq!(response.body["query"], "page=1&category=Tech");
    assert!(ids(&response.body).iter().all(|id| {
        let n: usize = id[1..].parse().unwrap();
        n % 4 == 0
    }));
}

#[tokio::test]
async fn test_unknown_category_is_empty() {
    let fixture = fixture_with(10).await;

    let response = fixture.get("/api/v1/communities?category=Retired").await;

    assert_status!(response, StatusCode::OK);
    assert!(ids(&response.body).is_empty());
    assert_eq!(response.body["page_count"], 0);
}

#[tokio::test]
async fn test_category_match_is_exact() {
    let fixture = fixture_with(10).await;

    let response = fixture.get("/api/v1/communities?category=%20Tech").await;

    assert_status!(response, StatusCode::OK);
    assert!(ids(&response.body).is_empty());
    assert_eq!(response.body["category"], " Tech");
}

#[tokio::test]
async fn test_search_ranks_exact_match_first() {
    let fixture = fixture_with(45).await;

    let response = fixture.get("/api/v1/communities?q=Community%207").await;

    assert_status!(response, StatusCode::OK);
    assert_eq!(ids(&response.body)[0], "c7");
}

#[tokio::test]
async fn test_search_links_keep_query() {
    let fixture = fixture_with(45).await;

    let response = fixture.get("/api/v1/communities?q=community").await;

    assert_status!(response, StatusCode::OK);
    assert_eq!(response.body["total"], 45);
    assert_eq!(
        response.body["next"],
        "/api/v1/communities?page=2&q=community"
    );
}

#[tokio::test]
async fn test_single_character_query_is_ignored() {
    let fixture = fixture_with(30).await;

    let response = fixture.get("/api/v1/communities?q=z").await;

    assert_status!(response, StatusCode::OK);
    assert_eq!(response.body["total"], 30);
}

#[tokio::test]
async fn test_empty_platform() {
    let fixture = fixture_with(0).await;

    let response = fixture.get("/api/v1/communities?q=chess").await;

    assert_status!(response, StatusCode::OK);
    assert!(ids(&response.body).is_empty());
}

#[tokio::test]
async fn test_listing_is_cached() {
    let fixture = fixture_with(5).await;

    fixture.get("/api/v1/communities").await;
    fixture.get("/api/v1/communities?page=2").await;
    fixture.get("/api/v1/communities?category=Art").await;

    assert_eq!(fixture.api.call_count("list_communities").await, 1);
}

#[tokio::test]
async fn test_community_detail() {
    let fixture = fixture_with(3).await;

    let found = fixture.get("/api/v1/communities/c1").await;
    assert_status!(found, StatusCode::OK);
    assert_eq!(found.body["name"], "Community 1");

    let missing = fixture.get("/api/v1/communities/nope").await;
    assert_status!(missing, StatusCode::NOT_FOUND);
    assert_eq!(missing.body["state"], "not_found");
}

#[tokio::test]
async fn test_remote_outage_is_bad_gateway() {
    let fixture = fixture_with(3).await;
    fixture
        .api
        .fail_next(agora_core::ApiError::Network("timeout".to_string()))
        .await;

    let response = fixture.get("/api/v1/communities").await;

    assert_status!(response, StatusCode::BAD_GATEWAY);
    assert!(response.body["error"].is_string());

    // Failures are not cached; the next request retries.
    let retry = fixture.get("/api/v1/communities").await;
    assert_status!(retry, StatusCode::OK);
}
