//! Route guards: sign-up redirect, role checks, logout.

mod common;

use axum::http::StatusCode;
use common::{TestFixture, ADMIN_TOKEN, CREATOR_TOKEN, USER_TOKEN};
use serde_json::json;

#[tokio::test]
async fn test_public_routes_need_no_session() {
    let fixture = TestFixture::new().await;

    assert_status!(fixture.get("/api/v1/health").await, StatusCode::OK);
    assert_status!(fixture.get("/api/v1/communities").await, StatusCode::OK);
    assert_status!(fixture.get("/api/v1/categories").await, StatusCode::OK);
}

#[tokio::test]
async fn test_protected_route_redirects_to_sign_up() {
    let fixture = TestFixture::new().await;

    for path in [
        "/api/v1/me",
        "/api/v1/withdrawals",
        "/api/v1/admin/analytics",
        "/api/v1/courses/k1/classroom",
    ] {
        let response = fixture.get(path).await;
        assert_status!(response, StatusCode::SEE_OTHER);
        assert_eq!(response.location(), Some("/signup"), "path {}", path);
    }
}

#[tokio::test]
async fn test_expired_session_redirects_to_sign_up() {
    let fixture = TestFixture::new().await;

    let response = fixture.get_as("expired", "/api/v1/me").await;

    assert_status!(response, StatusCode::SEE_OTHER);
    assert_eq!(response.location(), Some("/signup"));
}

#[tokio::test]
async fn test_me_returns_profile() {
    let fixture = TestFixture::new().await;

    let response = fixture.get_as(USER_TOKEN, "/api/v1/me").await;

    assert_status!(response, StatusCode::OK);
    assert_eq!(response.body["id"], "u1");
    assert_eq!(response.body["role"], "user");
}

#[tokio::test]
async fn test_user_cannot_reach_creator_routes() {
    let fixture = TestFixture::new().await;

    let response = fixture
        .post_as(
            USER_TOKEN,
            "/api/v1/communities",
            json!({"name": "X", "description": "Y", "category": "Tech", "fee": "0"}),
        )
        .await;
    assert_status!(response, StatusCode::FORBIDDEN);

    let response = fixture.get_as(USER_TOKEN, "/api/v1/withdrawals").await;
    assert_status!(response, StatusCode::FORBIDDEN);
    assert_eq!(fixture.api.call_count("create_community").await, 0);
}

#[tokio::test]
async fn test_creator_cannot_reach_admin_routes() {
    let fixture = TestFixture::new().await;

    for path in ["/api/v1/admin/analytics", "/api/v1/admin/error-logs"] {
        let response = fixture.get_as(CREATOR_TOKEN, path).await;
        assert_status!(response, StatusCode::FORBIDDEN);
    }

    let response = fixture
        .put_as(
            CREATOR_TOKEN,
            "/api/v1/withdrawals/w1",
            json!({"status": "approved"}),
        )
        .await;
    assert_status!(response, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_admin_reaches_everything() {
    let fixture = TestFixture::new().await;

    for path in [
        "/api/v1/admin/analytics",
        "/api/v1/admin/error-logs",
        "/api/v1/withdrawals",
        "/api/v1/me/analytics",
    ] {
        let response = fixture.get_as(ADMIN_TOKEN, path).await;
        assert_status!(response, StatusCode::OK);
    }
}

#[tokio::test]
async fn test_creator_dashboard() {
    let fixture = TestFixture::new().await;

    let response = fixture.get_as(CREATOR_TOKEN, "/api/v1/me/analytics").await;
    assert_status!(response, StatusCode::OK);
    assert_eq!(response.body["totalCommunities"], 0);

    let response = fixture.get_as(USER_TOKEN, "/api/v1/me/analytics").await;
    assert_status!(response, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_logout_drops_cached_profile() {
    let fixture = TestFixture::new().await;

    fixture.get_as(USER_TOKEN, "/api/v1/me").await;
    fixture.get_as(USER_TOKEN, "/api/v1/me").await;
    assert_eq!(fixture.api.call_count("current_user").await, 1);

    let response = fixture
        .request("POST", "/api/v1/logout", Some(USER_TOKEN), None)
        .await;
    assert_status!(response, StatusCode::OK);

    fixture.get_as(USER_TOKEN, "/api/v1/me").await;
    assert_eq!(fixture.api.call_count("current_user").await, 2);
}

#[tokio::test]
async fn test_settings_are_validated() {
    let fixture = TestFixture::new().await;

    let response = fixture
        .put_as(USER_TOKEN, "/api/v1/me/settings", json!({"email": "nope"}))
        .await;
    assert_status!(response, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(response.body["fields"][0]["field"], "email");
    assert_eq!(fixture.api.call_count("update_settings").await, 0);

    let response = fixture
        .put_as(
            USER_TOKEN,
            "/api/v1/me/settings",
            json!({"name": "Ada", "email": "ada@example.com"}),
        )
        .await;
    assert_status!(response, StatusCode::OK);
    assert_eq!(response.body["name"], "Ada");
}

#[tokio::test]
async fn test_unknown_path_is_not_found() {
    let fixture = TestFixture::new().await;

    let response = fixture.get("/api/v1/nowhere").await;

    assert_status!(response, StatusCode::NOT_FOUND);
    assert_eq!(response.body["state"], "not_found");
}

#[tokio::test]
async fn test_metrics_endpoint() {
    let fixture = TestFixture::new().await;
    fixture.get("/api/v1/communities").await;

    let text = fixture.get_text("/metrics").await;

    assert!(text.contains("agora_http_requests_total"));
    assert!(text.contains("agora_cache_lookups_total"));
}
