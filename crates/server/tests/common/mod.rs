//! Common test utilities for in-process API testing with a mock platform API.

#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, HeaderMap, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use agora_core::testing::MockPlatformApi;
use agora_core::{Config, PlatformClient, QueryCache, Role};
use agora_server::state::AppState;

/// Re-export fixtures for test convenience
pub use agora_core::testing::fixtures;

pub const USER_TOKEN: &str = "user-token";
pub const CREATOR_TOKEN: &str = "creator-token";
pub const ADMIN_TOKEN: &str = "admin-token";

/// In-process server backed by a [`MockPlatformApi`].
///
/// Three sessions exist from the start: `u1` (user), `cr1` (creator, balance
/// 200) and `a1` (admin), signed in with [`USER_TOKEN`], [`CREATOR_TOKEN`]
/// and [`ADMIN_TOKEN`].
///
/// # Example
///
/// ```rust,ignore
/// let fixture = TestFixture::new().await;
/// fixture.api.set_communities(fixtures::communities(45)).await;
///
/// let response = fixture.get("/api/v1/communities?page=3").await;
/// assert_eq!(response.body["communities"].as_array().unwrap().len(), 3);
/// ```
pub struct TestFixture {
    /// The Axum router for testing
    pub router: Router,
    /// Mock platform API - configure records, inject failures
    pub api: Arc<MockPlatformApi>,
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

impl TestResponse {
    pub fn location(&self) -> Option<&str> {
        self.headers
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok())
    }
}

impl TestFixture {
    pub async fn new() -> Self {
        Self::with_config_toml("").await
    }

    /// Extra TOML appended after the required `[api]` section.
    pub async fn with_config_toml(extra: &str) -> Self {
        let toml = format!("[api]\nbase_url = \"http://api.test\"\n{}", extra);
        let config: Config =
            agora_core::load_config_from_str(&toml).expect("Failed to parse test config");

        let api = Arc::new(MockPlatformApi::new());
        api.add_session(USER_TOKEN, fixtures::user("u1", Role::User))
            .await;
        let mut creator = fixtures::user("cr1", Role::Creator);
        creator.balance = 200.0;
        api.add_session(CREATOR_TOKEN, creator).await;
        api.add_session(ADMIN_TOKEN, fixtures::user("a1", Role::Admin))
            .await;

        let client = PlatformClient::new(api.clone(), Arc::new(QueryCache::new()));
        let state = Arc::new(AppState::new(config, client));
        let router = agora_server::api::create_router(state);

        Self { router, api }
    }

    /// Send a GET request without a session.
    pub async fn get(&self, path: &str) -> TestResponse {
        self.request("GET", path, None, None).await
    }

    /// Send a POST request with JSON body, without a session.
    pub async fn post(&self, path: &str, body: Value) -> TestResponse {
        self.request("POST", path, None, Some(body)).await
    }

    pub async fn get_as(&self, token: &str, path: &str) -> TestResponse {
        self.request("GET", path, Some(token), None).await
    }

    pub async fn post_as(&self, token: &str, path: &str, body: Value) -> TestResponse {
        self.request("POST", path, Some(token), Some(body)).await
    }

    pub async fn put_as(&self, token: &str, path: &str, body: Value) -> TestResponse {
        self.request("PUT", path, Some(token), Some(body)).await
    }

    pub async fn delete_as(&self, token: &str, path: &str) -> TestResponse {
        self.request("DELETE", path, Some(token), None).await
    }

    /// GET a non-JSON endpoint and return the body text.
    pub async fn get_text(&self, path: &str) -> String {
        let request = Request::builder()
            .uri(path)
            .body(Body::empty())
            .unwrap();
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes();
        String::from_utf8_lossy(&bytes).into_owned()
    }

    /// Send a request to the test server.
    pub async fn request(
        &self,
        method: &str,
        path: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> TestResponse {
        let mut request_builder = Request::builder().method(method).uri(path);

        if let Some(token) = token {
            request_builder =
                request_builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }

        let body = if let Some(json_body) = body {
            request_builder = request_builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(serde_json::to_vec(&json_body).unwrap())
        } else {
            Body::empty()
        };

        let request = request_builder.body(body).unwrap();

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let headers = response.headers().clone();
        let body_bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes();

        let body: Value = if body_bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body_bytes).unwrap_or(Value::Null)
        };

        TestResponse {
            status,
            headers,
            body,
        }
    }
}

/// Helper to assert a response has expected status.
#[macro_export]
macro_rules! assert_status {
    ($response:expr, $status:expr) => {
        assert_eq!(
            $response.status, $status,
            "Expected status {:?}, got {:?}. Body: {}",
            $status,
            $response.status,
            serde_json::to_string_pretty(&$response.body).unwrap_or_default()
        );
    };
}
