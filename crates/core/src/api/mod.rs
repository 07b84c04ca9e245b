//! Remote platform API.
//!
//! `PlatformApi` is the seam between the client and the REST service;
//! `HttpPlatformApi` talks JSON over HTTPS, `testing::MockPlatformApi`
//! stands in for it in tests.

mod http;

pub use http::HttpPlatformApi;

use async_trait::async_trait;
use sha2::{Digest, Sha256};
use std::fmt;
use thiserror::Error;

use crate::models::{
    AdminAnalytics, Category, Community, CommunityUpdate, Course, ErrorLog, ErrorReport,
    MessageResponse, NewCategory, NewCommunity, NewWithdrawal, Notification, SettingsUpdate,
    User, UserAnalytics, Withdrawal, WithdrawalUpdate,
};

/// Errors that can occur when talking to the platform API.
///
/// Cloneable so one failed fetch can be handed to every caller that was
/// waiting on it.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ApiError {
    /// Request never produced a response.
    #[error("Network error: {0}")]
    Network(String),

    /// Missing or expired session (401).
    #[error("Authentication required")]
    Unauthorized,

    /// Authenticated but not allowed (403).
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Resource not found (404).
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Any other non-2xx answer; `message` is the server's human-readable text.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Failed to parse response.
    #[error("Failed to parse response: {0}")]
    Parse(String),

    /// Client not configured (bad base URL, etc.).
    #[error("Client not configured: {0}")]
    NotConfigured(String),
}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        ApiError::Network(e.to_string())
    }
}

impl ApiError {
    /// Build the error for a non-2xx answer from its status and body.
    pub fn from_response(status: u16, body: &str, resource: &str) -> Self {
        let message = error_message(body);
        match status {
            401 => ApiError::Unauthorized,
            403 => ApiError::Forbidden(message),
            404 => ApiError::NotFound(resource.to_string()),
            _ => ApiError::Api { status, message },
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::NotFound(_))
    }

    /// Text suitable for a transient notification.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Network(_) => "Could not reach the server. Please try again.".to_string(),
            ApiError::Unauthorized => "Your session has expired. Please sign in again.".to_string(),
            ApiError::Forbidden(msg) if !msg.is_empty() => msg.clone(),
            ApiError::Forbidden(_) => "You are not allowed to do that.".to_string(),
            ApiError::NotFound(what) => format!("{} was not found.", what),
            ApiError::Api { message, .. } if !message.is_empty() => message.clone(),
            ApiError::Api { status, .. } => format!("Request failed ({}).", status),
            ApiError::Parse(_) | ApiError::NotConfigured(_) => {
                "Something went wrong. Please try again.".to_string()
            }
        }
    }
}

/// Extract the human-readable message of an error body.
///
/// Accepts a JSON string, a JSON object with `message` or `error`, or
/// falls back to the raw text.
pub fn error_message(body: &str) -> String {
    match serde_json::from_str::<serde_json::Value>(body) {
        Ok(serde_json::Value::String(s)) => s,
        Ok(serde_json::Value::Object(map)) => ["message", "error", "msg"]
            .iter()
            .find_map(|k| map.get(*k).and_then(|v| v.as_str()).map(str::to_string))
            .unwrap_or_else(|| body.trim().to_string()),
        _ => body.trim().to_string(),
    }
}

/// Bearer token of a signed-in user.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    token: String,
}

impl Credentials {
    pub fn bearer(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    /// Stable, non-reversible id of this session, used to scope cache keys.
    pub fn scope(&self) -> String {
        let digest = Sha256::digest(self.token.as_bytes());
        format!("{:x}", digest)[..16].to_string()
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("scope", &self.scope())
            .finish()
    }
}

/// Operations of the platform REST API.
#[async_trait]
pub trait PlatformApi: Send + Sync {
    // Communities

    async fn list_communities(&self) -> Result<Vec<Community>, ApiError>;

    async fn get_community(&self, id: &str) -> Result<Community, ApiError>;

    async fn create_community(
        &self,
        credentials: &Credentials,
        community: &NewCommunity,
    ) -> Result<Community, ApiError>;

    async fn update_community(
        &self,
        credentials: &Credentials,
        id: &str,
        update: &CommunityUpdate,
    ) -> Result<Community, ApiError>;

    async fn delete_community(
        &self,
        credentials: &Credentials,
        id: &str,
    ) -> Result<MessageResponse, ApiError>;

    async fn join_community(
        &self,
        credentials: &Credentials,
        id: &str,
    ) -> Result<MessageResponse, ApiError>;

    // Categories

    async fn list_categories(&self) -> Result<Vec<Category>, ApiError>;

    async fn create_category(
        &self,
        credentials: &Credentials,
        category: &NewCategory,
    ) -> Result<Category, ApiError>;

    async fn update_category(
        &self,
        credentials: &Credentials,
        id: &str,
        category: &NewCategory,
    ) -> Result<Category, ApiError>;

    async fn delete_category(
        &self,
        credentials: &Credentials,
        id: &str,
    ) -> Result<MessageResponse, ApiError>;

    // Courses

    async fn list_courses(&self, community_id: &str) -> Result<Vec<Course>, ApiError>;

    async fn get_course(&self, id: &str) -> Result<Course, ApiError>;

    /// Record lesson `lesson_index` of `course_id` as watched by the user.
    async fn mark_lesson_watched(
        &self,
        credentials: &Credentials,
        course_id: &str,
        lesson_index: usize,
    ) -> Result<MessageResponse, ApiError>;

    // User

    async fn current_user(&self, credentials: &Credentials) -> Result<User, ApiError>;

    async fn user_analytics(&self, credentials: &Credentials) -> Result<UserAnalytics, ApiError>;

    async fn update_settings(
        &self,
        credentials: &Credentials,
        settings: &SettingsUpdate,
    ) -> Result<User, ApiError>;

    async fn notifications(&self, credentials: &Credentials)
        -> Result<Vec<Notification>, ApiError>;

    // Withdrawals

    async fn list_withdrawals(&self, credentials: &Credentials)
        -> Result<Vec<Withdrawal>, ApiError>;

    async fn create_withdrawal(
        &self,
        credentials: &Credentials,
        withdrawal: &NewWithdrawal,
    ) -> Result<Withdrawal, ApiError>;

    async fn update_withdrawal(
        &self,
        credentials: &Credentials,
        id: &str,
        update: &WithdrawalUpdate,
    ) -> Result<Withdrawal, ApiError>;

    async fn delete_withdrawal(
        &self,
        credentials: &Credentials,
        id: &str,
    ) -> Result<MessageResponse, ApiError>;

    // Admin

    async fn admin_analytics(&self, credentials: &Credentials)
        -> Result<AdminAnalytics, ApiError>;

    async fn error_logs(&self, credentials: &Credentials) -> Result<Vec<ErrorLog>, ApiError>;

    /// Submit a report from the recovery screen. Does not require a session.
    async fn report_error(&self, report: &ErrorReport) -> Result<MessageResponse, ApiError>;
}
