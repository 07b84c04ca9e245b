//! reqwest-backed platform API client.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, warn};

use super::{ApiError, Credentials, PlatformApi};
use crate::config::ApiConfig;
use crate::metrics::{status_label, API_REQUESTS, API_REQUEST_DURATION};
use crate::models::{
    AdminAnalytics, Category, Community, CommunityUpdate, Course, ErrorLog, ErrorReport,
    MessageResponse, NewCategory, NewCommunity, NewWithdrawal, Notification, SettingsUpdate,
    User, UserAnalytics, Withdrawal, WithdrawalUpdate,
};

/// Response body: either the payload itself or `{ "data": payload }`.
#[derive(Deserialize)]
#[serde(untagged)]
enum Payload<T> {
    Wrapped { data: T },
    Bare(T),
}

impl<T> Payload<T> {
    fn into_inner(self) -> T {
        match self {
            Payload::Wrapped { data } => data,
            Payload::Bare(value) => value,
        }
    }
}

/// Platform API over HTTPS with bearer-token authentication.
pub struct HttpPlatformApi {
    client: Client,
    base_url: String,
}

impl HttpPlatformApi {
    /// Create a client for the API described by `config`.
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let base_url = config.base_url.trim().trim_end_matches('/').to_string();
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(ApiError::NotConfigured(format!(
                "invalid API base URL: '{}'",
                config.base_url
            )));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(u64::from(config.timeout_secs)))
            .build()?;

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn get(&self, path: &str) -> RequestBuilder {
        self.client.get(self.url(path))
    }

    fn authed(&self, request: RequestBuilder, credentials: &Credentials) -> RequestBuilder {
        request.bearer_auth(credentials.token())
    }

    /// Send a request and decode a 2xx body, recording metrics.
    async fn execute<T: DeserializeOwned>(
        &self,
        endpoint: &'static str,
        resource: &str,
        request: RequestBuilder,
    ) -> Result<T, ApiError> {
        let start = Instant::now();
        let result = request.send().await;
        API_REQUEST_DURATION
            .with_label_values(&[endpoint])
            .observe(start.elapsed().as_secs_f64());

        let response = match result {
            Ok(response) => response,
            Err(e) => {
                API_REQUESTS
                    .with_label_values(&[endpoint, "network_error"])
                    .inc();
                warn!("API {} failed: {}", endpoint, e);
                return Err(e.into());
            }
        };

        let status = response.status();
        API_REQUESTS
            .with_label_values(&[endpoint, status_label(status.as_u16())])
            .inc();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            debug!("API {} returned {}: {}", endpoint, status, body);
            return Err(ApiError::from_response(status.as_u16(), &body, resource));
        }

        let payload: Payload<T> = response.json().await.map_err(|e| {
            ApiError::Parse(format!("Failed to parse {} response: {}", endpoint, e))
        })?;

        Ok(payload.into_inner())
    }
}

fn segment(id: &str) -> String {
    urlencoding::encode(id).into_owned()
}

#[async_trait]
impl PlatformApi for HttpPlatformApi {
    async fn list_communities(&self) -> Result<Vec<Community>, ApiError> {
        debug!("API list communities");
        self.execute("list_communities", "Communities", self.get("/community"))
            .await
    }

    async fn get_community(&self, id: &str) -> Result<Community, ApiError> {
        debug!("API get community: id={}", id);
        let path = format!("/community/{}", segment(id));
        self.execute("get_community", &format!("Community {}", id), self.get(&path))
            .await
    }

    async fn create_community(
        &self,
        credentials: &Credentials,
        community: &NewCommunity,
    ) -> Result<Community, ApiError> {
        debug!("API create community: name='{}'", community.name);
        let request = self.client.post(self.url("/community")).json(community);
        self.execute(
            "create_community",
            "Community",
            self.authed(request, credentials),
        )
        .await
    }

    async fn update_community(
        &self,
        credentials: &Credentials,
        id: &str,
        update: &CommunityUpdate,
    ) -> Result<Community, ApiError> {
        debug!("API update community: id={}", id);
        let request = self
            .client
            .put(self.url(&format!("/community/{}", segment(id))))
            .json(update);
        self.execute(
            "update_community",
            &format!("Community {}", id),
            self.authed(request, credentials),
        )
        .await
    }

    async fn delete_community(
        &self,
        credentials: &Credentials,
        id: &str,
    ) -> Result<MessageResponse, ApiError> {
        debug!("API delete community: id={}", id);
        let request = self
            .client
            .delete(self.url(&format!("/community/{}", segment(id))));
        self.execute(
            "delete_community",
            &format!("Community {}", id),
            self.authed(request, credentials),
        )
        .await
    }

    async fn join_community(
        &self,
        credentials: &Credentials,
        id: &str,
    ) -> Result<MessageResponse, ApiError> {
        debug!("API join community: id={}", id);
        let request = self
            .client
            .post(self.url(&format!("/community/{}/join", segment(id))));
        self.execute(
            "join_community",
            &format!("Community {}", id),
            self.authed(request, credentials),
        )
        .await
    }

    async fn list_categories(&self) -> Result<Vec<Category>, ApiError> {
        debug!("API list categories");
        self.execute("list_categories", "Categories", self.get("/category"))
            .await
    }

    async fn create_category(
        &self,
        credentials: &Credentials,
        category: &NewCategory,
    ) -> Result<Category, ApiError> {
        debug!("API create category: name='{}'", category.name);
        let request = self.client.post(self.url("/category")).json(category);
        self.execute(
            "create_category",
            "Category",
            self.authed(request, credentials),
        )
        .await
    }

    async fn update_category(
        &self,
        credentials: &Credentials,
        id: &str,
        category: &NewCategory,
    ) -> Result<Category, ApiError> {
        debug!("API update category: id={}", id);
        let request = self
            .client
            .put(self.url(&format!("/category/{}", segment(id))))
            .json(category);
        self.execute(
            "update_category",
            &format!("Category {}", id),
            self.authed(request, credentials),
        )
        .await
    }

    async fn delete_category(
        &self,
        credentials: &Credentials,
        id: &str,
    ) -> Result<MessageResponse, ApiError> {
        debug!("API delete category: id={}", id);
        let request = self
            .client
            .delete(self.url(&format!("/category/{}", segment(id))));
        self.execute(
            "delete_category",
            &format!("Category {}", id),
            self.authed(request, credentials),
        )
        .await
    }

    async fn list_courses(&self, community_id: &str) -> Result<Vec<Course>, ApiError> {
        debug!("API list courses: community={}", community_id);
        let request = self
            .get("/course")
            .query(&[("community", community_id)]);
        self.execute("list_courses", "Courses", request).await
    }

    async fn get_course(&self, id: &str) -> Result<Course, ApiError> {
        debug!("API get course: id={}", id);
        let path = format!("/course/{}", segment(id));
        self.execute("get_course", &format!("Course {}", id), self.get(&path))
            .await
    }

    async fn mark_lesson_watched(
        &self,
        credentials: &Credentials,
        course_id: &str,
        lesson_index: usize,
    ) -> Result<MessageResponse, ApiError> {
        debug!(
            "API mark watched: course={}, lesson={}",
            course_id, lesson_index
        );
        let request = self
            .client
            .post(self.url(&format!("/course/{}/watched", segment(course_id))))
            .json(&serde_json::json!({ "index": lesson_index.to_string() }));
        self.execute(
            "mark_lesson_watched",
            &format!("Course {}", course_id),
            self.authed(request, credentials),
        )
        .await
    }

    async fn current_user(&self, credentials: &Credentials) -> Result<User, ApiError> {
        debug!("API current user");
        let request = self.authed(self.get("/user/profile"), credentials);
        self.execute("current_user", "Profile", request).await
    }

    async fn user_analytics(&self, credentials: &Credentials) -> Result<UserAnalytics, ApiError> {
        debug!("API user analytics");
        let request = self.authed(self.get("/user/analytics"), credentials);
        self.execute("user_analytics", "Analytics", request).await
    }

    async fn update_settings(
        &self,
        credentials: &Credentials,
        settings: &SettingsUpdate,
    ) -> Result<User, ApiError> {
        debug!("API update settings");
        let request = self.client.put(self.url("/user/settings")).json(settings);
        self.execute(
            "update_settings",
            "Profile",
            self.authed(request, credentials),
        )
        .await
    }

    async fn notifications(
        &self,
        credentials: &Credentials,
    ) -> Result<Vec<Notification>, ApiError> {
        debug!("API notifications");
        let request = self.authed(self.get("/notification"), credentials);
        self.execute("notifications", "Notifications", request)
            .await
    }

    async fn list_withdrawals(
        &self,
        credentials: &Credentials,
    ) -> Result<Vec<Withdrawal>, ApiError> {
        debug!("API list withdrawals");
        let request = self.authed(self.get("/withdrawal"), credentials);
        self.execute("list_withdrawals", "Withdrawals", request)
            .await
    }

    async fn create_withdrawal(
        &self,
        credentials: &Credentials,
        withdrawal: &NewWithdrawal,
    ) -> Result<Withdrawal, ApiError> {
        debug!("API create withdrawal: amount={}", withdrawal.amount);
        let request = self.client.post(self.url("/withdrawal")).json(withdrawal);
        self.execute(
            "create_withdrawal",
            "Withdrawal",
            self.authed(request, credentials),
        )
        .await
    }

    async fn update_withdrawal(
        &self,
        credentials: &Credentials,
        id: &str,
        update: &WithdrawalUpdate,
    ) -> Result<Withdrawal, ApiError> {
        debug!("API update withdrawal: id={}, status={:?}", id, update.status);
        let request = self
            .client
            .put(self.url(&format!("/withdrawal/{}", segment(id))))
            .json(update);
        self.execute(
            "update_withdrawal",
            &format!("Withdrawal {}", id),
            self.authed(request, credentials),
        )
        .await
    }

    async fn delete_withdrawal(
        &self,
        credentials: &Credentials,
        id: &str,
    ) -> Result<MessageResponse, ApiError> {
        debug!("API delete withdrawal: id={}", id);
        let request = self
            .client
            .delete(self.url(&format!("/withdrawal/{}", segment(id))));
        self.execute(
            "delete_withdrawal",
            &format!("Withdrawal {}", id),
            self.authed(request, credentials),
        )
        .await
    }

    async fn admin_analytics(
        &self,
        credentials: &Credentials,
    ) -> Result<AdminAnalytics, ApiError> {
        debug!("API admin analytics");
        let request = self.authed(self.get("/admin/analytics"), credentials);
        self.execute("admin_analytics", "Analytics", request)
            .await
    }

    async fn error_logs(&self, credentials: &Credentials) -> Result<Vec<ErrorLog>, ApiError> {
        debug!("API error logs");
        let request = self.authed(self.get("/admin/errors"), credentials);
        self.execute("error_logs", "Error logs", request).await
    }

    async fn report_error(&self, report: &ErrorReport) -> Result<MessageResponse, ApiError> {
        debug!("API report error: '{}'", report.message);
        let request = self.client.post(self.url("/errors")).json(report);
        self.execute("report_error", "Error report", request)
            .await
    }
}
