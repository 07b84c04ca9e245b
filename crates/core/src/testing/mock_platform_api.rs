//! Mock platform API for testing.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

use crate::api::{ApiError, Credentials, PlatformApi};
use crate::roles::Capability;
use crate::models::{
    AdminAnalytics, Category, Community, CommunityUpdate, Course, ErrorLog, ErrorReport,
    MessageResponse, NewCategory, NewCommunity, NewWithdrawal, Notification, SettingsUpdate,
    User, UserAnalytics, Withdrawal, WithdrawalStatus, WithdrawalUpdate,
};

/// A recorded API call for test assertions.
#[derive(Debug, Clone)]
pub struct RecordedCall {
    /// Trait method name, e.g. `"list_communities"`.
    pub method: &'static str,
    pub timestamp: Instant,
}

/// In-memory stand-in for the platform API.
///
/// Holds communities, categories, courses, withdrawals and one user per
/// bearer token. Writes change the stored records so refetches observe
/// them. Unknown tokens get `Unauthorized`.
///
/// # Example
///
/// ```rust,ignore
/// use agora_core::testing::{fixtures, MockPlatformApi};
///
/// let api = MockPlatformApi::new();
/// api.set_communities(fixtures::communities(3)).await;
/// api.add_session("token", fixtures::user("u1", Role::Creator)).await;
///
/// // ... drive a PlatformClient ...
///
/// assert_eq!(api.call_count("list_communities").await, 1);
/// ```
#[derive(Debug)]
pub struct MockPlatformApi {
    communities: Arc<RwLock<Vec<Community>>>,
    categories: Arc<RwLock<Vec<Category>>>,
    courses: Arc<RwLock<Vec<Course>>>,
    /// Signed-in users by bearer token.
    sessions: Arc<RwLock<HashMap<String, User>>>,
    withdrawals: Arc<RwLock<Vec<Withdrawal>>>,
    notifications: Arc<RwLock<Vec<Notification>>>,
    error_logs: Arc<RwLock<Vec<ErrorLog>>>,
    /// Reports received through `report_error`.
    reports: Arc<RwLock<Vec<ErrorReport>>>,
    calls: Arc<RwLock<Vec<RecordedCall>>>,
    /// If set, the next call will fail with this error.
    next_error: Arc<RwLock<Option<ApiError>>>,
    /// Delay applied to every call.
    latency: Arc<RwLock<Option<Duration>>>,
    next_id: AtomicUsize,
}

impl Default for MockPlatformApi {
    fn default() -> Self {
        Self::new()
    }
}

impl MockPlatformApi {
    pub fn new() -> Self {
        Self {
            communities: Arc::new(RwLock::new(Vec::new())),
            categories: Arc::new(RwLock::new(Vec::new())),
            courses: Arc::new(RwLock::new(Vec::new())),
            sessions: Arc::new(RwLock::new(HashMap::new())),
            withdrawals: Arc::new(RwLock::new(Vec::new())),
            notifications: Arc::new(RwLock::new(Vec::new())),
            error_logs: Arc::new(RwLock::new(Vec::new())),
            reports: Arc::new(RwLock::new(Vec::new())),
            calls: Arc::new(RwLock::new(Vec::new())),
            next_error: Arc::new(RwLock::new(None)),
            latency: Arc::new(RwLock::new(None)),
            next_id: AtomicUsize::new(1),
        }
    }

    // =========================================================================
    // Configuration
    // =========================================================================

    pub async fn set_communities(&self, communities: Vec<Community>) {
        *self.communities.write().await = communities;
    }

    pub async fn set_categories(&self, categories: Vec<Category>) {
        *self.categories.write().await = categories;
    }

    pub async fn add_course(&self, course: Course) {
        self.courses.write().await.push(course);
    }

    /// Sign `user` in under bearer `token`.
    pub async fn add_session(&self, token: &str, user: User) {
        self.sessions.write().await.insert(token.to_string(), user);
    }

    pub async fn set_withdrawals(&self, withdrawals: Vec<Withdrawal>) {
        *self.withdrawals.write().await = withdrawals;
    }

    pub async fn set_notifications(&self, notifications: Vec<Notification>) {
        *self.notifications.write().await = notifications;
    }

    pub async fn set_error_logs(&self, logs: Vec<ErrorLog>) {
        *self.error_logs.write().await = logs;
    }

    /// Make the next call fail with `error`.
    pub async fn fail_next(&self, error: ApiError) {
        *self.next_error.write().await = Some(error);
    }

    /// Delay every call by `latency`.
    pub async fn set_latency(&self, latency: Duration) {
        *self.latency.write().await = Some(latency);
    }

    // =========================================================================
    // Assertions
    // =========================================================================

    pub async fn recorded_calls(&self) -> Vec<RecordedCall> {
        self.calls.read().await.clone()
    }

    pub async fn call_count(&self, method: &str) -> usize {
        self.calls
            .read()
            .await
            .iter()
            .filter(|c| c.method == method)
            .count()
    }

    pub async fn clear_calls(&self) {
        self.calls.write().await.clear();
    }

    pub async fn reports(&self) -> Vec<ErrorReport> {
        self.reports.read().await.clone()
    }

    pub async fn communities(&self) -> Vec<Community> {
        self.communities.read().await.clone()
    }

    // =========================================================================
    // Internals
    // =========================================================================

    /// Record the call, wait out the latency and hand out a pending error.
    async fn begin(&self, method: &'static str) -> Result<(), ApiError> {
        self.calls.write().await.push(RecordedCall {
            method,
            timestamp: Instant::now(),
        });
        let latency = *self.latency.read().await;
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }
        match self.next_error.write().await.take() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    async fn session(&self, credentials: &Credentials) -> Result<User, ApiError> {
        self.sessions
            .read()
            .await
            .get(credentials.token())
            .cloned()
            .ok_or(ApiError::Unauthorized)
    }

    fn new_id(&self, prefix: &str) -> String {
        format!("{}{}", prefix, self.next_id.fetch_add(1, Ordering::SeqCst))
    }

    fn ok(message: &str) -> MessageResponse {
        MessageResponse {
            message: message.to_string(),
        }
    }
}

#[async_trait]
impl PlatformApi for MockPlatformApi {
    async fn list_communities(&self) -> Result<Vec<Community>, ApiError> {
        self.begin("list_communities").await?;
        Ok(self.communities.read().await.clone())
    }

    async fn get_community(&self, id: &str) -> Result<Community, ApiError> {
        self.begin("get_community").await?;
        self.communities
            .read()
            .await
            .iter()
            .find(|c| c.id == id)
            .cloned()
            .ok_or_else(|| ApiError::NotFound(format!("community {}", id)))
    }

    async fn create_community(
        &self,
        credentials: &Credentials,
        community: &NewCommunity,
    ) -> Result<Community, ApiError> {
        self.begin("create_community").await?;
        let user = self.session(credentials).await?;
        let created = Community {
            id: self.new_id("c-new-"),
            name: community.name.clone(),
            description: community.description.clone(),
            category: community.category.clone(),
            fee: community.fee.into(),
            members: Vec::new(),
            creator: Some(user.id),
            created_at: Some(chrono::Utc::now()),
        };
        self.communities.write().await.push(created.clone());
        Ok(created)
    }

    async fn update_community(
        &self,
        credentials: &Credentials,
        id: &str,
        update: &CommunityUpdate,
    ) -> Result<Community, ApiError> {
        self.begin("update_community").await?;
        self.session(credentials).await?;
        let mut communities = self.communities.write().await;
        let community = communities
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| ApiError::NotFound(format!("community {}", id)))?;
        if let Some(name) = &update.name {
            community.name = name.clone();
        }
        if let Some(description) = &update.description {
            community.description = description.clone();
        }
        if let Some(category) = &update.category {
            community.category = category.clone();
        }
        if let Some(fee) = update.fee {
            community.fee = fee.into();
        }
        Ok(community.clone())
    }

    async fn delete_community(
        &self,
        credentials: &Credentials,
        id: &str,
    ) -> Result<MessageResponse, ApiError> {
        self.begin("delete_community").await?;
        self.session(credentials).await?;
        let mut communities = self.communities.write().await;
        let before = communities.len();
        communities.retain(|c| c.id != id);
        if communities.len() == before {
            return Err(ApiError::NotFound(format!("community {}", id)));
        }
        Ok(Self::ok("Community deleted"))
    }

    async fn join_community(
        &self,
        credentials: &Credentials,
        id: &str,
    ) -> Result<MessageResponse, ApiError> {
        self.begin("join_community").await?;
        let user = self.session(credentials).await?;
        {
            let mut communities = self.communities.write().await;
            let community = communities
                .iter_mut()
                .find(|c| c.id == id)
                .ok_or_else(|| ApiError::NotFound(format!("community {}", id)))?;
            if !community.is_member(&user.id) {
                community.members.push(user.id.clone());
            }
        }
        if let Some(user) = self.sessions.write().await.get_mut(credentials.token()) {
            if !user.has_joined(id) {
                user.communities.push(id.to_string());
            }
        }
        Ok(Self::ok("Joined community"))
    }

    async fn list_categories(&self) -> Result<Vec<Category>, ApiError> {
        self.begin("list_categories").await?;
        Ok(self.categories.read().await.clone())
    }

    async fn create_category(
        &self,
        credentials: &Credentials,
        category: &NewCategory,
    ) -> Result<Category, ApiError> {
        self.begin("create_category").await?;
        self.session(credentials).await?;
        let created = Category {
            id: self.new_id("cat-"),
            name: category.name.clone(),
        };
        self.categories.write().await.push(created.clone());
        Ok(created)
    }

    async fn update_category(
        &self,
        credentials: &Credentials,
        id: &str,
        category: &NewCategory,
    ) -> Result<Category, ApiError> {
        self.begin("update_category").await?;
        self.session(credentials).await?;
        let mut categories = self.categories.write().await;
        let existing = categories
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| ApiError::NotFound(format!("category {}", id)))?;
        existing.name = category.name.clone();
        Ok(existing.clone())
    }

    async fn delete_category(
        &self,
        credentials: &Credentials,
        id: &str,
    ) -> Result<MessageResponse, ApiError> {
        self.begin("delete_category").await?;
        self.session(credentials).await?;
        self.categories.write().await.retain(|c| c.id != id);
        Ok(Self::ok("Category deleted"))
    }

    async fn list_courses(&self, community_id: &str) -> Result<Vec<Course>, ApiError> {
        self.begin("list_courses").await?;
        Ok(self
            .courses
            .read()
            .await
            .iter()
            .filter(|c| c.community.as_deref() == Some(community_id))
            .cloned()
            .collect())
    }

    async fn get_course(&self, id: &str) -> Result<Course, ApiError> {
        self.begin("get_course").await?;
        self.courses
            .read()
            .await
            .iter()
            .find(|c| c.id == id)
            .cloned()
            .ok_or_else(|| ApiError::NotFound(format!("course {}", id)))
    }

    async fn mark_lesson_watched(
        &self,
        credentials: &Credentials,
        course_id: &str,
        lesson_index: usize,
    ) -> Result<MessageResponse, ApiError> {
        self.begin("mark_lesson_watched").await?;
        let mut sessions = self.sessions.write().await;
        let user = sessions
            .get_mut(credentials.token())
            .ok_or(ApiError::Unauthorized)?;
        user.record_watched(course_id, lesson_index);
        Ok(Self::ok("Progress updated"))
    }

    async fn current_user(&self, credentials: &Credentials) -> Result<User, ApiError> {
        self.begin("current_user").await?;
        self.session(credentials).await
    }

    async fn user_analytics(&self, credentials: &Credentials) -> Result<UserAnalytics, ApiError> {
        self.begin("user_analytics").await?;
        let user = self.session(credentials).await?;
        let communities = self.communities.read().await;
        let owned: Vec<&Community> = communities.iter().filter(|c| c.is_owned_by(&user.id)).collect();
        let pending = self
            .withdrawals
            .read()
            .await
            .iter()
            .filter(|w| w.user.as_deref() == Some(user.id.as_str()))
            .filter(|w| w.status == WithdrawalStatus::Pending)
            .count();
        Ok(UserAnalytics {
            total_communities: owned.len() as u64,
            total_members: owned.iter().map(|c| c.member_count() as u64).sum(),
            total_revenue: owned
                .iter()
                .map(|c| c.fee.amount() * c.member_count() as f64)
                .sum(),
            pending_withdrawals: pending as u64,
        })
    }

    async fn update_settings(
        &self,
        credentials: &Credentials,
        settings: &SettingsUpdate,
    ) -> Result<User, ApiError> {
        self.begin("update_settings").await?;
        let mut sessions = self.sessions.write().await;
        let user = sessions
            .get_mut(credentials.token())
            .ok_or(ApiError::Unauthorized)?;
        if let Some(name) = &settings.name {
            user.name = name.clone();
        }
        if let Some(email) = &settings.email {
            user.email = email.clone();
        }
        Ok(user.clone())
    }

    async fn notifications(
        &self,
        credentials: &Credentials,
    ) -> Result<Vec<Notification>, ApiError> {
        self.begin("notifications").await?;
        self.session(credentials).await?;
        Ok(self.notifications.read().await.clone())
    }

    async fn list_withdrawals(
        &self,
        credentials: &Credentials,
    ) -> Result<Vec<Withdrawal>, ApiError> {
        self.begin("list_withdrawals").await?;
        let user = self.session(credentials).await?;
        let withdrawals = self.withdrawals.read().await;
        Ok(withdrawals
            .iter()
            .filter(|w| user.role.can(Capability::ReviewWithdrawals) || w.user.as_deref() == Some(user.id.as_str()))
            .cloned()
            .collect())
    }

    async fn create_withdrawal(
        &self,
        credentials: &Credentials,
        withdrawal: &NewWithdrawal,
    ) -> Result<Withdrawal, ApiError> {
        self.begin("create_withdrawal").await?;
        let user = self.session(credentials).await?;
        let created = Withdrawal {
            id: self.new_id("w-"),
            amount: withdrawal.amount,
            status: WithdrawalStatus::Pending,
            email: withdrawal.email.clone(),
            user: Some(user.id),
            created_at: Some(chrono::Utc::now()),
        };
        self.withdrawals.write().await.push(created.clone());
        if let Some(user) = self.sessions.write().await.get_mut(credentials.token()) {
            user.balance -= withdrawal.amount;
        }
        Ok(created)
    }

    async fn update_withdrawal(
        &self,
        credentials: &Credentials,
        id: &str,
        update: &WithdrawalUpdate,
    ) -> Result<Withdrawal, ApiError> {
        self.begin("update_withdrawal").await?;
        self.session(credentials).await?;
        let mut withdrawals = self.withdrawals.write().await;
        let withdrawal = withdrawals
            .iter_mut()
            .find(|w| w.id == id)
            .ok_or_else(|| ApiError::NotFound(format!("withdrawal {}", id)))?;
        withdrawal.status = update.status;
        Ok(withdrawal.clone())
    }

    async fn delete_withdrawal(
        &self,
        credentials: &Credentials,
        id: &str,
    ) -> Result<MessageResponse, ApiError> {
        self.begin("delete_withdrawal").await?;
        self.session(credentials).await?;
        self.withdrawals.write().await.retain(|w| w.id != id);
        Ok(Self::ok("Withdrawal deleted"))
    }

    async fn admin_analytics(
        &self,
        credentials: &Credentials,
    ) -> Result<AdminAnalytics, ApiError> {
        self.begin("admin_analytics").await?;
        self.session(credentials).await?;
        let pending = self
            .withdrawals
            .read()
            .await
            .iter()
            .filter(|w| w.status == WithdrawalStatus::Pending)
            .count();
        Ok(AdminAnalytics {
            total_users: self.sessions.read().await.len() as u64,
            total_communities: self.communities.read().await.len() as u64,
            total_courses: self.courses.read().await.len() as u64,
            total_revenue: 0.0,
            pending_withdrawals: pending as u64,
        })
    }

    async fn error_logs(&self, credentials: &Credentials) -> Result<Vec<ErrorLog>, ApiError> {
        self.begin("error_logs").await?;
        self.session(credentials).await?;
        Ok(self.error_logs.read().await.clone())
    }

    async fn report_error(&self, report: &ErrorReport) -> Result<MessageResponse, ApiError> {
        self.begin("report_error").await?;
        self.reports.write().await.push(report.clone());
        Ok(Self::ok("Report received"))
    }
}
