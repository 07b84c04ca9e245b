//! Cached platform client.
//!
//! Reads go through the query cache; every successful write invalidates
//! the affected keys and refetches them. Cached data is never patched
//! locally.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::{info, warn};

use crate::api::{ApiError, Credentials, PlatformApi};
use crate::cache::{QueryCache, QueryKey};
use crate::models::{
    AdminAnalytics, Category, Community, CommunityUpdate, Course, ErrorLog, ErrorReport,
    MessageResponse, NewCategory, NewCommunity, NewWithdrawal, Notification, SettingsUpdate,
    User, UserAnalytics, Withdrawal, WithdrawalUpdate,
};
use crate::progress::ProgressTracker;

/// Platform API behind a query cache.
#[derive(Clone)]
pub struct PlatformClient {
    api: Arc<dyn PlatformApi>,
    cache: Arc<QueryCache>,
    /// One lock per lesson being marked, keyed by session scope, course and lesson.
    marks: Arc<Mutex<HashMap<String, Arc<Mutex<()>>>>>,
}

impl PlatformClient {
    pub fn new(api: Arc<dyn PlatformApi>, cache: Arc<QueryCache>) -> Self {
        Self {
            api,
            cache,
            marks: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub fn api(&self) -> &dyn PlatformApi {
        self.api.as_ref()
    }

    pub fn cache(&self) -> &QueryCache {
        self.cache.as_ref()
    }

    /// Completion tracking for one signed-in user.
    pub fn progress<'a>(&'a self, credentials: &'a Credentials) -> ProgressTracker<'a> {
        ProgressTracker::new(self, credentials)
    }

    // =========================================================================
    // Reads
    // =========================================================================

    pub async fn communities(&self) -> Result<Arc<Vec<Community>>, ApiError> {
        let api = Arc::clone(&self.api);
        self.cache
            .get(QueryKey::Communities, move || async move {
                api.list_communities().await
            })
            .await
    }

    pub async fn community(&self, id: &str) -> Result<Arc<Community>, ApiError> {
        let api = Arc::clone(&self.api);
        let id = id.to_string();
        self.cache
            .get(QueryKey::Community(id.clone()), move || async move {
                api.get_community(&id).await
            })
            .await
    }

    pub async fn categories(&self) -> Result<Arc<Vec<Category>>, ApiError> {
        let api = Arc::clone(&self.api);
        self.cache
            .get(QueryKey::Categories, move || async move {
                api.list_categories().await
            })
            .await
    }

    pub async fn courses(&self, community_id: &str) -> Result<Arc<Vec<Course>>, ApiError> {
        let api = Arc::clone(&self.api);
        let community_id = community_id.to_string();
        self.cache
            .get(QueryKey::Courses(community_id.clone()), move || async move {
                api.list_courses(&community_id).await
            })
            .await
    }

    pub async fn course(&self, id: &str) -> Result<Arc<Course>, ApiError> {
        let api = Arc::clone(&self.api);
        let id = id.to_string();
        self.cache
            .get(QueryKey::Course(id.clone()), move || async move {
                api.get_course(&id).await
            })
            .await
    }

    pub async fn profile(&self, credentials: &Credentials) -> Result<Arc<User>, ApiError> {
        let api = Arc::clone(&self.api);
        let credentials = credentials.clone();
        self.cache
            .get(QueryKey::Profile(credentials.scope()), move || async move {
                api.current_user(&credentials).await
            })
            .await
    }

    pub async fn user_analytics(
        &self,
        credentials: &Credentials,
    ) -> Result<Arc<UserAnalytics>, ApiError> {
        let api = Arc::clone(&self.api);
        let credentials = credentials.clone();
        self.cache
            .get(
                QueryKey::UserAnalytics(credentials.scope()),
                move || async move { api.user_analytics(&credentials).await },
            )
            .await
    }

    pub async fn notifications(
        &self,
        credentials: &Credentials,
    ) -> Result<Arc<Vec<Notification>>, ApiError> {
        let api = Arc::clone(&self.api);
        let credentials = credentials.clone();
        self.cache
            .get(
                QueryKey::Notifications(credentials.scope()),
                move || async move { api.notifications(&credentials).await },
            )
            .await
    }

    pub async fn withdrawals(
        &self,
        credentials: &Credentials,
    ) -> Result<Arc<Vec<Withdrawal>>, ApiError> {
        let api = Arc::clone(&self.api);
        let credentials = credentials.clone();
        self.cache
            .get(
                QueryKey::Withdrawals(credentials.scope()),
                move || async move { api.list_withdrawals(&credentials).await },
            )
            .await
    }

    pub async fn admin_analytics(
        &self,
        credentials: &Credentials,
    ) -> Result<Arc<AdminAnalytics>, ApiError> {
        let api = Arc::clone(&self.api);
        let credentials = credentials.clone();
        self.cache
            .get(
                QueryKey::AdminAnalytics(credentials.scope()),
                move || async move { api.admin_analytics(&credentials).await },
            )
            .await
    }

    pub async fn error_logs(
        &self,
        credentials: &Credentials,
    ) -> Result<Arc<Vec<ErrorLog>>, ApiError> {
        let api = Arc::clone(&self.api);
        let credentials = credentials.clone();
        self.cache
            .get(
                QueryKey::ErrorLogs(credentials.scope()),
                move || async move { api.error_logs(&credentials).await },
            )
            .await
    }

    // =========================================================================
    // Writes
    // =========================================================================

    pub async fn create_community(
        &self,
        credentials: &Credentials,
        community: &NewCommunity,
    ) -> Result<Community, ApiError> {
        let created = self.api.create_community(credentials, community).await?;
        info!("Community created: {}", created.id);
        self.refresh(
            credentials,
            &[
                QueryKey::Communities,
                QueryKey::UserAnalytics(credentials.scope()),
            ],
        )
        .await;
        Ok(created)
    }

    pub async fn update_community(
        &self,
        credentials: &Credentials,
        id: &str,
        update: &CommunityUpdate,
    ) -> Result<Community, ApiError> {
        let updated = self.api.update_community(credentials, id, update).await?;
        self.refresh(
            credentials,
            &[QueryKey::Communities, QueryKey::Community(id.to_string())],
        )
        .await;
        Ok(updated)
    }

    pub async fn delete_community(
        &self,
        credentials: &Credentials,
        id: &str,
    ) -> Result<MessageResponse, ApiError> {
        let message = self.api.delete_community(credentials, id).await?;
        info!("Community deleted: {}", id);
        self.refresh(
            credentials,
            &[
                QueryKey::Communities,
                QueryKey::Community(id.to_string()),
                QueryKey::UserAnalytics(credentials.scope()),
            ],
        )
        .await;
        Ok(message)
    }

    pub async fn join_community(
        &self,
        credentials: &Credentials,
        id: &str,
    ) -> Result<MessageResponse, ApiError> {
        let message = self.api.join_community(credentials, id).await?;
        self.refresh(
            credentials,
            &[
                QueryKey::Communities,
                QueryKey::Community(id.to_string()),
                QueryKey::Profile(credentials.scope()),
            ],
        )
        .await;
        Ok(message)
    }

    pub async fn create_category(
        &self,
        credentials: &Credentials,
        category: &NewCategory,
    ) -> Result<Category, ApiError> {
        let created = self.api.create_category(credentials, category).await?;
        self.refresh(credentials, &[QueryKey::Categories]).await;
        Ok(created)
    }

    pub async fn update_category(
        &self,
        credentials: &Credentials,
        id: &str,
        category: &NewCategory,
    ) -> Result<Category, ApiError> {
        let updated = self.api.update_category(credentials, id, category).await?;
        self.refresh(credentials, &[QueryKey::Categories]).await;
        Ok(updated)
    }

    pub async fn delete_category(
        &self,
        credentials: &Credentials,
        id: &str,
    ) -> Result<MessageResponse, ApiError> {
        let message = self.api.delete_category(credentials, id).await?;
        self.refresh(credentials, &[QueryKey::Categories]).await;
        Ok(message)
    }

    pub async fn create_withdrawal(
        &self,
        credentials: &Credentials,
        withdrawal: &NewWithdrawal,
    ) -> Result<Withdrawal, ApiError> {
        let created = self.api.create_withdrawal(credentials, withdrawal).await?;
        info!("Withdrawal requested: {} ({})", created.id, created.amount);
        self.refresh(
            credentials,
            &[
                QueryKey::Withdrawals(credentials.scope()),
                QueryKey::Profile(credentials.scope()),
                QueryKey::UserAnalytics(credentials.scope()),
            ],
        )
        .await;
        Ok(created)
    }

    pub async fn update_withdrawal(
        &self,
        credentials: &Credentials,
        id: &str,
        update: &WithdrawalUpdate,
    ) -> Result<Withdrawal, ApiError> {
        let updated = self.api.update_withdrawal(credentials, id, update).await?;
        self.refresh(
            credentials,
            &[
                QueryKey::Withdrawals(credentials.scope()),
                QueryKey::AdminAnalytics(credentials.scope()),
            ],
        )
        .await;
        Ok(updated)
    }

    pub async fn delete_withdrawal(
        &self,
        credentials: &Credentials,
        id: &str,
    ) -> Result<MessageResponse, ApiError> {
        let message = self.api.delete_withdrawal(credentials, id).await?;
        self.refresh(
            credentials,
            &[
                QueryKey::Withdrawals(credentials.scope()),
                QueryKey::Profile(credentials.scope()),
            ],
        )
        .await;
        Ok(message)
    }

    pub async fn update_settings(
        &self,
        credentials: &Credentials,
        settings: &SettingsUpdate,
    ) -> Result<User, ApiError> {
        let user = self.api.update_settings(credentials, settings).await?;
        self.refresh(credentials, &[QueryKey::Profile(credentials.scope())])
            .await;
        Ok(user)
    }

    /// Forward a recovery-screen report. Nothing is cached.
    pub async fn report_error(&self, report: &ErrorReport) -> Result<MessageResponse, ApiError> {
        self.api.report_error(report).await
    }

    /// Forget everything cached for this session.
    pub async fn logout(&self, credentials: &Credentials) {
        self.cache.clear_scope(&credentials.scope()).await;
        info!("Session {} signed out", credentials.scope());
    }

    /// Serialize marks of the same lesson by the same session.
    pub(crate) async fn lock_mark(&self, key: &str) -> OwnedMutexGuard<()> {
        let lock = {
            let mut marks = self.marks.lock().await;
            Arc::clone(marks.entry(key.to_string()).or_default())
        };
        lock.lock_owned().await
    }

    /// Forget the lock for `key` once nobody holds or awaits it.
    pub(crate) async fn release_mark(&self, key: &str, guard: OwnedMutexGuard<()>) {
        drop(guard);
        let mut marks = self.marks.lock().await;
        if marks.get(key).is_some_and(|lock| Arc::strong_count(lock) == 1) {
            marks.remove(key);
        }
    }

    // =========================================================================
    // Refetch-on-mutation
    // =========================================================================

    /// Invalidate `keys`, then refetch each of them.
    ///
    /// Refetch failures are logged and left for the next read; the write
    /// itself already succeeded.
    pub(crate) async fn refresh(&self, credentials: &Credentials, keys: &[QueryKey]) {
        for key in keys {
            self.cache.invalidate(key).await;
        }
        for key in keys {
            if let Err(e) = self.refetch(credentials, key).await {
                warn!("Refetch of {} failed: {}", key, e);
            }
        }
    }

    async fn refetch(&self, credentials: &Credentials, key: &QueryKey) -> Result<(), ApiError> {
        match key {
            QueryKey::Communities => self.communities().await.map(drop),
            QueryKey::Community(id) => self.community(id).await.map(drop),
            QueryKey::Categories => self.categories().await.map(drop),
            QueryKey::Courses(community) => self.courses(community).await.map(drop),
            QueryKey::Course(id) => self.course(id).await.map(drop),
            QueryKey::Profile(_) => self.profile(credentials).await.map(drop),
            QueryKey::UserAnalytics(_) => self.user_analytics(credentials).await.map(drop),
            QueryKey::Notifications(_) => self.notifications(credentials).await.map(drop),
            QueryKey::Withdrawals(_) => self.withdrawals(credentials).await.map(drop),
            QueryKey::AdminAnalytics(_) => self.admin_analytics(credentials).await.map(drop),
            QueryKey::ErrorLogs(_) => self.error_logs(credentials).await.map(drop),
        }
    }
}
