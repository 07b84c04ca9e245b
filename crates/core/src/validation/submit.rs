use thiserror::Error;
use tracing::debug;

use super::{CategoryForm, CommunityForm, ErrorReportForm, ValidationErrors, WithdrawalForm};
use crate::api::{ApiError, Credentials};
use crate::client::PlatformClient;
use crate::models::{Category, Community, MessageResponse, Withdrawal};

#[derive(Debug, Error, Clone, PartialEq)]
pub enum SubmitError {
    /// Rejected locally; no request was sent.
    #[error("{0}")]
    Invalid(#[from] ValidationErrors),

    #[error(transparent)]
    Api(#[from] ApiError),
}

impl PlatformClient {
    /// Validate against the current category set, then create.
    pub async fn submit_community(
        &self,
        credentials: &Credentials,
        form: &CommunityForm,
    ) -> Result<Community, SubmitError> {
        let categories = self.categories().await?;
        let community = form.validate(&categories).inspect_err(|e| {
            debug!("Community form rejected: {}", e);
        })?;
        Ok(self.create_community(credentials, &community).await?)
    }

    pub async fn submit_category(
        &self,
        credentials: &Credentials,
        form: &CategoryForm,
    ) -> Result<Category, SubmitError> {
        let category = form.validate()?;
        Ok(self.create_category(credentials, &category).await?)
    }

    /// Checked against `minimum` and the signed-in user's balance.
    pub async fn submit_withdrawal(
        &self,
        credentials: &Credentials,
        form: &WithdrawalForm,
        minimum: f64,
    ) -> Result<Withdrawal, SubmitError> {
        let user = self.profile(credentials).await?;
        let withdrawal = form.validate(minimum, user.balance)?;
        Ok(self.create_withdrawal(credentials, &withdrawal).await?)
    }

    pub async fn submit_error_report(
        &self,
        form: &ErrorReportForm,
    ) -> Result<MessageResponse, SubmitError> {
        let report = form.validate()?;
        Ok(self.report_error(&report).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::QueryCache;
    use crate::testing::{fixtures, MockPlatformApi};
    use crate::Role;
    use std::sync::Arc;

    async fn setup() -> (Arc<MockPlatformApi>, PlatformClient, Credentials) {
        let api = Arc::new(MockPlatformApi::new());
        api.set_categories(fixtures::categories(&["Tech", "Art"])).await;
        let mut creator = fixtures::user("u1", Role::Creator);
        creator.balance = 120.0;
        api.add_session("creator", creator).await;
        let client = PlatformClient::new(api.clone(), Arc::new(QueryCache::new()));
        (api, client, Credentials::bearer("creator"))
    }

    #[tokio::test]
    async fn test_invalid_community_sends_nothing() {
        let (api, client, credentials) = setup().await;
        let form = CommunityForm {
            name: "Club".to_string(),
            description: "About".to_string(),
            category: "Cooking".to_string(),
            fee: "0".to_string(),
        };

        let result = client.submit_community(&credentials, &form).await;

        assert!(matches!(result, Err(SubmitError::Invalid(e)) if e.has("category")));
        assert_eq!(api.call_count("create_community").await, 0);
    }

    #[tokio::test]
    async fn test_valid_community_is_created() {
        let (api, client, credentials) = setup().await;
        let form = CommunityForm {
            name: "Club".to_string(),
            description: "About".to_string(),
            category: "Art".to_string(),
            fee: "15".to_string(),
        };

        let created = client.submit_community(&credentials, &form).await.unwrap();

        assert_eq!(created.name, "Club");
        assert_eq!(api.call_count("create_community").await, 1);
    }

    #[tokio::test]
    async fn test_withdrawal_over_balance_sends_nothing() {
        let (api, client, credentials) = setup().await;
        let form = WithdrawalForm {
            amount: "500".to_string(),
            email: "pay@example.com".to_string(),
        };

        let result = client.submit_withdrawal(&credentials, &form, 50.0).await;

        assert!(matches!(result, Err(SubmitError::Invalid(_))));
        assert_eq!(api.call_count("create_withdrawal").await, 0);
    }

    #[tokio::test]
    async fn test_withdrawal_within_balance() {
        let (api, client, credentials) = setup().await;
        let form = WithdrawalForm {
            amount: "100".to_string(),
            email: "pay@example.com".to_string(),
        };

        let created = client
            .submit_withdrawal(&credentials, &form, 50.0)
            .await
            .unwrap();

        assert_eq!(created.amount, 100.0);
        assert_eq!(api.call_count("create_withdrawal").await, 1);
    }

    #[tokio::test]
    async fn test_api_error_passes_through() {
        let (api, client, credentials) = setup().await;
        api.fail_next(ApiError::Forbidden("creators only".to_string()))
            .await;

        let result = client
            .submit_category(&credentials, &CategoryForm { name: "Music".into() })
            .await;

        assert!(matches!(result, Err(SubmitError::Api(ApiError::Forbidden(_)))));
    }
}
