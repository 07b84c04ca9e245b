//! Dashboards.

use axum::{extract::State, Json};
use std::sync::Arc;

use agora_core::models::{AdminAnalytics, ErrorLog, UserAnalytics};

use super::error::AppError;
use super::middleware::Session;
use crate::state::AppState;

pub async fn admin_analytics(
    State(state): State<Arc<AppState>>,
    session: Session,
) -> Result<Json<AdminAnalytics>, AppError> {
    let analytics = state.client().admin_analytics(&session.credentials).await?;
    Ok(Json((*analytics).clone()))
}

pub async fn error_logs(
    State(state): State<Arc<AppState>>,
    session: Session,
) -> Result<Json<Vec<ErrorLog>>, AppError> {
    let logs = state.client().error_logs(&session.credentials).await?;
    Ok(Json((*logs).clone()))
}

/// Creator dashboard numbers.
pub async fn creator_analytics(
    State(state): State<Arc<AppState>>,
    session: Session,
) -> Result<Json<UserAnalytics>, AppError> {
    let analytics = state.client().user_analytics(&session.credentials).await?;
    Ok(Json((*analytics).clone()))
}
