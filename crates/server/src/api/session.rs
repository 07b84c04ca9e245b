//! Current user, settings and sign-out.

use axum::{extract::State, Json};
use std::sync::Arc;

use agora_core::models::{MessageResponse, Notification, SettingsUpdate, User};
use agora_core::validation::rules;
use agora_core::ValidationErrors;

use super::error::AppError;
use super::middleware::Session;
use crate::state::AppState;

pub async fn me(session: Session) -> Json<User> {
    Json((*session.user).clone())
}

pub async fn notifications(
    State(state): State<Arc<AppState>>,
    session: Session,
) -> Result<Json<Vec<Notification>>, AppError> {
    let notifications = state.client().notifications(&session.credentials).await?;
    Ok(Json((*notifications).clone()))
}

pub async fn update_settings(
    State(state): State<Arc<AppState>>,
    session: Session,
    Json(settings): Json<SettingsUpdate>,
) -> Result<Json<User>, AppError> {
    let mut errors = ValidationErrors::default();
    if let Some(name) = &settings.name {
        if let Err(message) = rules::required(name) {
            errors.add("name", message);
        }
    }
    if let Some(email) = &settings.email {
        if let Err(message) = rules::email(email) {
            errors.add("email", message);
        }
    }
    if !errors.is_empty() {
        return Err(errors.into());
    }

    let user = state
        .client()
        .update_settings(&session.credentials, &settings)
        .await?;
    Ok(Json(user))
}

/// Drop everything cached for this session.
pub async fn logout(State(state): State<Arc<AppState>>, session: Session) -> Json<MessageResponse> {
    state.client().logout(&session.credentials).await;
    Json(MessageResponse {
        message: "Signed out".to_string(),
    })
}
