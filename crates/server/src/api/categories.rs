//! Category list and admin management.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use agora_core::models::{Category, MessageResponse};
use agora_core::validation::CategoryForm;

use super::error::AppError;
use super::middleware::Session;
use crate::state::AppState;

pub async fn list_categories(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Category>>, AppError> {
    let categories = state.client().categories().await?;
    Ok(Json((*categories).clone()))
}

pub async fn create_category(
    State(state): State<Arc<AppState>>,
    session: Session,
    Json(form): Json<CategoryForm>,
) -> Result<(StatusCode, Json<Category>), AppError> {
    let category = state
        .client()
        .submit_category(&session.credentials, &form)
        .await?;
    Ok((StatusCode::CREATED, Json(category)))
}

pub async fn update_category(
    State(state): State<Arc<AppState>>,
    session: Session,
    Path(id): Path<String>,
    Json(form): Json<CategoryForm>,
) -> Result<Json<Category>, AppError> {
    let category = form.validate()?;
    let updated = state
        .client()
        .update_category(&session.credentials, &id, &category)
        .await?;
    Ok(Json(updated))
}

pub async fn delete_category(
    State(state): State<Arc<AppState>>,
    session: Session,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, AppError> {
    let message = state
        .client()
        .delete_category(&session.credentials, &id)
        .await?;
    Ok(Json(message))
}
