//! Community listing, detail and creator management.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

use agora_core::models::{Community, CommunityUpdate, Course, MessageResponse};
use agora_core::validation::CommunityForm;
use agora_core::{PageState, Role};

use super::error::AppError;
use super::middleware::Session;
use crate::state::AppState;

const LISTING_PATH: &str = "/api/v1/communities";

/// Query parameters of the listing. Kept as raw strings so a malformed
/// `page` falls back to 1 instead of rejecting the request.
#[derive(Debug, Default, Deserialize)]
pub struct ListCommunitiesParams {
    pub page: Option<String>,
    pub category: Option<String>,
    pub q: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ListCommunitiesResponse {
    pub communities: Vec<Community>,
    pub page: usize,
    pub page_count: usize,
    pub page_size: usize,
    pub total: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Canonical query string of this page.
    pub query: String,
    pub next: Option<String>,
    pub prev: Option<String>,
}

fn listing_link(page: &PageState, q: &str) -> String {
    if q.is_empty() {
        format!("{}?{}", LISTING_PATH, page.to_query())
    } else {
        format!(
            "{}?{}&q={}",
            LISTING_PATH,
            page.to_query(),
            urlencoding::encode(q)
        )
    }
}

/// Search, filter and paginate the public community list.
pub async fn list_communities(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListCommunitiesParams>,
) -> Result<Json<ListCommunitiesResponse>, AppError> {
    let page_state = PageState::from_params(params.page.as_deref(), params.category.as_deref());
    let q = params.q.as_deref().map(str::trim).unwrap_or_default();

    let communities = state.client().communities().await?;
    let page = state.community_page(communities, q, &page_state).await;

    Ok(Json(ListCommunitiesResponse {
        page: page.page,
        page_count: page.page_count,
        page_size: page.page_size,
        total: page.total,
        category: page_state.category().map(str::to_string),
        query: page_state.to_query(),
        next: page_state
            .next(page.page_count)
            .map(|next| listing_link(&next, q)),
        prev: page_state.prev().map(|prev| listing_link(&prev, q)),
        communities: page.items,
    }))
}

pub async fn get_community(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Community>, AppError> {
    let community = state.client().community(&id).await?;
    Ok(Json((*community).clone()))
}

pub async fn list_courses(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Vec<Course>>, AppError> {
    let courses = state.client().courses(&id).await?;
    Ok(Json((*courses).clone()))
}

pub async fn create_community(
    State(state): State<Arc<AppState>>,
    session: Session,
    Json(form): Json<CommunityForm>,
) -> Result<(StatusCode, Json<Community>), AppError> {
    let community = state
        .client()
        .submit_community(&session.credentials, &form)
        .await?;
    info!("User {} created community {}", session.user.id, community.id);
    Ok((StatusCode::CREATED, Json(community)))
}

/// Only the owner (or an admin) may change a community.
async fn owned_community(
    state: &AppState,
    session: &Session,
    id: &str,
) -> Result<Arc<Community>, AppError> {
    let community = state.client().community(id).await?;
    if session.user.role == Role::Admin || community.is_owned_by(&session.user.id) {
        Ok(community)
    } else {
        Err(AppError::Forbidden(
            "Only the creator can change this community".to_string(),
        ))
    }
}

/// Apply a partial edit. The merged record goes through the same form
/// rules as a new community.
pub async fn update_community(
    State(state): State<Arc<AppState>>,
    session: Session,
    Path(id): Path<String>,
    Json(update): Json<CommunityUpdate>,
) -> Result<Json<Community>, AppError> {
    let current = owned_community(&state, &session, &id).await?;

    let merged = CommunityForm {
        name: update.name.clone().unwrap_or_else(|| current.name.clone()),
        description: update
            .description
            .clone()
            .unwrap_or_else(|| current.description.clone()),
        category: update
            .category
            .clone()
            .unwrap_or_else(|| current.category.clone()),
        fee: update.fee.unwrap_or_else(|| current.fee.amount()).to_string(),
    };
    let categories = state.client().categories().await?;
    merged.validate(&categories)?;

    let updated = state
        .client()
        .update_community(&session.credentials, &id, &update)
        .await?;
    Ok(Json(updated))
}

pub async fn delete_community(
    State(state): State<Arc<AppState>>,
    session: Session,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, AppError> {
    owned_community(&state, &session, &id).await?;
    let message = state
        .client()
        .delete_community(&session.credentials, &id)
        .await?;
    info!("User {} deleted community {}", session.user.id, id);
    Ok(Json(message))
}

pub async fn join_community(
    State(state): State<Arc<AppState>>,
    session: Session,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, AppError> {
    let message = state
        .client()
        .join_community(&session.credentials, &id)
        .await?;
    Ok(Json(message))
}
