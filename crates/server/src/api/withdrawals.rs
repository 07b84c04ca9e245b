//! Creator payout requests and admin review.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;
use tracing::info;

use agora_core::models::{MessageResponse, Withdrawal, WithdrawalUpdate};
use agora_core::validation::WithdrawalForm;

use super::error::AppError;
use super::middleware::Session;
use crate::state::AppState;

pub async fn list_withdrawals(
    State(state): State<Arc<AppState>>,
    session: Session,
) -> Result<Json<Vec<Withdrawal>>, AppError> {
    let withdrawals = state.client().withdrawals(&session.credentials).await?;
    Ok(Json((*withdrawals).clone()))
}

/// Request a payout. The amount is checked against the configured minimum
/// and the caller's balance before anything is sent.
pub async fn create_withdrawal(
    State(state): State<Arc<AppState>>,
    session: Session,
    Json(form): Json<WithdrawalForm>,
) -> Result<(StatusCode, Json<Withdrawal>), AppError> {
    let withdrawal = state
        .client()
        .submit_withdrawal(&session.credentials, &form, state.min_withdrawal())
        .await?;
    info!(
        "User {} requested withdrawal {} ({:.2})",
        session.user.id, withdrawal.id, withdrawal.amount
    );
    Ok((StatusCode::CREATED, Json(withdrawal)))
}

pub async fn cancel_withdrawal(
    State(state): State<Arc<AppState>>,
    session: Session,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, AppError> {
    let message = state
        .client()
        .delete_withdrawal(&session.credentials, &id)
        .await?;
    Ok(Json(message))
}

/// Admin decision on a payout request.
pub async fn review_withdrawal(
    State(state): State<Arc<AppState>>,
    session: Session,
    Path(id): Path<String>,
    Json(update): Json<WithdrawalUpdate>,
) -> Result<Json<Withdrawal>, AppError> {
    let withdrawal = state
        .client()
        .update_withdrawal(&session.credentials, &id, &update)
        .await?;
    info!("Withdrawal {} set to {:?}", id, withdrawal.status);
    Ok(Json(withdrawal))
}
