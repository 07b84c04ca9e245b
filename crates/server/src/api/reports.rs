//! Free-text reports sent from the recovery screen.

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use std::sync::Arc;
use tracing::info;

use agora_core::validation::ErrorReportForm;

use super::error::AppError;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct ReportReceipt {
    pub incident: String,
    pub message: String,
}

pub async fn submit_report(
    State(state): State<Arc<AppState>>,
    Json(form): Json<ErrorReportForm>,
) -> Result<(StatusCode, Json<ReportReceipt>), AppError> {
    let response = state.client().submit_error_report(&form).await?;
    let incident = uuid::Uuid::new_v4().to_string();
    info!("Error report {} forwarded", incident);
    Ok((
        StatusCode::ACCEPTED,
        Json(ReportReceipt {
            incident,
            message: response.message,
        }),
    ))
}
