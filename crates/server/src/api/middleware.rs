//! Session guard, metrics and panic recovery middleware.

use axum::{
    body::Body,
    extract::{FromRequestParts, State},
    http::{header, request::Parts, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
    Json,
};
use serde::Serialize;
use std::any::Any;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, warn};

use agora_core::models::User;
use agora_core::roles::SIGN_UP_PATH;
use agora_core::{Access, ApiError, Credentials, RouteGuard};

use super::error::{AppError, ErrorResponse};
use crate::metrics::{
    normalize_path, GUARD_REJECTIONS_TOTAL, HANDLER_PANICS_TOTAL, HTTP_REQUESTS_IN_FLIGHT,
    HTTP_REQUESTS_TOTAL, HTTP_REQUEST_DURATION,
};
use crate::state::AppState;

/// Metrics middleware that tracks HTTP request duration and counts.
///
/// This middleware records:
/// - Request duration (histogram)
/// - Request count (counter)
/// - Requests in flight (gauge)
pub async fn metrics_middleware(request: Request<Body>, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().to_string();
    let path = normalize_path(request.uri().path());

    HTTP_REQUESTS_IN_FLIGHT.inc();

    let response = next.run(request).await;

    HTTP_REQUESTS_IN_FLIGHT.dec();

    let duration = start.elapsed().as_secs_f64();
    let status = response.status().as_u16().to_string();

    HTTP_REQUEST_DURATION
        .with_label_values(&[&method, &path, &status])
        .observe(duration);
    HTTP_REQUESTS_TOTAL
        .with_label_values(&[&method, &path, &status])
        .inc();

    response
}

/// Signed-in caller of a guarded route.
#[derive(Debug, Clone)]
pub struct Session {
    pub credentials: Credentials,
    pub user: Arc<User>,
}

impl<S> FromRequestParts<S> for Session
where
    S: Send + Sync,
{
    type Rejection = StatusCode;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Session>()
            .cloned()
            .ok_or(StatusCode::UNAUTHORIZED)
    }
}

/// Bearer token of the request, if any.
pub fn bearer_credentials(parts: &Parts) -> Option<Credentials> {
    let value = parts.headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let token = value
        .strip_prefix("Bearer ")
        .or_else(|| value.strip_prefix("bearer "))?
        .trim();
    (!token.is_empty()).then(|| Credentials::bearer(token))
}

/// Route guard middleware.
///
/// Resolves the bearer token to a profile, then lets `guard` decide:
/// no session (or an expired one) is redirected to the sign-up page with
/// `303 See Other`, a role without the capability gets `403`. Allowed
/// requests carry a [`Session`] extension.
pub async fn guard_middleware(
    State((state, guard)): State<(Arc<AppState>, RouteGuard)>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let (mut parts, body) = request.into_parts();

    let session = match bearer_credentials(&parts) {
        Some(credentials) => match state.client().profile(&credentials).await {
            Ok(user) => Some(Session { credentials, user }),
            Err(ApiError::Unauthorized) => {
                debug!("Session {} rejected by the API", credentials.scope());
                GUARD_REJECTIONS_TOTAL
                    .with_label_values(&["session_expired"])
                    .inc();
                None
            }
            Err(e) => {
                warn!("Profile lookup failed: {}", e);
                return AppError::Api(e).into_response();
            }
        },
        None => None,
    };

    match guard.check(session.as_ref().map(|s| s.user.role)) {
        Access::Allow => {
            if let Some(session) = session {
                parts.extensions.insert(session);
            }
            next.run(Request::from_parts(parts, body)).await
        }
        Access::RedirectToSignUp => {
            GUARD_REJECTIONS_TOTAL
                .with_label_values(&["sign_up_redirect"])
                .inc();
            Redirect::to(SIGN_UP_PATH).into_response()
        }
        Access::Forbidden => {
            GUARD_REJECTIONS_TOTAL.with_label_values(&["forbidden"]).inc();
            (
                StatusCode::FORBIDDEN,
                Json(ErrorResponse::new("You are not allowed to access this page")),
            )
                .into_response()
        }
    }
}

/// Body served when a handler panicked.
#[derive(Debug, Serialize)]
pub struct RecoveryResponse {
    pub error: String,
    /// Id to quote in an error report.
    pub incident: String,
    /// Offered next steps: reload the page or go home.
    pub actions: Vec<&'static str>,
    pub home: &'static str,
    /// Where the free-text report goes.
    pub report: &'static str,
}

/// Turn a handler panic into the recovery screen payload.
pub fn recovery_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic".to_string()
    };
    let incident = uuid::Uuid::new_v4().to_string();
    error!("Handler panicked (incident {}): {}", incident, detail);
    HANDLER_PANICS_TOTAL.inc();

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(RecoveryResponse {
            error: "Something went wrong while rendering this page".to_string(),
            incident,
            actions: vec!["reload", "home"],
            home: "/",
            report: "/api/v1/error-reports",
        }),
    )
        .into_response()
}
