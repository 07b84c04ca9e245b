use axum::{
    http::StatusCode,
    middleware,
    routing::{delete, get, post, put},
    Json, Router,
};
use std::sync::Arc;
use tower_http::{catch_panic::CatchPanicLayer, cors::CorsLayer, trace::TraceLayer};

use agora_core::{Capability, RouteGuard};

use super::error::ErrorResponse;
use super::middleware::{guard_middleware, metrics_middleware, recovery_response};
use super::{admin, categories, communities, courses, handlers, reports, session, withdrawals};
use crate::state::AppState;

/// Put `routes` behind `guard`.
fn guarded(
    state: &Arc<AppState>,
    guard: RouteGuard,
    routes: Router<Arc<AppState>>,
) -> Router<Arc<AppState>> {
    routes.route_layer(middleware::from_fn_with_state(
        (Arc::clone(state), guard),
        guard_middleware,
    ))
}

pub fn create_router(state: Arc<AppState>) -> Router {
    let public = Router::new()
        // Health and config
        .route("/health", get(handlers::health))
        .route("/config", get(handlers::get_config))
        // Listing (page state lives in the query string)
        .route("/communities", get(communities::list_communities))
        .route("/communities/{id}", get(communities::get_community))
        .route("/communities/{id}/courses", get(communities::list_courses))
        .route("/categories", get(categories::list_categories))
        // Recovery screen
        .route("/error-reports", post(reports::submit_report));

    let signed_in = guarded(
        &state,
        RouteGuard::authenticated(),
        Router::new()
            .route("/me", get(session::me))
            .route("/me/notifications", get(session::notifications))
            .route("/me/settings", put(session::update_settings))
            .route("/logout", post(session::logout))
            .route("/communities/{id}/join", post(communities::join_community)),
    );

    let classroom = guarded(
        &state,
        RouteGuard::requires(Capability::ViewCommunityAccess),
        Router::new()
            .route("/courses/{id}/progress", get(courses::get_progress))
            .route("/courses/{id}/classroom", get(courses::get_classroom))
            .route(
                "/courses/{id}/lessons/{index}/watched",
                post(courses::mark_watched),
            ),
    );

    let creator = guarded(
        &state,
        RouteGuard::requires(Capability::ManageOwnCommunities),
        Router::new()
            .route("/communities", post(communities::create_community))
            .route(
                "/communities/{id}",
                put(communities::update_community).delete(communities::delete_community),
            ),
    );

    let creator_dashboard = guarded(
        &state,
        RouteGuard::requires(Capability::ViewCreatorDashboard),
        Router::new().route("/me/analytics", get(admin::creator_analytics)),
    );

    let payouts = guarded(
        &state,
        RouteGuard::requires(Capability::RequestWithdrawal),
        Router::new()
            .route(
                "/withdrawals",
                get(withdrawals::list_withdrawals).post(withdrawals::create_withdrawal),
            )
            .route(
                "/withdrawals/{id}",
                delete(withdrawals::cancel_withdrawal),
            ),
    );

    let payout_review = guarded(
        &state,
        RouteGuard::requires(Capability::ReviewWithdrawals),
        Router::new().route("/withdrawals/{id}", put(withdrawals::review_withdrawal)),
    );

    let category_admin = guarded(
        &state,
        RouteGuard::requires(Capability::ManageCategories),
        Router::new()
            .route("/categories", post(categories::create_category))
            .route(
                "/categories/{id}",
                put(categories::update_category).delete(categories::delete_category),
            ),
    );

    let admin_dashboard = guarded(
        &state,
        RouteGuard::requires(Capability::ViewAdminDashboard),
        Router::new().route("/admin/analytics", get(admin::admin_analytics)),
    );

    let error_logs = guarded(
        &state,
        RouteGuard::requires(Capability::ViewErrorLogs),
        Router::new().route("/admin/error-logs", get(admin::error_logs)),
    );

    let api_routes = public
        .merge(signed_in)
        .merge(classroom)
        .merge(creator)
        .merge(creator_dashboard)
        .merge(payouts)
        .merge(payout_review)
        .merge(category_admin)
        .merge(admin_dashboard)
        .merge(error_logs)
        .with_state(state);

    Router::new()
        .route("/metrics", get(handlers::metrics))
        .nest("/api/v1", api_routes)
        .fallback(not_found)
        .layer(CatchPanicLayer::custom(recovery_response))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

async fn not_found() -> (StatusCode, Json<ErrorResponse>) {
    let mut body = ErrorResponse::new("Page not found");
    body.state = Some("not_found");
    (StatusCode::NOT_FOUND, Json(body))
}
