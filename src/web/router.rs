//! Axum router construction.

use axum::routing::{get, post};
use axum::Router;

use crate::web::handlers;
use crate::web::state::SharedState;

/// Build the complete Axum router with all API routes.
pub fn build_router(state: SharedState) -> Router {
    Router::new()
        // Health
        .route("/api/health", get(handlers::health::health_handler))
        // Auth API
        .route("/api/auth/register", post(handlers::auth::register_handler))
        .route("/api/auth/login", post(handlers::auth::login_handler))
        // Proposals API
        .route(
            "/api/proposals",
            get(handlers::proposals::list_proposals_handler)
                .post(handlers::proposals::create_proposal_handler),
        )
        .route(
            "/api/proposals/:proposal_id",
            get(handlers::proposals::get_proposal_handler)
                .patch(handlers::proposals::update_proposal_handler)
                .delete(handlers::proposals::delete_proposal_handler),
        )
        // Dashboard API
        .route("/api/dashboard", get(handlers::dashboard::dashboard_handler))
        .with_state(state)
}
