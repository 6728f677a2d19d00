use axum::{middleware, routing::get, Router};
use tower_http::trace::TraceLayer;

use super::auth;
use super::health;
use super::middleware::{cors_layer, logging_middleware, security_headers_middleware};
use super::state::AppState;
use super::users;
use crate::config::CorsConfig;

/// Routes served under `/api`
pub fn create_api_router() -> Router<AppState> {
    users::create_users_router().merge(auth::create_auth_router())
}

/// Create the full router with application state
pub fn create_router_with_state(state: AppState, cors: &CorsConfig) -> Router {
    Router::new()
        // Health endpoints
        .route("/health", get(health::health_check))
        .route("/ready", get(health::ready_check))
        .route("/live", get(health::live_check))
        .nest("/api", create_api_router())
        .with_state(state)
        .layer(middleware::from_fn(security_headers_middleware))
        .layer(middleware::from_fn(logging_middleware))
        .layer(cors_layer(cors))
        .layer(TraceLayer::new_for_http())
}
