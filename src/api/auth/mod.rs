//! Authentication API endpoints
//!
//! Token issuance happens elsewhere; this service only ends sessions.

use axum::{extract::State, routing::post, Router};
use tracing::info;

use crate::api::middleware::RequireUser;
use crate::api::state::AppState;
use crate::api::types::{ApiError, Json};
use crate::api::users::MessageResponse;

pub const LOGGED_OUT: &str = "Logged out successfully";

/// Create the authentication router
pub fn create_auth_router() -> Router<AppState> {
    Router::new().route("/logout", post(logout))
}

/// Logout
///
/// POST /api/logout
///
/// Revokes the presented token until it expires. Later requests carrying it
/// are rejected with 401.
pub async fn logout(
    State(state): State<AppState>,
    RequireUser { user, claims }: RequireUser,
) -> Result<Json<MessageResponse>, ApiError> {
    state.jwt_service.revoke(&claims).await;

    info!(user_id = %user.id(), "User logged out");

    Ok(Json(MessageResponse {
        message: LOGGED_OUT.to_string(),
    }))
}
