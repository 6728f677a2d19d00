//! User authentication middleware using JWT tokens

use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts, HeaderMap},
};
use tracing::debug;

use crate::api::state::AppState;
use crate::api::types::ApiError;
use crate::domain::user::User;
use crate::infrastructure::auth::{JwtClaims, JwtGenerator};

/// Extractor that requires a valid, unrevoked bearer token whose subject
/// still exists. Carries the claims so logout can revoke them.
#[derive(Debug, Clone)]
pub struct RequireUser {
    pub user: User,
    pub claims: JwtClaims,
}

impl FromRequestParts<AppState> for RequireUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = extract_jwt_token(&parts.headers)?;

        debug!("Validating JWT token");

        let claims = state.jwt_service.validate(&token)?;

        if state.jwt_service.is_revoked(&claims).await {
            return Err(ApiError::unauthorized("Token has been revoked"));
        }

        let user = state
            .user_service
            .find(claims.user_id()?)
            .await?
            .ok_or_else(|| ApiError::unauthorized("User not found"))?;

        Ok(RequireUser { user, claims })
    }
}

/// Extract JWT token from Authorization header
pub fn extract_jwt_token(headers: &HeaderMap) -> Result<String, ApiError> {
    if let Some(auth_header) = headers.get(header::AUTHORIZATION) {
        let auth_str = auth_header
            .to_str()
            .map_err(|_| ApiError::unauthorized("Invalid Authorization header encoding"))?;

        if let Some(token) = auth_str.strip_prefix("Bearer ") {
            let token = token.trim();
            if !token.is_empty() {
                return Ok(token.to_string());
            }
        }
    }

    Err(ApiError::unauthorized(
        "Authentication required. Provide a token via 'Authorization: Bearer <token>' header",
    ))
}
