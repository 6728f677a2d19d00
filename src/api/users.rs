//! User administration endpoints

use axum::{
    extract::{Path, Query, State},
    routing::get,
    Router,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::api::middleware::RequireUser;
use crate::api::state::AppState;
use crate::api::types::{ApiError, Json};
use crate::domain::{Page, PageRequest, User, UserStats};

pub const USER_UPDATED: &str = "User updated successfully";
pub const USER_DELETED: &str = "User deleted successfully";

/// Create the user administration router
pub fn create_users_router() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users))
        .route(
            "/users/{id}",
            get(show_user).put(update_user).delete(destroy_user),
        )
        .route("/user-stats", get(user_stats))
}

/// Query parameters for listing users
#[derive(Debug, Default, Deserialize)]
pub struct ListUsersQuery {
    /// Kept as text so a malformed value falls back to the first page
    pub page: Option<String>,
}

impl ListUsersQuery {
    pub fn page_request(&self) -> PageRequest {
        let number = self
            .page
            .as_deref()
            .and_then(|raw| raw.trim().parse::<usize>().ok())
            .unwrap_or(1);

        PageRequest::page(number)
    }
}

#[derive(Debug, Serialize)]
pub struct ListUsersResponse {
    pub users: Page<User>,
}

#[derive(Debug, Serialize)]
pub struct ShowUserResponse {
    pub user: User,
}

#[derive(Debug, Serialize)]
pub struct UpdateUserResponse {
    pub message: String,
    pub user: User,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// GET /api/users
pub async fn list_users(
    State(state): State<AppState>,
    Query(query): Query<ListUsersQuery>,
) -> Result<Json<ListUsersResponse>, ApiError> {
    let request = query.page_request();
    debug!(page = request.number(), "Listing users");

    let users = state.user_service.list(request).await?;

    Ok(Json(ListUsersResponse { users }))
}

/// GET /api/users/{id}
pub async fn show_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ShowUserResponse>, ApiError> {
    debug!(user_id = %id, "Showing user");

    let user = state.user_service.show(&id).await?;

    Ok(Json(ShowUserResponse { user }))
}

/// PUT /api/users/{id}
pub async fn update_user(
    State(state): State<AppState>,
    RequireUser { user: actor, .. }: RequireUser,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Result<Json<UpdateUserResponse>, ApiError> {
    debug!(user_id = %id, actor_id = %actor.id(), "Updating user");

    // Field types are checked by the service, after the user is found
    let Value::Object(fields) = body else {
        return Err(ApiError::bad_request("The request body must be a JSON object."));
    };

    let user = state.user_service.update(&id, fields).await?;

    Ok(Json(UpdateUserResponse {
        message: USER_UPDATED.to_string(),
        user,
    }))
}

/// DELETE /api/users/{id}
pub async fn destroy_user(
    State(state): State<AppState>,
    RequireUser { user: actor, .. }: RequireUser,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    debug!(user_id = %id, actor_id = %actor.id(), "Deleting user");

    state.user_service.destroy(&id).await?;

    Ok(Json(MessageResponse {
        message: USER_DELETED.to_string(),
    }))
}

/// GET /api/user-stats
pub async fn user_stats(
    State(state): State<AppState>,
    _user: RequireUser,
) -> Result<Json<UserStats>, ApiError> {
    let stats = state.user_service.stats().await?;

    debug!(total = stats.total_users, "Computed user stats");

    Ok(Json(stats))
}
