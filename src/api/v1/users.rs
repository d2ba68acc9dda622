//! User endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{parse_id, CreatedResponse};
use crate::api::state::AppState;
use crate::api::types::{ApiError, Json};
use crate::domain::user::{User, UserId};
use crate::infrastructure::user::{CreateUserRequest, UpdateUserRequest};

/// Request body for creating or replacing a user
#[derive(Clone, Deserialize)]
pub struct UserApiRequest {
    pub username: String,
    pub password: String,
    pub email: String,
}

/// User response; the password hash never leaves the server
#[derive(Debug, Clone, Serialize)]
pub struct UserResponse {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub created_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id().as_i64(),
            username: user.username().to_string(),
            email: user.email().to_string(),
            created_at: user.created_at().to_rfc3339(),
            updated_at: user.updated_at().map(|t| t.to_rfc3339()),
        }
    }
}

/// POST /v1/users
pub async fn create_user(
    State(state): State<AppState>,
    Json(request): Json<UserApiRequest>,
) -> Result<impl IntoResponse, ApiError> {
    debug!(username = %request.username, "Creating user");

    let id = state
        .user_service
        .create(CreateUserRequest {
            username: request.username,
            password: request.password,
            email: request.email,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(CreatedResponse { id: id.as_i64() })))
}

/// GET /v1/users/{id}
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<UserResponse>, ApiError> {
    let id: UserId = parse_id(&id)?;
    debug!(user_id = %id, "Getting user");

    let user = state.user_service.get(id).await?;

    Ok(Json(UserResponse::from(&user)))
}

/// PUT /v1/users/{id}
pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<UserApiRequest>,
) -> Result<StatusCode, ApiError> {
    let id: UserId = parse_id(&id)?;
    debug!(user_id = %id, "Updating user");

    state
        .user_service
        .update(
            id,
            UpdateUserRequest {
                username: request.username,
                password: request.password,
                email: request.email,
            },
        )
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /v1/users/{id}
pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id: UserId = parse_id(&id)?;
    debug!(user_id = %id, "Deleting user");

    state.user_service.delete(id).await?;

    Ok(StatusCode::NO_CONTENT)
}
