//! Authentication API endpoints
//!
//! Staff sign in with username and password and receive a JWT for the
//! `Authorization: Bearer` header.

use axum::{
    extract::State,
    routing::{get, post},
    Router,
};
use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::api::middleware::RequireUser;
use crate::api::state::AppState;
use crate::api::types::{ApiError, Json};
use crate::domain::{User, UserRole};

/// Create the authentication router
pub fn create_auth_router() -> Router<AppState> {
    Router::new()
        .route("/login", post(login))
        .route("/me", get(get_current_user))
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: UserResponse,
    pub expires_at: String,
}

/// User response (safe to expose)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: String,
    pub username: String,
    pub role: UserRole,
    pub created_at: String,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id().as_str().to_string(),
            username: user.username().to_string(),
            role: user.role(),
            created_at: user.created_at().to_rfc3339(),
        }
    }
}

/// POST /auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let user = match state
        .user_service
        .authenticate(&request.username, &request.password)
        .await?
    {
        Some(user) => user,
        None => {
            warn!(username = %request.username, "Failed login attempt");
            return Err(ApiError::unauthorized("Invalid username or password"));
        }
    };

    let token = state.jwt_service.generate(&user)?;
    let expires_at = Utc::now() + Duration::hours(state.jwt_service.expiration_hours() as i64);

    info!(username = %user.username(), role = %user.role(), "User logged in");

    Ok(Json(LoginResponse {
        token,
        user: UserResponse::from(&user),
        expires_at: expires_at.to_rfc3339(),
    }))
}

/// GET /auth/me
pub async fn get_current_user(
    RequireUser(user): RequireUser,
) -> Result<Json<UserResponse>, ApiError> {
    Ok(Json(UserResponse::from(&user)))
}
