//! Staff user management endpoints

use axum::{extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::api::auth::UserResponse;
use crate::api::middleware::RequireAdmin;
use crate::api::state::AppState;
use crate::api::types::{ApiError, Json};
use crate::domain::UserRole;
use crate::infrastructure::user::CreateUserRequest;

#[derive(Debug, Clone, Deserialize)]
pub struct CreateUserApiRequest {
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub role: UserRole,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListUsersResponse {
    pub users: Vec<UserResponse>,
    pub total: usize,
}

/// GET /api/users
pub async fn list_users(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
) -> Result<Json<ListUsersResponse>, ApiError> {
    let users: Vec<UserResponse> = state
        .user_service
        .list()
        .await?
        .iter()
        .map(UserResponse::from)
        .collect();
    let total = users.len();

    Ok(Json(ListUsersResponse { users, total }))
}

/// POST /api/users
pub async fn create_user(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Json(request): Json<CreateUserApiRequest>,
) -> Result<(StatusCode, Json<UserResponse>), ApiError> {
    let user = state
        .user_service
        .create(CreateUserRequest {
            username: request.username,
            password: request.password,
            role: request.role,
        })
        .await?;

    info!(username = %user.username(), by = %admin.username(), "Staff account created");

    Ok((StatusCode::CREATED, Json(UserResponse::from(&user))))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::router::create_router_with_state;
    use crate::api::state::test_support::test_app;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn post_user(token: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api/users")
            .header(header::AUTHORIZATION, format!("Bearer {}", token))
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn list_request(token: &str) -> Request<Body> {
        Request::builder()
            .uri("/api/users")
            .header(header::AUTHORIZATION, format!("Bearer {}", token))
            .body(Body::empty())
            .unwrap()
    }

    #[tokio::test]
    async fn test_admin_creates_volunteer() {
        let app = test_app().await;
        let router = create_router_with_state(app.state);

        let response = router
            .clone()
            .oneshot(post_user(
                &app.admin_token,
                json!({"username": "gate-2", "password": "scanner-pass"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let created: UserResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(created.role, UserRole::Volunteer);

        let response = router.oneshot(list_request(&app.admin_token)).await.unwrap();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let list: ListUsersResponse = serde_json::from_slice(&body).unwrap();

        assert_eq!(list.total, 3);
        assert!(list.users.iter().any(|u| u.username == "gate-2"));
        // Password hashes never leave the service
        assert!(!String::from_utf8_lossy(&body).contains("password"));
    }

    #[tokio::test]
    async fn test_duplicate_username_conflicts() {
        let app = test_app().await;
        let router = create_router_with_state(app.state);

        let response = router
            .oneshot(post_user(
                &app.admin_token,
                json!({"username": "desk", "password": "another-pass"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_volunteer_cannot_manage_users() {
        let app = test_app().await;
        let router = create_router_with_state(app.state);

        let response = router
            .clone()
            .oneshot(list_request(&app.volunteer_token))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let response = router
            .oneshot(post_user(
                &app.volunteer_token,
                json!({"username": "sneaky", "password": "sneaky-pass", "role": "admin"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }
}
