//! Admin authorization extractor

use axum::{extract::FromRequestParts, http::request::Parts};
use tracing::warn;

use crate::api::state::AppState;
use crate::api::types::ApiError;
use crate::domain::User;

use super::user_auth::RequireUser;

/// Extractor that requires an authenticated user with the admin role
#[derive(Debug, Clone)]
pub struct RequireAdmin(pub User);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let RequireUser(user) = RequireUser::from_request_parts(parts, state).await?;

        if !user.is_admin() {
            warn!(username = %user.username(), path = %parts.uri.path(), "Admin access denied");
            return Err(ApiError::forbidden("Admin access required"));
        }

        Ok(RequireAdmin(user))
    }
}
