//! Cached identity of the signed-in staff user

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::domain::session::SessionStore;
use crate::domain::user::{User, UserRole};
use crate::domain::DomainError;

const CURRENT_USER_KEY: &str = "currentUser";

/// What the client remembers about the signed-in user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionUser {
    pub id: String,
    pub username: String,
    pub role: UserRole,
    pub token: String,
}

impl SessionUser {
    pub fn new(user: &User, token: impl Into<String>) -> Self {
        Self {
            id: user.id().as_str().to_string(),
            username: user.username().to_string(),
            role: user.role(),
            token: token.into(),
        }
    }
}

/// Reads and writes the current user entry of a session store
#[derive(Debug, Clone)]
pub struct CurrentUserSession {
    store: Arc<dyn SessionStore>,
}

impl CurrentUserSession {
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        Self { store }
    }

    pub async fn save(&self, user: &SessionUser) -> Result<(), DomainError> {
        let value = serde_json::to_value(user)
            .map_err(|e| DomainError::internal(format!("Failed to encode session user: {}", e)))?;
        self.store.set(CURRENT_USER_KEY, value).await
    }

    /// The remembered user; an unreadable entry is dropped and reads as signed out
    pub async fn load(&self) -> Result<Option<SessionUser>, DomainError> {
        let Some(value) = self.store.get(CURRENT_USER_KEY).await? else {
            return Ok(None);
        };

        match serde_json::from_value(value) {
            Ok(user) => Ok(Some(user)),
            Err(e) => {
                warn!(error = %e, "Discarding unreadable session user");
                self.store.remove(CURRENT_USER_KEY).await?;
                Ok(None)
            }
        }
    }

    pub async fn clear(&self) -> Result<(), DomainError> {
        self.store.remove(CURRENT_USER_KEY).await
    }
}
