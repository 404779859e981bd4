//! User service for authentication and staff management

use std::sync::Arc;

use tracing::{debug, info};

use crate::domain::user::{
    validate_password, validate_username, User, UserId, UserRepository, UserRole,
};
use crate::domain::DomainError;
use crate::infrastructure::cache::ReadThroughCache;

use super::password::PasswordHasher;

/// Request for creating a new user
#[derive(Debug, Clone)]
pub struct CreateUserRequest {
    pub username: String,
    pub password: String,
    pub role: UserRole,
}

/// User service for authentication and management
#[derive(Debug)]
pub struct UserService<R: UserRepository, H: PasswordHasher> {
    repository: Arc<R>,
    hasher: Arc<H>,
    list_cache: ReadThroughCache<Vec<User>>,
}

impl<R: UserRepository, H: PasswordHasher> UserService<R, H> {
    pub fn new(repository: Arc<R>, hasher: Arc<H>) -> Self {
        Self {
            repository,
            hasher,
            list_cache: ReadThroughCache::new(),
        }
    }

    /// Create a new user
    pub async fn create(&self, request: CreateUserRequest) -> Result<User, DomainError> {
        validate_username(&request.username)
            .map_err(|e| DomainError::validation(e.to_string()))?;
        validate_password(&request.password)
            .map_err(|e| DomainError::validation(e.to_string()))?;

        if self.repository.username_exists(&request.username).await? {
            return Err(DomainError::conflict(format!(
                "Username '{}' already exists",
                request.username
            )));
        }

        let password_hash = self.hasher.hash(&request.password)?;
        let user = User::new(
            UserId::generate(),
            &request.username,
            password_hash,
            request.role,
        );

        let user = self.repository.create(user).await?;
        self.list_cache.invalidate().await;

        info!(username = %user.username(), role = %user.role(), "User created");
        Ok(user)
    }

    /// Check a username/password pair; `None` when either is wrong
    pub async fn authenticate(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Option<User>, DomainError> {
        let user = match self.repository.get_by_username(username).await? {
            Some(u) => u,
            None => return Ok(None),
        };

        if !self.hasher.verify(password, user.password()) {
            debug!(username = %username, "Password mismatch");
            return Ok(None);
        }

        Ok(Some(user))
    }

    /// Get a user by ID
    pub async fn get(&self, id: &str) -> Result<Option<User>, DomainError> {
        let user_id = UserId::new(id).map_err(|e| DomainError::invalid_id(e.to_string()))?;
        self.repository.get(&user_id).await
    }

    /// All users, oldest first
    pub async fn list(&self) -> Result<Vec<User>, DomainError> {
        if let Some(users) = self.list_cache.get().await {
            return Ok(users);
        }

        let generation = self.list_cache.generation().await;
        let users = self.repository.list().await?;
        self.list_cache.fill(generation, users.clone()).await;

        Ok(users)
    }

    /// Create the configured admin account unless the username is taken
    pub async fn ensure_default_admin(
        &self,
        username: &str,
        password: &str,
    ) -> Result<User, DomainError> {
        if let Some(user) = self.repository.get_by_username(username).await? {
            debug!(username = %username, "Default admin already exists");
            return Ok(user);
        }

        info!(username = %username, "Creating default admin");

        self.create(CreateUserRequest {
            username: username.to_string(),
            password: password.to_string(),
            role: UserRole::Admin,
        })
        .await
    }
}
