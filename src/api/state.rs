//! Application state for shared services

use std::sync::Arc;

use crate::domain::team::{BadgePayload, Meal, MealStatus, NewTeam, Team, TeamPatch, WriteOutcome};
use crate::domain::{DomainError, User};
use crate::infrastructure::auth::JwtGenerator;
use crate::infrastructure::team::{
    BulkRegistration, StoreTeamRepository, TeamQuery, TeamService, TeamStats,
};
use crate::infrastructure::user::{
    Argon2Hasher, CreateUserRequest, StoreUserRepository, UserService,
};

/// Application state containing shared services using dynamic dispatch
#[derive(Clone)]
pub struct AppState {
    pub team_service: Arc<dyn TeamServiceTrait>,
    pub user_service: Arc<dyn UserServiceTrait>,
    pub jwt_service: Arc<dyn JwtGenerator>,
}

impl AppState {
    pub fn new(
        team_service: Arc<dyn TeamServiceTrait>,
        user_service: Arc<dyn UserServiceTrait>,
        jwt_service: Arc<dyn JwtGenerator>,
    ) -> Self {
        Self {
            team_service,
            user_service,
            jwt_service,
        }
    }
}

/// Trait for team service operations
#[async_trait::async_trait]
pub trait TeamServiceTrait: Send + Sync {
    async fn create(&self, input: NewTeam) -> Result<WriteOutcome<Team>, DomainError>;
    async fn register_many(&self, inputs: Vec<NewTeam>) -> BulkRegistration;
    async fn get(&self, id: &str) -> Result<Option<Team>, DomainError>;
    async fn list(&self) -> Result<Vec<Team>, DomainError>;
    async fn search(&self, query: &TeamQuery) -> Result<Vec<Team>, DomainError>;
    async fn stats(&self) -> Result<TeamStats, DomainError>;
    async fn update(&self, id: &str, patch: TeamPatch) -> Result<WriteOutcome<Team>, DomainError>;
    async fn delete(&self, id: &str) -> Result<bool, DomainError>;
    async fn set_meal_status(
        &self,
        id: &str,
        meal: Meal,
        status: MealStatus,
    ) -> Result<Team, DomainError>;
    async fn badge(&self, id: &str) -> Result<BadgePayload, DomainError>;
    async fn scan(&self, payload: &str, meal: Meal, status: MealStatus)
        -> Result<Team, DomainError>;
}

/// Trait for user service operations
#[async_trait::async_trait]
pub trait UserServiceTrait: Send + Sync {
    async fn create(&self, request: CreateUserRequest) -> Result<User, DomainError>;
    async fn authenticate(&self, username: &str, password: &str)
        -> Result<Option<User>, DomainError>;
    async fn get(&self, id: &str) -> Result<Option<User>, DomainError>;
    async fn list(&self) -> Result<Vec<User>, DomainError>;
}

// Implement traits for the actual services

#[async_trait::async_trait]
impl TeamServiceTrait for TeamService<StoreTeamRepository> {
    async fn create(&self, input: NewTeam) -> Result<WriteOutcome<Team>, DomainError> {
        TeamService::create(self, input).await
    }

    async fn register_many(&self, inputs: Vec<NewTeam>) -> BulkRegistration {
        TeamService::register_many(self, inputs).await
    }

    async fn get(&self, id: &str) -> Result<Option<Team>, DomainError> {
        TeamService::get(self, id).await
    }

    async fn list(&self) -> Result<Vec<Team>, DomainError> {
        TeamService::list(self).await
    }

    async fn search(&self, query: &TeamQuery) -> Result<Vec<Team>, DomainError> {
        TeamService::search(self, query).await
    }

    async fn stats(&self) -> Result<TeamStats, DomainError> {
        TeamService::stats(self).await
    }

    async fn update(&self, id: &str, patch: TeamPatch) -> Result<WriteOutcome<Team>, DomainError> {
        TeamService::update(self, id, patch).await
    }

    async fn delete(&self, id: &str) -> Result<bool, DomainError> {
        TeamService::delete(self, id).await
    }

    async fn set_meal_status(
        &self,
        id: &str,
        meal: Meal,
        status: MealStatus,
    ) -> Result<Team, DomainError> {
        TeamService::set_meal_status(self, id, meal, status).await
    }

    async fn badge(&self, id: &str) -> Result<BadgePayload, DomainError> {
        TeamService::badge(self, id).await
    }

    async fn scan(
        &self,
        payload: &str,
        meal: Meal,
        status: MealStatus,
    ) -> Result<Team, DomainError> {
        TeamService::scan(self, payload, meal, status).await
    }
}

#[async_trait::async_trait]
impl UserServiceTrait for UserService<StoreUserRepository, Argon2Hasher> {
    async fn create(&self, request: CreateUserRequest) -> Result<User, DomainError> {
        UserService::create(self, request).await
    }

    async fn authenticate(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Option<User>, DomainError> {
        UserService::authenticate(self, username, password).await
    }

    async fn get(&self, id: &str) -> Result<Option<User>, DomainError> {
        UserService::get(self, id).await
    }

    async fn list(&self) -> Result<Vec<User>, DomainError> {
        UserService::list(self).await
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    //! Router fixtures over in-memory storage

    use super::*;
    use crate::domain::UserRole;
    use crate::infrastructure::auth::{JwtConfig, JwtService};
    use crate::infrastructure::storage::InMemoryRecordStore;
    use crate::infrastructure::team::MaxScanAllocator;

    pub const ADMIN_PASSWORD: &str = "admin-password";
    pub const VOLUNTEER_PASSWORD: &str = "volunteer-password";

    pub struct TestApp {
        pub state: AppState,
        pub admin_token: String,
        pub volunteer_token: String,
    }

    pub async fn test_app() -> TestApp {
        let store = Arc::new(InMemoryRecordStore::new());
        let allocator = Arc::new(MaxScanAllocator::new(store.clone()));
        let teams = TeamService::new(Arc::new(StoreTeamRepository::new(
            store.clone(),
            allocator,
        )));
        let users = UserService::new(
            Arc::new(StoreUserRepository::new(store)),
            Arc::new(Argon2Hasher::new()),
        );
        let jwt = JwtService::new(JwtConfig::new("test-secret", 1));

        let admin = users
            .ensure_default_admin("admin", ADMIN_PASSWORD)
            .await
            .unwrap();
        let volunteer = users
            .create(CreateUserRequest {
                username: "desk".to_string(),
                password: VOLUNTEER_PASSWORD.to_string(),
                role: UserRole::Volunteer,
            })
            .await
            .unwrap();

        let admin_token = jwt.generate(&admin).unwrap();
        let volunteer_token = jwt.generate(&volunteer).unwrap();

        TestApp {
            state: AppState::new(Arc::new(teams), Arc::new(users), Arc::new(jwt)),
            admin_token,
            volunteer_token,
        }
    }
}
