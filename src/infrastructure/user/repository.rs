//! Record-store-backed user repository

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::storage::{CollectionRecord, Filter, OrderBy, RecordStore};
use crate::domain::user::{User, UserId, UserRepository, UserRole};
use crate::domain::DomainError;
use crate::infrastructure::storage::timestamp;

/// Persisted user shape; unlike `User` it carries the credential
#[derive(Debug, Clone, Serialize, Deserialize)]
struct UserRecord {
    id: UserId,
    username: String,
    password: String,
    #[serde(default)]
    role: UserRole,
    #[serde(with = "timestamp")]
    created_at: DateTime<Utc>,
}

impl CollectionRecord for UserRecord {
    const COLLECTION: &'static str = "users";
}

impl From<&User> for UserRecord {
    fn from(user: &User) -> Self {
        Self {
            id: user.id().clone(),
            username: user.username().to_string(),
            password: user.password().to_string(),
            role: user.role(),
            created_at: user.created_at(),
        }
    }
}

impl From<UserRecord> for User {
    fn from(record: UserRecord) -> Self {
        User::from_parts(
            record.id,
            record.username,
            record.password,
            record.role,
            record.created_at,
        )
    }
}

/// User repository over the `users` collection
#[derive(Debug)]
pub struct StoreUserRepository {
    store: Arc<dyn RecordStore>,
}

impl StoreUserRepository {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    async fn find_by(&self, filter: Filter) -> Result<Option<User>, DomainError> {
        match self.store.find_one(UserRecord::COLLECTION, &filter).await? {
            Some(record) => Ok(Some(UserRecord::from_record(record)?.into())),
            None => Ok(None),
        }
    }
}

#[async_trait]
impl UserRepository for StoreUserRepository {
    async fn get(&self, id: &UserId) -> Result<Option<User>, DomainError> {
        self.find_by(Filter::by("id", id.as_str())).await
    }

    async fn get_by_username(&self, username: &str) -> Result<Option<User>, DomainError> {
        self.find_by(Filter::by("username", username)).await
    }

    async fn create(&self, user: User) -> Result<User, DomainError> {
        let record = UserRecord::from(&user).to_record()?;
        self.store.insert(UserRecord::COLLECTION, record).await?;
        Ok(user)
    }

    async fn list(&self) -> Result<Vec<User>, DomainError> {
        let records = self
            .store
            .find_many(
                UserRecord::COLLECTION,
                &Filter::new(),
                Some(OrderBy::asc("created_at")),
            )
            .await?;

        records
            .into_iter()
            .map(|r| UserRecord::from_record(r).map(User::from))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::storage::InMemoryRecordStore;

    fn create_repo() -> StoreUserRepository {
        StoreUserRepository::new(Arc::new(InMemoryRecordStore::new()))
    }

    fn user(username: &str, role: UserRole) -> User {
        User::new(UserId::generate(), username, "$argon2id$stub", role)
    }

    #[tokio::test]
    async fn test_create_and_lookup() {
        let repo = create_repo();
        let created = repo.create(user("desk1", UserRole::Volunteer)).await.unwrap();

        let by_id = repo.get(created.id()).await.unwrap().unwrap();
        assert_eq!(by_id, created);
        assert_eq!(by_id.password(), "$argon2id$stub");

        let by_name = repo.get_by_username("desk1").await.unwrap().unwrap();
        assert_eq!(by_name.id(), created.id());

        assert!(repo.get_by_username("desk2").await.unwrap().is_none());
        assert!(repo.username_exists("desk1").await.unwrap());
    }

    #[tokio::test]
    async fn test_list_oldest_first() {
        let repo = create_repo();
        repo.create(user("admin", UserRole::Admin)).await.unwrap();
        repo.create(user("desk1", UserRole::Volunteer)).await.unwrap();

        let users = repo.list().await.unwrap();
        let names: Vec<_> = users.iter().map(|u| u.username()).collect();

        assert_eq!(names, vec!["admin", "desk1"]);
        assert!(users[0].is_admin());
    }
}
