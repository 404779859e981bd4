//! Client-scoped session storage

use async_trait::async_trait;
use serde_json::Value;

use crate::domain::DomainError;

/// Durable key/value store scoped to one client.
///
/// Values are JSON documents; a missing key reads as `None`.
#[async_trait]
pub trait SessionStore: Send + Sync + std::fmt::Debug {
    async fn get(&self, key: &str) -> Result<Option<Value>, DomainError>;

    async fn set(&self, key: &str, value: Value) -> Result<(), DomainError>;

    /// Remove a key; removing a missing key is not an error
    async fn remove(&self, key: &str) -> Result<(), DomainError>;
}
