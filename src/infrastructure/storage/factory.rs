//! Record store factory for runtime backend selection

use std::sync::Arc;

use tracing::info;

use crate::domain::storage::RecordStore;
use crate::domain::DomainError;

use super::in_memory::InMemoryRecordStore;
use super::postgres::{PostgresConfig, PostgresRecordStore};

/// Supported storage backends
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageType {
    /// In-memory storage (for testing/development)
    InMemory,
    /// PostgreSQL storage
    Postgres,
}

impl StorageType {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "memory" | "inmemory" | "in-memory" | "in_memory" => Some(Self::InMemory),
            "postgres" | "postgresql" | "pg" => Some(Self::Postgres),
            _ => None,
        }
    }
}

/// Storage configuration
#[derive(Debug, Clone)]
pub enum StorageConfig {
    InMemory,
    Postgres(PostgresConfig),
}

impl StorageConfig {
    pub fn in_memory() -> Self {
        Self::InMemory
    }

    pub fn postgres(config: PostgresConfig) -> Self {
        Self::Postgres(config)
    }

    /// Returns the storage type
    pub fn storage_type(&self) -> StorageType {
        match self {
            Self::InMemory => StorageType::InMemory,
            Self::Postgres(_) => StorageType::Postgres,
        }
    }
}

/// Factory for creating record store instances
#[derive(Debug)]
pub struct StorageFactory;

impl StorageFactory {
    /// Creates a record store based on the configuration
    pub async fn create(config: &StorageConfig) -> Result<Arc<dyn RecordStore>, DomainError> {
        match config {
            StorageConfig::InMemory => {
                info!("Using in-memory record store");
                Ok(Arc::new(InMemoryRecordStore::new()))
            }
            StorageConfig::Postgres(pg_config) => {
                info!(
                    max_connections = pg_config.max_connections,
                    "Connecting to PostgreSQL record store"
                );
                let store = PostgresRecordStore::connect(pg_config).await?;
                store.ensure_schema().await?;
                Ok(Arc::new(store))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::storage::Filter;

    #[test]
    fn test_storage_type_from_str() {
        assert_eq!(StorageType::from_str("memory"), Some(StorageType::InMemory));
        assert_eq!(StorageType::from_str("In-Memory"), Some(StorageType::InMemory));
        assert_eq!(StorageType::from_str("postgres"), Some(StorageType::Postgres));
        assert_eq!(StorageType::from_str("pg"), Some(StorageType::Postgres));
        assert_eq!(StorageType::from_str("supabase"), None);
    }

    #[test]
    fn test_storage_config_types() {
        assert_eq!(StorageConfig::in_memory().storage_type(), StorageType::InMemory);

        let postgres = StorageConfig::postgres(PostgresConfig::new("postgres://localhost/test"));
        assert_eq!(postgres.storage_type(), StorageType::Postgres);
    }

    #[tokio::test]
    async fn test_create_in_memory() {
        let store = StorageFactory::create(&StorageConfig::in_memory())
            .await
            .unwrap();

        let found = store.find_many("teams", &Filter::new(), None).await.unwrap();
        assert!(found.is_empty());
    }
}
