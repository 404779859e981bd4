//! PostgreSQL record store with connection pooling

use std::fmt::Debug;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::Row;

use crate::domain::storage::{Filter, OrderBy, Record, RecordStore, SortDirection};
use crate::domain::DomainError;

/// PostgreSQL connection configuration
#[derive(Debug, Clone)]
pub struct PostgresConfig {
    /// Database connection URL
    pub url: String,
    /// Maximum number of connections in the pool
    pub max_connections: u32,
    /// Minimum number of connections to maintain
    pub min_connections: u32,
    /// Connection timeout in seconds
    pub connect_timeout_secs: u64,
}

impl Default for PostgresConfig {
    fn default() -> Self {
        Self {
            url: "postgres://localhost/hackzilla".to_string(),
            max_connections: 10,
            min_connections: 1,
            connect_timeout_secs: 30,
        }
    }
}

impl PostgresConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    pub fn with_max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    pub fn with_connect_timeout(mut self, secs: u64) -> Self {
        self.connect_timeout_secs = secs;
        self
    }
}

/// Record store backed by a single JSONB table.
///
/// Every collection shares the `records` table; a unique expression index on
/// `(collection, data->>'id')` rejects duplicate ids, and `seq` preserves
/// insertion order.
pub struct PostgresRecordStore {
    pool: PgPool,
}

impl Debug for PostgresRecordStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PostgresRecordStore").finish()
    }
}

fn map_write_error(e: sqlx::Error, collection: &str, action: &str) -> DomainError {
    if e.to_string().contains("duplicate key") {
        DomainError::conflict(format!(
            "Record id already exists in '{}'",
            collection
        ))
    } else {
        DomainError::storage(format!("Failed to {} '{}' records: {}", action, collection, e))
    }
}

fn into_record(data: Value, collection: &str) -> Result<Record, DomainError> {
    match data {
        Value::Object(map) => Ok(map),
        other => Err(DomainError::storage(format!(
            "Non-object record in '{}': {}",
            collection, other
        ))),
    }
}

fn order_clause(order_by: Option<&OrderBy>) -> &'static str {
    match order_by.map(|o| o.direction) {
        Some(SortDirection::Ascending) => "ORDER BY data -> $3 ASC, seq ASC",
        Some(SortDirection::Descending) => "ORDER BY data -> $3 DESC, seq ASC",
        None => "ORDER BY seq ASC",
    }
}

impl PostgresRecordStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Creates a new store with connection pooling
    pub async fn connect(config: &PostgresConfig) -> Result<Self, DomainError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(Duration::from_secs(config.connect_timeout_secs))
            .connect(&config.url)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to connect to PostgreSQL: {}", e)))?;

        Ok(Self::new(pool))
    }

    /// Returns a reference to the connection pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Ensures the records table and its indexes exist
    pub async fn ensure_schema(&self) -> Result<(), DomainError> {
        let statements = [
            r#"
            CREATE TABLE IF NOT EXISTS records (
                seq BIGSERIAL PRIMARY KEY,
                collection VARCHAR(64) NOT NULL,
                data JSONB NOT NULL,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
            "#,
            r#"
            CREATE UNIQUE INDEX IF NOT EXISTS records_collection_id_key
                ON records (collection, (data->>'id'))
                WHERE data ? 'id'
            "#,
            "CREATE INDEX IF NOT EXISTS records_collection_idx ON records (collection)",
        ];

        for statement in statements {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .map_err(|e| DomainError::storage(format!("Failed to create schema: {}", e)))?;
        }

        Ok(())
    }
}

#[async_trait]
impl RecordStore for PostgresRecordStore {
    async fn insert(&self, collection: &str, record: Record) -> Result<Record, DomainError> {
        sqlx::query("INSERT INTO records (collection, data) VALUES ($1, $2)")
            .bind(collection)
            .bind(Value::Object(record.clone()))
            .execute(&self.pool)
            .await
            .map_err(|e| map_write_error(e, collection, "insert"))?;

        Ok(record)
    }

    async fn insert_many(
        &self,
        collection: &str,
        records: Vec<Record>,
    ) -> Result<usize, DomainError> {
        if records.is_empty() {
            return Ok(0);
        }

        let count = records.len();
        let array = Value::Array(records.into_iter().map(Value::Object).collect());

        // One statement keeps the batch atomic and in order
        sqlx::query(
            r#"
            INSERT INTO records (collection, data)
            SELECT $1, elem FROM jsonb_array_elements($2) WITH ORDINALITY AS t(elem, n)
            ORDER BY n
            "#,
        )
        .bind(collection)
        .bind(array)
        .execute(&self.pool)
        .await
        .map_err(|e| map_write_error(e, collection, "insert"))?;

        Ok(count)
    }

    async fn find_one(
        &self,
        collection: &str,
        filter: &Filter,
    ) -> Result<Option<Record>, DomainError> {
        let row = sqlx::query(
            "SELECT data FROM records WHERE collection = $1 AND data @> $2 ORDER BY seq LIMIT 1",
        )
        .bind(collection)
        .bind(Value::Object(filter.to_object()))
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            DomainError::storage(format!("Failed to query '{}' records: {}", collection, e))
        })?;

        match row {
            Some(row) => {
                let data: Value = row.get("data");
                Ok(Some(into_record(data, collection)?))
            }
            None => Ok(None),
        }
    }

    async fn find_many(
        &self,
        collection: &str,
        filter: &Filter,
        order_by: Option<OrderBy>,
    ) -> Result<Vec<Record>, DomainError> {
        let sql = format!(
            "SELECT data FROM records WHERE collection = $1 AND data @> $2 {}",
            order_clause(order_by.as_ref())
        );

        let mut query = sqlx::query(&sql)
            .bind(collection)
            .bind(Value::Object(filter.to_object()));

        if let Some(ref order) = order_by {
            query = query.bind(order.field.as_str());
        }

        let rows = query.fetch_all(&self.pool).await.map_err(|e| {
            DomainError::storage(format!("Failed to query '{}' records: {}", collection, e))
        })?;

        let mut records = Vec::with_capacity(rows.len());

        for row in rows {
            let data: Value = row.get("data");
            records.push(into_record(data, collection)?);
        }

        Ok(records)
    }

    async fn update(
        &self,
        collection: &str,
        filter: &Filter,
        changes: Record,
    ) -> Result<u64, DomainError> {
        let result = sqlx::query(
            "UPDATE records SET data = data || $3 WHERE collection = $1 AND data @> $2",
        )
        .bind(collection)
        .bind(Value::Object(filter.to_object()))
        .bind(Value::Object(changes))
        .execute(&self.pool)
        .await
        .map_err(|e| map_write_error(e, collection, "update"))?;

        Ok(result.rows_affected())
    }

    async fn delete(&self, collection: &str, filter: &Filter) -> Result<u64, DomainError> {
        let result = sqlx::query("DELETE FROM records WHERE collection = $1 AND data @> $2")
            .bind(collection)
            .bind(Value::Object(filter.to_object()))
            .execute(&self.pool)
            .await
            .map_err(|e| {
                DomainError::storage(format!("Failed to delete '{}' records: {}", collection, e))
            })?;

        Ok(result.rows_affected())
    }
}
