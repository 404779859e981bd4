//! Record store trait definition

use std::fmt::Debug;

use async_trait::async_trait;

#[cfg(test)]
use mockall::automock;

use crate::domain::DomainError;

use super::record::{Filter, OrderBy, Record};

/// Collection-scoped remote record store.
///
/// Every call may fail; failures come back as `DomainError` values so callers
/// can decide per call whether a failure is fatal or tolerable.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait RecordStore: Send + Sync + Debug {
    /// Inserts a record. Fails with `Conflict` when a record with the same
    /// `id` field already exists in the collection.
    async fn insert(&self, collection: &str, record: Record) -> Result<Record, DomainError>;

    /// Inserts several records, returning how many were written
    async fn insert_many(
        &self,
        collection: &str,
        records: Vec<Record>,
    ) -> Result<usize, DomainError> {
        let count = records.len();

        for record in records {
            self.insert(collection, record).await?;
        }

        Ok(count)
    }

    /// Returns the first record matching the filter
    async fn find_one(
        &self,
        collection: &str,
        filter: &Filter,
    ) -> Result<Option<Record>, DomainError>;

    /// Returns every record matching the filter, optionally ordered.
    /// Without an ordering, records come back in insertion order.
    async fn find_many(
        &self,
        collection: &str,
        filter: &Filter,
        order_by: Option<OrderBy>,
    ) -> Result<Vec<Record>, DomainError>;

    /// Merges `changes` into every matching record, returning the match count
    async fn update(
        &self,
        collection: &str,
        filter: &Filter,
        changes: Record,
    ) -> Result<u64, DomainError>;

    /// Removes every matching record, returning the removed count
    async fn delete(&self, collection: &str, filter: &Filter) -> Result<u64, DomainError>;
}
