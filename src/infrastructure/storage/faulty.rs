//! Fault-injecting record store for tests

use std::collections::HashSet;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::domain::storage::{Filter, OrderBy, Record, RecordStore};
use crate::domain::DomainError;

use super::in_memory::InMemoryRecordStore;

/// Store operation kinds that can be made to fail
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    Insert,
    Find,
    Update,
    Delete,
}

/// Wraps an in-memory store and fails chosen operations on chosen collections
#[derive(Debug, Default)]
pub struct FaultyRecordStore {
    inner: InMemoryRecordStore,
    faults: Mutex<HashSet<(String, Op)>>,
}

impl FaultyRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `op` on `collection` fail until healed
    pub fn fail(&self, collection: &str, op: Op) {
        self.faults
            .lock()
            .unwrap()
            .insert((collection.to_string(), op));
    }

    pub fn heal(&self, collection: &str, op: Op) {
        self.faults
            .lock()
            .unwrap()
            .remove(&(collection.to_string(), op));
    }

    pub fn heal_all(&self) {
        self.faults.lock().unwrap().clear();
    }

    pub fn inner(&self) -> &InMemoryRecordStore {
        &self.inner
    }

    fn check(&self, collection: &str, op: Op) -> Result<(), DomainError> {
        if self
            .faults
            .lock()
            .unwrap()
            .contains(&(collection.to_string(), op))
        {
            return Err(DomainError::storage(format!(
                "Injected {:?} failure on '{}'",
                op, collection
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl RecordStore for FaultyRecordStore {
    async fn insert(&self, collection: &str, record: Record) -> Result<Record, DomainError> {
        self.check(collection, Op::Insert)?;
        self.inner.insert(collection, record).await
    }

    async fn insert_many(
        &self,
        collection: &str,
        records: Vec<Record>,
    ) -> Result<usize, DomainError> {
        self.check(collection, Op::Insert)?;
        self.inner.insert_many(collection, records).await
    }

    async fn find_one(
        &self,
        collection: &str,
        filter: &Filter,
    ) -> Result<Option<Record>, DomainError> {
        self.check(collection, Op::Find)?;
        self.inner.find_one(collection, filter).await
    }

    async fn find_many(
        &self,
        collection: &str,
        filter: &Filter,
        order_by: Option<OrderBy>,
    ) -> Result<Vec<Record>, DomainError> {
        self.check(collection, Op::Find)?;
        self.inner.find_many(collection, filter, order_by).await
    }

    async fn update(
        &self,
        collection: &str,
        filter: &Filter,
        changes: Record,
    ) -> Result<u64, DomainError> {
        self.check(collection, Op::Update)?;
        self.inner.update(collection, filter, changes).await
    }

    async fn delete(&self, collection: &str, filter: &Filter) -> Result<u64, DomainError> {
        self.check(collection, Op::Delete)?;
        self.inner.delete(collection, filter).await
    }
}
