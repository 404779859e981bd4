//! In-memory record store implementation

use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::RwLock;

use async_trait::async_trait;
use serde_json::Value;

use crate::domain::storage::{Filter, OrderBy, Record, RecordStore};
use crate::domain::DomainError;

/// Thread-safe in-memory record store
///
/// Useful for testing and development. Data is lost when the process terminates.
/// Records keep insertion order per collection, and the `id` field is unique
/// within a collection.
#[derive(Debug, Default)]
pub struct InMemoryRecordStore {
    collections: RwLock<HashMap<String, Vec<Record>>>,
}

impl InMemoryRecordStore {
    /// Creates a new empty in-memory store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records currently held in a collection
    pub fn len(&self, collection: &str) -> Result<usize, DomainError> {
        let collections = self.collections.read().map_err(|e| {
            DomainError::storage(format!("Failed to acquire read lock: {}", e))
        })?;

        Ok(collections.get(collection).map_or(0, Vec::len))
    }
}

fn has_id(records: &[Record], id: &Value) -> bool {
    records.iter().any(|r| r.get("id") == Some(id))
}

#[async_trait]
impl RecordStore for InMemoryRecordStore {
    async fn insert(&self, collection: &str, record: Record) -> Result<Record, DomainError> {
        let mut collections = self.collections.write().map_err(|e| {
            DomainError::storage(format!("Failed to acquire write lock: {}", e))
        })?;

        let records = collections.entry(collection.to_string()).or_default();

        if let Some(id) = record.get("id") {
            if has_id(records, id) {
                return Err(DomainError::conflict(format!(
                    "Record with id {} already exists in '{}'",
                    id, collection
                )));
            }
        }

        records.push(record.clone());
        Ok(record)
    }

    async fn insert_many(
        &self,
        collection: &str,
        records: Vec<Record>,
    ) -> Result<usize, DomainError> {
        let mut collections = self.collections.write().map_err(|e| {
            DomainError::storage(format!("Failed to acquire write lock: {}", e))
        })?;

        let existing = collections.entry(collection.to_string()).or_default();

        // All or nothing, like a single multi-row INSERT
        for (index, record) in records.iter().enumerate() {
            if let Some(id) = record.get("id") {
                if has_id(existing, id) || has_id(&records[..index], id) {
                    return Err(DomainError::conflict(format!(
                        "Record with id {} already exists in '{}'",
                        id, collection
                    )));
                }
            }
        }

        let count = records.len();
        existing.extend(records);
        Ok(count)
    }

    async fn find_one(
        &self,
        collection: &str,
        filter: &Filter,
    ) -> Result<Option<Record>, DomainError> {
        let collections = self.collections.read().map_err(|e| {
            DomainError::storage(format!("Failed to acquire read lock: {}", e))
        })?;

        Ok(collections
            .get(collection)
            .and_then(|records| records.iter().find(|r| filter.matches(r)).cloned()))
    }

    async fn find_many(
        &self,
        collection: &str,
        filter: &Filter,
        order_by: Option<OrderBy>,
    ) -> Result<Vec<Record>, DomainError> {
        let collections = self.collections.read().map_err(|e| {
            DomainError::storage(format!("Failed to acquire read lock: {}", e))
        })?;

        let mut found: Vec<Record> = collections
            .get(collection)
            .map(|records| {
                records
                    .iter()
                    .filter(|r| filter.matches(r))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();

        if let Some(order) = order_by {
            // Stable sort keeps insertion order among equal keys
            found.sort_by(|a, b| order.compare(a, b));
        }

        Ok(found)
    }

    async fn update(
        &self,
        collection: &str,
        filter: &Filter,
        changes: Record,
    ) -> Result<u64, DomainError> {
        let mut collections = self.collections.write().map_err(|e| {
            DomainError::storage(format!("Failed to acquire write lock: {}", e))
        })?;

        let Some(records) = collections.get_mut(collection) else {
            return Ok(0);
        };

        if let Some(new_id) = changes.get("id") {
            let clash = records
                .iter()
                .any(|r| !filter.matches(r) && r.get("id") == Some(new_id));

            if clash {
                return Err(DomainError::conflict(format!(
                    "Record with id {} already exists in '{}'",
                    new_id, collection
                )));
            }
        }

        let mut matched = 0;

        for record in records.iter_mut().filter(|r| filter.matches(r)) {
            for (field, value) in &changes {
                record.insert(field.clone(), value.clone());
            }
            matched += 1;
        }

        Ok(matched)
    }

    async fn delete(&self, collection: &str, filter: &Filter) -> Result<u64, DomainError> {
        let mut collections = self.collections.write().map_err(|e| {
            DomainError::storage(format!("Failed to acquire write lock: {}", e))
        })?;

        let Some(records) = collections.get_mut(collection) else {
            return Ok(0);
        };

        let before = records.len();
        records.retain(|r| !filter.matches(r));

        Ok((before - records.len()) as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> Record {
        value.as_object().cloned().unwrap()
    }

    #[tokio::test]
    async fn test_insert_and_find_one() {
        let store = InMemoryRecordStore::new();
        store
            .insert("teams", record(json!({"id": "2501", "name": "Alpha"})))
            .await
            .unwrap();

        let found = store
            .find_one("teams", &Filter::by("id", "2501"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.get("name"), Some(&json!("Alpha")));

        let missing = store.find_one("teams", &Filter::by("id", "9")).await.unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn test_insert_duplicate_id_conflicts() {
        let store = InMemoryRecordStore::new();
        store
            .insert("teams", record(json!({"id": "2501"})))
            .await
            .unwrap();

        let result = store.insert("teams", record(json!({"id": "2501"}))).await;
        assert!(matches!(result, Err(DomainError::Conflict { .. })));

        // Same id in another collection is fine
        store
            .insert("users", record(json!({"id": "2501"})))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_records_without_id_are_not_unique() {
        let store = InMemoryRecordStore::new();
        let member = record(json!({"team_id": "2501", "name": "Bob"}));

        store.insert("team_members", member.clone()).await.unwrap();
        store.insert("team_members", member).await.unwrap();

        assert_eq!(store.len("team_members").unwrap(), 2);
    }

    #[tokio::test]
    async fn test_insert_many_is_all_or_nothing() {
        let store = InMemoryRecordStore::new();
        store
            .insert("teams", record(json!({"id": "2"})))
            .await
            .unwrap();

        let result = store
            .insert_many(
                "teams",
                vec![record(json!({"id": "1"})), record(json!({"id": "2"}))],
            )
            .await;

        assert!(matches!(result, Err(DomainError::Conflict { .. })));
        assert_eq!(store.len("teams").unwrap(), 1);

        let count = store
            .insert_many(
                "teams",
                vec![record(json!({"id": "3"})), record(json!({"id": "4"}))],
            )
            .await
            .unwrap();
        assert_eq!(count, 2);
        assert_eq!(store.len("teams").unwrap(), 3);
    }

    #[tokio::test]
    async fn test_find_many_filters_and_orders() {
        let store = InMemoryRecordStore::new();
        for (position, name) in [(1, "Cid"), (0, "Bob"), (2, "Dee")] {
            store
                .insert(
                    "team_members",
                    record(json!({"team_id": "2501", "position": position, "name": name})),
                )
                .await
                .unwrap();
        }
        store
            .insert(
                "team_members",
                record(json!({"team_id": "2502", "position": 0, "name": "Eve"})),
            )
            .await
            .unwrap();

        let unordered = store
            .find_many("team_members", &Filter::by("team_id", "2501"), None)
            .await
            .unwrap();
        let names: Vec<_> = unordered.iter().map(|r| r["name"].clone()).collect();
        assert_eq!(names, vec![json!("Cid"), json!("Bob"), json!("Dee")]);

        let ordered = store
            .find_many(
                "team_members",
                &Filter::by("team_id", "2501"),
                Some(OrderBy::asc("position")),
            )
            .await
            .unwrap();
        let names: Vec<_> = ordered.iter().map(|r| r["name"].clone()).collect();
        assert_eq!(names, vec![json!("Bob"), json!("Cid"), json!("Dee")]);
    }

    #[tokio::test]
    async fn test_find_many_unknown_collection_is_empty() {
        let store = InMemoryRecordStore::new();
        let found = store
            .find_many("nothing", &Filter::new(), None)
            .await
            .unwrap();
        assert!(found.is_empty());
    }

    #[tokio::test]
    async fn test_update_merges_fields() {
        let store = InMemoryRecordStore::new();
        store
            .insert(
                "food_status",
                record(json!({"team_id": "2501", "lunch": "valid", "dinner": "invalid"})),
            )
            .await
            .unwrap();

        let matched = store
            .update(
                "food_status",
                &Filter::by("team_id", "2501"),
                record(json!({"dinner": "valid"})),
            )
            .await
            .unwrap();
        assert_eq!(matched, 1);

        let updated = store
            .find_one("food_status", &Filter::by("team_id", "2501"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated["lunch"], json!("valid"));
        assert_eq!(updated["dinner"], json!("valid"));
    }

    #[tokio::test]
    async fn test_update_no_match() {
        let store = InMemoryRecordStore::new();
        let matched = store
            .update("teams", &Filter::by("id", "1"), record(json!({"name": "x"})))
            .await
            .unwrap();
        assert_eq!(matched, 0);
    }

    #[tokio::test]
    async fn test_update_to_existing_id_conflicts() {
        let store = InMemoryRecordStore::new();
        store.insert("teams", record(json!({"id": "1"}))).await.unwrap();
        store.insert("teams", record(json!({"id": "2"}))).await.unwrap();

        let result = store
            .update("teams", &Filter::by("id", "2"), record(json!({"id": "1"})))
            .await;
        assert!(matches!(result, Err(DomainError::Conflict { .. })));
    }

    #[tokio::test]
    async fn test_delete() {
        let store = InMemoryRecordStore::new();
        for name in ["Bob", "Cid"] {
            store
                .insert("team_members", record(json!({"team_id": "2501", "name": name})))
                .await
                .unwrap();
        }

        let removed = store
            .delete("team_members", &Filter::by("team_id", "2501"))
            .await
            .unwrap();
        assert_eq!(removed, 2);

        let removed = store
            .delete("team_members", &Filter::by("team_id", "2501"))
            .await
            .unwrap();
        assert_eq!(removed, 0);
    }
}
