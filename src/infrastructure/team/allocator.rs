//! Max-scan team id allocator

use std::fmt::Debug;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::domain::storage::{CollectionRecord, Filter, RecordStore};
use crate::domain::team::{TeamId, TeamIdAllocator};
use crate::domain::DomainError;

use super::records::TeamRecord;

/// First issued id is `DEFAULT_TEAM_ID_OFFSET + 1`
pub const DEFAULT_TEAM_ID_OFFSET: u64 = 2500;

#[derive(Debug)]
struct AllocatorState {
    last: u64,
    synced: bool,
}

/// Allocates sequential numeric team ids.
///
/// On the first call (and after [`TeamIdAllocator::invalidate`]) it scans the
/// `teams` collection for the highest numeric id and resumes after it. A failed
/// scan is logged and allocation continues from the last known value; the
/// scan is retried on the next call.
///
/// Read-then-increment is not atomic across processes. Two instances can hand
/// out the same id; the store's uniqueness guard turns that into a conflict.
pub struct MaxScanAllocator {
    store: Arc<dyn RecordStore>,
    offset: u64,
    state: Mutex<AllocatorState>,
}

impl Debug for MaxScanAllocator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MaxScanAllocator")
            .field("offset", &self.offset)
            .finish()
    }
}

impl MaxScanAllocator {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self::with_offset(store, DEFAULT_TEAM_ID_OFFSET)
    }

    pub fn with_offset(store: Arc<dyn RecordStore>, offset: u64) -> Self {
        Self {
            store,
            offset,
            state: Mutex::new(AllocatorState {
                last: offset,
                synced: false,
            }),
        }
    }

    /// Highest numeric id currently stored; non-numeric ids are ignored
    async fn scan_max(&self) -> Result<u64, DomainError> {
        let records = self
            .store
            .find_many(TeamRecord::COLLECTION, &Filter::new(), None)
            .await?;

        Ok(records
            .iter()
            .filter_map(|r| r.get("id").and_then(|v| v.as_str()))
            .filter_map(|id| id.parse::<u64>().ok())
            .max()
            .unwrap_or(0))
    }
}

#[async_trait]
impl TeamIdAllocator for MaxScanAllocator {
    async fn next_id(&self) -> TeamId {
        let mut state = self.state.lock().await;

        if !state.synced {
            match self.scan_max().await {
                Ok(max) => {
                    state.last = state.last.max(max).max(self.offset);
                    state.synced = true;
                    debug!(last = state.last, "Team id allocator synced");
                }
                Err(e) => {
                    warn!(
                        error = %e,
                        last = state.last,
                        "Team id scan failed, continuing from last known id"
                    );
                }
            }
        }

        state.last += 1;
        TeamId::from_number(state.last)
    }

    async fn invalidate(&self) {
        self.state.lock().await.synced = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::storage::MockRecordStore;
    use crate::infrastructure::storage::InMemoryRecordStore;
    use serde_json::json;

    fn team_record(id: &str) -> crate::domain::storage::Record {
        json!({"id": id, "name": "T", "leader": "L", "created_at": "2024-03-01T10:00:00Z"})
            .as_object()
            .cloned()
            .unwrap()
    }

    #[tokio::test]
    async fn test_first_id_on_empty_store() {
        let allocator = MaxScanAllocator::new(Arc::new(InMemoryRecordStore::new()));

        assert_eq!(allocator.next_id().await.as_str(), "2501");
        assert_eq!(allocator.next_id().await.as_str(), "2502");
    }

    #[tokio::test]
    async fn test_resumes_after_stored_max() {
        let store = Arc::new(InMemoryRecordStore::new());
        for id in ["2501", "2507", "legacy", "2503"] {
            store.insert("teams", team_record(id)).await.unwrap();
        }

        let allocator = MaxScanAllocator::new(store);
        assert_eq!(allocator.next_id().await.as_str(), "2508");
    }

    #[tokio::test]
    async fn test_offset_floor() {
        let store = Arc::new(InMemoryRecordStore::new());
        store.insert("teams", team_record("12")).await.unwrap();

        let allocator = MaxScanAllocator::with_offset(store, 100);
        assert_eq!(allocator.next_id().await.as_str(), "101");
    }

    #[tokio::test]
    async fn test_scans_only_once_until_invalidated() {
        let store = Arc::new(InMemoryRecordStore::new());
        let allocator = MaxScanAllocator::new(store.clone());

        assert_eq!(allocator.next_id().await.as_str(), "2501");

        // Written by someone else; not seen while synced
        store.insert("teams", team_record("2600")).await.unwrap();
        assert_eq!(allocator.next_id().await.as_str(), "2502");

        allocator.invalidate().await;
        assert_eq!(allocator.next_id().await.as_str(), "2601");
    }

    #[tokio::test]
    async fn test_invalidate_never_moves_backwards() {
        let store = Arc::new(InMemoryRecordStore::new());
        let allocator = MaxScanAllocator::new(store);

        for _ in 0..3 {
            allocator.next_id().await;
        }
        allocator.invalidate().await;

        // Store is still empty, but 2501..2503 were already issued
        assert_eq!(allocator.next_id().await.as_str(), "2504");
    }

    #[tokio::test]
    async fn test_scan_failure_falls_back_and_retries() {
        let mut store = MockRecordStore::new();
        let mut calls = 0;
        store.expect_find_many().times(2).returning(move |_, _, _| {
            calls += 1;
            if calls == 1 {
                Err(DomainError::storage("backend unavailable"))
            } else {
                Ok(vec![team_record("2550")])
            }
        });

        let allocator = MaxScanAllocator::new(Arc::new(store));

        // Unsynced: continue from the offset
        assert_eq!(allocator.next_id().await.as_str(), "2501");
        // Retry succeeds and jumps past the stored max
        assert_eq!(allocator.next_id().await.as_str(), "2551");
        // Synced: no further scans
        assert_eq!(allocator.next_id().await.as_str(), "2552");
    }

    #[tokio::test]
    async fn test_concurrent_allocations_are_unique() {
        let allocator = Arc::new(MaxScanAllocator::new(Arc::new(InMemoryRecordStore::new())));

        let handles: Vec<_> = (0..20)
            .map(|_| {
                let allocator = allocator.clone();
                tokio::spawn(async move { allocator.next_id().await })
            })
            .collect();

        let mut ids = Vec::new();
        for handle in handles {
            ids.push(handle.await.unwrap().number().unwrap());
        }
        ids.sort_unstable();
        ids.dedup();

        assert_eq!(ids.len(), 20);
        assert_eq!(ids.first(), Some(&2501));
        assert_eq!(ids.last(), Some(&2520));
    }
}
