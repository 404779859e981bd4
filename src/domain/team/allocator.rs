//! Team identifier allocation

use async_trait::async_trait;

use super::entity::TeamId;

/// Issues team identifiers.
///
/// Implementations guarantee ids never repeat within one instance. They do not
/// guarantee uniqueness across processes unless backed by a store-side sequence.
#[async_trait]
pub trait TeamIdAllocator: Send + Sync + std::fmt::Debug {
    /// Next identifier in the sequence
    async fn next_id(&self) -> TeamId;

    /// Forget the synced position so the next allocation rescans the store
    async fn invalidate(&self);
}
