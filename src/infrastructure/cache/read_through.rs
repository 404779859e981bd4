//! Read-through value cache with explicit lifecycle states

use tokio::sync::RwLock;

/// Lifecycle of a cached value
#[derive(Debug, Clone, PartialEq)]
pub enum CacheState<T> {
    /// Never filled
    Cold,
    /// Holds a value that reflects every write seen so far
    Warm(T),
    /// Was filled once, dropped by a write
    Invalidated,
}

#[derive(Debug)]
struct Slot<T> {
    state: CacheState<T>,
    generation: u64,
}

/// Single-value read-through cache.
///
/// Readers take a generation ticket before loading and hand it back to
/// [`ReadThroughCache::fill`]; a fill whose ticket predates the latest
/// invalidation is discarded, so a slow load can never resurrect stale data.
/// There is no time-based expiry.
#[derive(Debug)]
pub struct ReadThroughCache<T> {
    slot: RwLock<Slot<T>>,
}

impl<T: Clone> Default for ReadThroughCache<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> ReadThroughCache<T> {
    pub fn new() -> Self {
        Self {
            slot: RwLock::new(Slot {
                state: CacheState::Cold,
                generation: 0,
            }),
        }
    }

    /// An owned copy of the cached value, if warm
    pub async fn get(&self) -> Option<T> {
        match &self.slot.read().await.state {
            CacheState::Warm(value) => Some(value.clone()),
            CacheState::Cold | CacheState::Invalidated => None,
        }
    }

    /// Current generation; take this before loading from the source
    pub async fn generation(&self) -> u64 {
        self.slot.read().await.generation
    }

    /// Store a loaded value if no invalidation happened since `generation`.
    /// Returns whether the value was kept.
    pub async fn fill(&self, generation: u64, value: T) -> bool {
        let mut slot = self.slot.write().await;

        if slot.generation != generation {
            return false;
        }

        slot.state = CacheState::Warm(value);
        true
    }

    /// Drop the cached value and void any in-flight fill
    pub async fn invalidate(&self) {
        let mut slot = self.slot.write().await;
        slot.generation += 1;

        if !matches!(slot.state, CacheState::Cold) {
            slot.state = CacheState::Invalidated;
        }
    }

    pub async fn state(&self) -> CacheState<T> {
        self.slot.read().await.state.clone()
    }
}
