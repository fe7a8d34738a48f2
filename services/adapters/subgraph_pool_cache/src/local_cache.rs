//! Process-local pool cache with fixed TTL
//!
//! Entries are shared, never copied: readers get the same `Arc` the writer
//! stored and must treat it as immutable. Expiry is lazy and checked on read.
//!
//! A slot (one local key) holds at most one collection per record type, so
//! providers with different schemas on the same chain share the slot without
//! evicting each other. Writers of the same record type overwrite each other.
//! Slots are mutated under DashMap's shard lock, so a concurrent reader sees
//! either the old collection or the new one.

use dashmap::DashMap;
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::time::{Duration, Instant};
use tracing::debug;

/// How long a cached pool collection stays valid after it is written
pub const DEFAULT_POOL_CACHE_TTL: Duration = Duration::from_secs(240);

struct CacheEntry {
    value: Arc<dyn Any + Send + Sync>,
    inserted_at: Instant,
}

impl CacheEntry {
    fn is_expired(&self, ttl: Duration) -> bool {
        self.inserted_at.elapsed() >= ttl
    }
}

type Slot = HashMap<TypeId, CacheEntry>;

/// Thread-safe TTL cache of pool collections keyed by local cache key
pub struct LocalPoolCache {
    slots: DashMap<String, Slot>,
    ttl: Duration,
}

impl Default for LocalPoolCache {
    fn default() -> Self {
        Self::new()
    }
}

impl LocalPoolCache {
    /// Create a cache with the standard 240 second TTL
    pub fn new() -> Self {
        Self::with_ttl(DEFAULT_POOL_CACHE_TTL)
    }

    /// Create a cache whose entries all share `ttl`
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            slots: DashMap::new(),
            ttl,
        }
    }

    /// Get the live collection of `T` stored at `key`.
    ///
    /// Returns `None` when nothing of type `T` was stored there or it expired.
    pub fn get<T: Send + Sync + 'static>(&self, key: &str) -> Option<Arc<Vec<T>>> {
        let type_id = TypeId::of::<Vec<T>>();

        let value = {
            let slot = self.slots.get(key)?;
            let entry = slot.get(&type_id)?;
            if entry.is_expired(self.ttl) {
                None
            } else {
                Some(Arc::clone(&entry.value))
            }
        };

        let Some(value) = value else {
            self.evict_expired(key, type_id);
            debug!(key, "Local pool cache entry expired");
            return None;
        };

        // TypeId matched, so the downcast cannot fail
        value.downcast::<Vec<T>>().ok()
    }

    /// Store `pools` at `key`, replacing any prior collection of `T` there and
    /// restarting its TTL. Collections of other record types are kept.
    pub fn set<T: Send + Sync + 'static>(&self, key: &str, pools: Arc<Vec<T>>) {
        self.slots.entry(key.to_string()).or_default().insert(
            TypeId::of::<Vec<T>>(),
            CacheEntry {
                value: pools,
                inserted_at: Instant::now(),
            },
        );
    }

    /// Number of stored collections across all slots, expired ones included
    /// until they are read
    pub fn len(&self) -> usize {
        self.slots.iter().map(|slot| slot.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    fn evict_expired(&self, key: &str, type_id: TypeId) {
        // A writer may have refreshed the entry since it was read
        if let Some(mut slot) = self.slots.get_mut(key) {
            if slot.get(&type_id).is_some_and(|entry| entry.is_expired(self.ttl)) {
                slot.remove(&type_id);
            }
        }
        self.slots.remove_if(key, |_, slot| slot.is_empty());
    }
}
