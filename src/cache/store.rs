//! Bounded Priority Store
//!
//! Capacity-limited key/value store used by the look-ahead cache.
//!
//! # Design
//!
//! - Entries are split into a **hot** set (touched by the job currently being
//!   drained) and a **cold** set (everything else)
//! - Both sets are ordered by a monotonically increasing access tick
//! - Eviction takes the oldest cold entry first, then the oldest hot entry
//! - The store reports `Full` once the hot set alone fills the capacity: any
//!   further production would evict something the current job still needs

use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt::Debug;
use std::hash::Hash;

use tracing::trace;

use super::weight::Weight;

/// Outcome of classifying one work unit against the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// Store is saturated: abandon the remainder of the active job
    Full,
    /// Unit is already satisfied: keep draining
    Skip,
    /// Unit needs production: hand it to the caller
    Ready,
}

/// Contract the look-ahead orchestrator relies on.
///
/// Implementations are always accessed under a single exclusive lock, so
/// methods take `&mut self` freely.
pub trait PriorityStore: Send {
    /// Work unit identifier
    type Id: Clone + Debug + Send;
    /// Capacity accounting unit
    type Weight: Weight;
    /// Cached payload
    type Data: Clone;

    /// Configured capacity
    fn capacity(&self) -> Self::Weight;

    /// Reconfigure capacity, evicting when shrinking below current usage
    fn set_capacity(&mut self, capacity: Self::Weight);

    /// Cached payload for `id`, if any
    fn lookup(&self, id: &Self::Id) -> Option<Self::Data>;

    /// Insert or update an entry. Returns `false` when refused.
    fn insert(&mut self, id: Self::Id, weight: Self::Weight, data: Self::Data) -> bool;

    /// Snapshot of every cached id
    fn keys(&self) -> Vec<Self::Id>;

    /// Sum of the weights of all cached entries
    fn current_weight(&self) -> Self::Weight;

    /// Touch `id` on behalf of the active job and decide what the drain
    /// loop should do with it
    fn classify(&mut self, id: &Self::Id) -> Classification;

    /// Forget speculative state tied to a superseded job
    fn discard_pending(&mut self);
}

/// Store counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreStats {
    /// Entries removed to make room
    pub evictions: u64,
    /// Inserts refused because the entry alone exceeds capacity
    pub refused: u64,
}

struct Entry<W, V> {
    weight: W,
    data: V,
    tick: u64,
    hot: bool,
}

/// Default [`PriorityStore`] implementation.
pub struct PriorityCache<K, W, V> {
    capacity: W,
    weight: W,
    hot_weight: W,
    entries: HashMap<K, Entry<W, V>>,
    cold: BTreeMap<u64, K>,
    hot: BTreeMap<u64, K>,
    /// Units handed out as `Ready` for the current job and not yet inserted
    pending: HashSet<K>,
    clock: u64,
    stats: StoreStats,
}

impl<K, W, V> PriorityCache<K, W, V>
where
    K: Eq + Hash + Clone,
    W: Weight,
{
    /// Create an empty store with the given capacity
    pub fn new(capacity: W) -> Self {
        Self {
            capacity,
            weight: W::zero(),
            hot_weight: W::zero(),
            entries: HashMap::new(),
            cold: BTreeMap::new(),
            hot: BTreeMap::new(),
            pending: HashSet::new(),
            clock: 0,
            stats: StoreStats::default(),
        }
    }

    /// Number of cached entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the store is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Check if `id` is cached
    pub fn contains(&self, id: &K) -> bool {
        self.entries.contains_key(id)
    }

    /// Weight held by entries touched by the current job
    pub fn hot_weight(&self) -> W {
        self.hot_weight
    }

    /// Check if `id` was handed out and is awaiting insertion
    pub fn is_pending(&self, id: &K) -> bool {
        self.pending.contains(id)
    }

    /// Number of units awaiting insertion
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Store counters
    pub fn stats(&self) -> StoreStats {
        self.stats
    }

    /// Remove an entry, returning its payload
    pub fn remove(&mut self, id: &K) -> Option<V> {
        self.unlink(id).map(|entry| entry.data)
    }

    fn next_tick(&mut self) -> u64 {
        self.clock += 1;
        self.clock
    }

    /// Move `id` to the hot set with a fresh tick
    fn promote(&mut self, id: &K) {
        let tick = self.next_tick();
        let Some(entry) = self.entries.get_mut(id) else {
            return;
        };

        if entry.hot {
            self.hot.remove(&entry.tick);
        } else {
            self.cold.remove(&entry.tick);
            entry.hot = true;
            self.hot_weight = self.hot_weight + entry.weight;
        }

        entry.tick = tick;
        self.hot.insert(tick, id.clone());
    }

    fn unlink(&mut self, id: &K) -> Option<Entry<W, V>> {
        let entry = self.entries.remove(id)?;
        self.weight = self.weight - entry.weight;

        if entry.hot {
            self.hot.remove(&entry.tick);
            self.hot_weight = self.hot_weight - entry.weight;
        } else {
            self.cold.remove(&entry.tick);
        }

        Some(entry)
    }

    /// Evict the least valuable entry. Returns `false` if the store is empty.
    fn evict_one(&mut self) -> bool {
        let victim = match self.cold.first_key_value().or_else(|| self.hot.first_key_value()) {
            Some((_, id)) => id.clone(),
            None => return false,
        };

        self.unlink(&victim);
        self.stats.evictions += 1;
        trace!(weight = ?self.weight, hot_weight = ?self.hot_weight, "Evicted entry");
        true
    }

    /// Evict until the total weight is at most `limit`
    fn evict_until(&mut self, limit: W) {
        while self.weight > limit {
            if !self.evict_one() {
                break;
            }
        }
    }
}

impl<K, W, V> PriorityStore for PriorityCache<K, W, V>
where
    K: Eq + Hash + Clone + Debug + Send,
    W: Weight,
    V: Clone + Send,
{
    type Id = K;
    type Weight = W;
    type Data = V;

    fn capacity(&self) -> W {
        self.capacity
    }

    fn set_capacity(&mut self, capacity: W) {
        self.capacity = capacity;
        self.evict_until(capacity);
    }

    fn lookup(&self, id: &K) -> Option<V> {
        self.entries.get(id).map(|entry| entry.data.clone())
    }

    fn insert(&mut self, id: K, weight: W, data: V) -> bool {
        if weight > self.capacity {
            self.pending.remove(&id);
            self.stats.refused += 1;
            return false;
        }

        let was_hot = self.unlink(&id).is_some_and(|old| old.hot);
        let was_pending = self.pending.remove(&id);
        let hot = was_hot || was_pending;

        self.evict_until(self.capacity - weight);

        let tick = self.next_tick();
        if hot {
            self.hot.insert(tick, id.clone());
            self.hot_weight = self.hot_weight + weight;
        } else {
            self.cold.insert(tick, id.clone());
        }
        self.weight = self.weight + weight;
        self.entries.insert(
            id,
            Entry {
                weight,
                data,
                tick,
                hot,
            },
        );

        true
    }

    /// Ids from least to most recently touched, cold entries first
    fn keys(&self) -> Vec<K> {
        self.cold.values().chain(self.hot.values()).cloned().collect()
    }

    fn current_weight(&self) -> W {
        self.weight
    }

    fn classify(&mut self, id: &K) -> Classification {
        if self.entries.contains_key(id) {
            self.promote(id);
            return Classification::Skip;
        }

        if self.pending.contains(id) {
            return Classification::Skip;
        }

        if self.hot_weight >= self.capacity {
            return Classification::Full;
        }

        self.pending.insert(id.clone());
        Classification::Ready
    }

    fn discard_pending(&mut self) {
        self.pending.clear();

        for (tick, id) in std::mem::take(&mut self.hot) {
            if let Some(entry) = self.entries.get_mut(&id) {
                entry.hot = false;
            }
            self.cold.insert(tick, id);
        }
        self.hot_weight = W::zero();
    }
}

// =============================================================================
// Tests
// =============================================================================
