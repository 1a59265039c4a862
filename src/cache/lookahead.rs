//! Look-Ahead Cache
//!
//! Couples a bounded priority store with a job mailbox so that one consumer
//! role can drain the active job against the cache while any number of
//! threads read and write the cache and replace the job.
//!
//! # Drain State Machine
//!
//! ```text
//!                 job available
//!   AwaitingJob ───────────────▶ Draining ──Skip──┐
//!        ▲  │                     │   ▲           │
//!        │  │ terminated          │   └───────────┘
//!        │  ▼                     │
//!        │ Cancelled              ├──Ready──▶ Yielding(id)
//!        │                        │
//!        └─────────Full───────────┘
//! ```
//!
//! # Locking
//!
//! - The pop lock owns the active cursor and is held for a whole
//!   [`LookAheadCache::wait_and_pop`] call
//! - The store lock is taken per accessor call and once per drain iteration
//! - Order is always pop lock, then store lock; accessors never take the
//!   pop lock

use std::fmt::Debug;
use std::hash::Hash;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, trace};

use super::cursor::WorkCursor;
use super::mailbox::JobMailbox;
use super::metrics::LookAheadMetrics;
use super::store::{Classification, PriorityCache, PriorityStore};
use super::weight::Weight;
use crate::error::{Error, Result};

/// Bounded cache with a look-ahead job consumer
pub struct LookAheadCache<S, C> {
    /// Pop lock; guards the job currently being drained
    active: Mutex<Option<C>>,
    /// Store lock
    store: Mutex<S>,
    mailbox: JobMailbox<C>,
    metrics: Arc<LookAheadMetrics>,
}

impl<K, W, V, C> LookAheadCache<PriorityCache<K, W, V>, C>
where
    K: Eq + Hash + Clone + Debug + Send,
    W: Weight,
    V: Clone + Send,
    C: WorkCursor<Id = K>,
{
    /// Create a look-ahead cache backed by a [`PriorityCache`]
    pub fn new(capacity: W) -> Self {
        Self::with_store(PriorityCache::new(capacity))
    }
}

impl<S, C> LookAheadCache<S, C>
where
    S: PriorityStore,
    C: WorkCursor<Id = S::Id>,
{
    /// Create a look-ahead cache around an existing store
    pub fn with_store(store: S) -> Self {
        Self {
            active: Mutex::new(None),
            store: Mutex::new(store),
            mailbox: JobMailbox::new(),
            metrics: Arc::new(LookAheadMetrics::new()),
        }
    }

    // =========================================================================
    // Cache accessors
    // =========================================================================

    /// Reconfigure capacity
    pub fn set_cache_size(&self, size: S::Weight) {
        self.store.lock().set_capacity(size);
        debug!(capacity = ?size, "Cache size updated");
    }

    /// Configured capacity
    pub fn capacity(&self) -> S::Weight {
        self.store.lock().capacity()
    }

    /// Snapshot of every cached id together with the current total weight
    pub fn dump_keys(&self) -> (Vec<S::Id>, S::Weight) {
        let store = self.store.lock();
        (store.keys(), store.current_weight())
    }

    /// Cached payload for `id`
    pub fn get(&self, id: &S::Id) -> Option<S::Data> {
        let data = self.store.lock().lookup(id);
        self.metrics.record_lookup(data.is_some());
        data
    }

    /// Insert or update an entry. Returns `false` if the store refused it.
    pub fn put(&self, id: S::Id, weight: S::Weight, data: S::Data) -> bool {
        let accepted = self.store.lock().insert(id, weight, data);
        self.metrics.record_put(accepted);
        accepted
    }

    /// Run `f` against the store under the store lock.
    ///
    /// `f` must not call back into this cache: the store lock is not
    /// reentrant and the call would deadlock.
    pub fn inspect<R>(&self, f: impl FnOnce(&S) -> R) -> R {
        f(&self.store.lock())
    }

    /// Shared metrics collector
    pub fn metrics(&self) -> &Arc<LookAheadMetrics> {
        &self.metrics
    }

    // =========================================================================
    // Job protocol
    // =========================================================================

    /// Publish a job, replacing any job the consumer has not picked up yet.
    ///
    /// Never blocks. Returns `true` if a pending job was replaced.
    pub fn push_job(&self, job: C) -> bool {
        let replaced = self.mailbox.publish(job);
        self.metrics.record_job_published(replaced);
        trace!(replaced, "Job published");
        replaced
    }

    /// Set or clear the shutdown flag, waking any blocked consumer
    pub fn terminate(&self, value: bool) {
        self.mailbox.terminate(value);
        debug!(terminated = value, "Termination flag updated");
    }

    /// Check if the shutdown flag is set
    pub fn is_terminated(&self) -> bool {
        self.mailbox.is_terminated()
    }

    // =========================================================================
    // Consumer
    // =========================================================================

    /// Drain the active job until a unit needs production and return it.
    ///
    /// Units the store already satisfies are skipped. When the store reports
    /// saturation the rest of the active job is dropped and the call waits for
    /// the next job. Blocks while no job is available.
    ///
    /// Returns [`Error::Terminated`] once [`terminate`](Self::terminate) has
    /// been called.
    pub fn wait_and_pop(&self) -> Result<S::Id> {
        let mut active = self.active.lock();

        loop {
            if self.refresh_job(&mut active)? {
                self.metrics.record_job_adopted();
                self.store.lock().discard_pending();
                debug!("Adopted new job");
            }

            // refresh_job leaves a non-empty cursor behind
            let Some(unit) = active.as_mut().and_then(|job| job.next_unit()) else {
                continue;
            };

            let verdict = self.store.lock().classify(&unit);
            match verdict {
                Classification::Full => {
                    if let Some(job) = active.as_mut() {
                        job.clear();
                    }
                    self.metrics.record_job_abandoned();
                    debug!(?unit, "Cache is full, abandoning current job");
                }
                Classification::Skip => {
                    self.metrics.record_unit_skipped();
                    trace!(?unit, "Unit already satisfied");
                }
                Classification::Ready => {
                    self.metrics.record_unit_ready();
                    trace!(?unit, "Serving unit");
                    return Ok(unit);
                }
            }
        }
    }

    /// Make sure a non-empty job is active, blocking on the mailbox if needed.
    ///
    /// A pending job always pre-empts the active one. Returns whether a new
    /// job was adopted.
    fn refresh_job(&self, active: &mut Option<C>) -> Result<bool> {
        if self.mailbox.is_terminated() {
            return Err(Error::Terminated);
        }

        let mut updated = false;
        if let Some(job) = self.mailbox.try_take() {
            *active = Some(job);
            updated = true;
        }

        while active.as_ref().map_or(true, |job| job.is_empty()) {
            trace!("Waiting for next job");
            *active = Some(self.mailbox.take()?);
            updated = true;
        }

        Ok(updated)
    }
}

// =============================================================================
// Tests
// =============================================================================
