//! Background Worker Pool
//!
//! Threads that drain a [`LookAheadCache`] and fill it with produced payloads.
//!
//! # Workflow
//!
//! ```text
//! ┌──────────────┐  wait_and_pop   ┌──────────────┐  produce   ┌──────────────┐
//! │ LookAheadCache│───────────────▶│    Worker    │───────────▶│   Producer   │
//! │              │◀───────────────│  (thread N)  │◀───────────│              │
//! └──────────────┘       put      └──────────────┘ (weight,data)└──────────────┘
//! ```
//!
//! Workers exit when the cache is terminated. Units the producer declines stay
//! pending in the store until the next job is adopted.

use std::fmt;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use tracing::{debug, error, info, instrument, warn};

use crate::cache::{LookAheadCache, PriorityStore, WorkCursor};
use crate::config::PrefetchConfig;
use crate::error::{Error, Result};

/// Computes the payload of a work unit
pub trait Producer<Id, W, D>: Send + Sync {
    /// Produce `id`, returning its weight and payload, or `None` to skip it
    fn produce(&self, id: &Id) -> Option<(W, D)>;
}

impl<F, Id, W, D> Producer<Id, W, D> for F
where
    F: Fn(&Id) -> Option<(W, D)> + Send + Sync,
{
    fn produce(&self, id: &Id) -> Option<(W, D)> {
        self(id)
    }
}

/// Pool of named threads draining one look-ahead cache
pub struct WorkerPool<S, C>
where
    S: PriorityStore,
    C: WorkCursor<Id = S::Id>,
{
    cache: Arc<LookAheadCache<S, C>>,
    workers: Vec<(String, JoinHandle<u64>)>,
}

impl<S, C> WorkerPool<S, C>
where
    S: PriorityStore + 'static,
    C: WorkCursor<Id = S::Id> + 'static,
{
    /// Start `config.workers` threads draining `cache` through `producer`
    pub fn spawn<P>(
        cache: Arc<LookAheadCache<S, C>>,
        config: &PrefetchConfig,
        producer: P,
    ) -> Result<Self>
    where
        P: Producer<S::Id, S::Weight, S::Data> + 'static,
    {
        config.validate()?;

        let producer = Arc::new(producer);
        let mut pool = Self {
            cache,
            workers: Vec::with_capacity(config.workers),
        };

        for index in 0..config.workers {
            let name = config.worker_name(index);
            let cache = Arc::clone(&pool.cache);
            let producer = Arc::clone(&producer);
            let worker_name = name.clone();

            // on failure the pool drops, which stops the threads already running
            let handle = thread::Builder::new()
                .name(name.clone())
                .spawn(move || run_worker(&worker_name, &cache, producer.as_ref()))?;
            pool.workers.push((name, handle));
        }

        info!(workers = config.workers, "Worker pool started");
        Ok(pool)
    }
}

impl<S, C> WorkerPool<S, C>
where
    S: PriorityStore,
    C: WorkCursor<Id = S::Id>,
{
    /// The cache being drained
    pub fn cache(&self) -> &Arc<LookAheadCache<S, C>> {
        &self.cache
    }

    /// Number of running workers
    pub fn len(&self) -> usize {
        self.workers.len()
    }

    /// Check if the pool has no workers
    pub fn is_empty(&self) -> bool {
        self.workers.is_empty()
    }

    /// Terminate the cache and join every worker.
    ///
    /// Returns the number of units stored by all workers.
    pub fn shutdown(mut self) -> Result<u64> {
        self.stop()
    }

    fn stop(&mut self) -> Result<u64> {
        self.cache.terminate(true);

        let mut produced = 0;
        let mut panicked = None;
        for (name, handle) in self.workers.drain(..) {
            match handle.join() {
                Ok(count) => produced += count,
                Err(_) => {
                    error!(worker = %name, "Worker panicked");
                    panicked.get_or_insert(name);
                }
            }
        }

        match panicked {
            Some(name) => Err(Error::WorkerPanicked(name)),
            None => {
                info!(produced, "Worker pool stopped");
                Ok(produced)
            }
        }
    }
}

impl<S, C> fmt::Debug for WorkerPool<S, C>
where
    S: PriorityStore,
    C: WorkCursor<Id = S::Id>,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.workers.iter().map(|(name, _)| name.as_str()).collect();
        f.debug_struct("WorkerPool")
            .field("workers", &names)
            .field("terminated", &self.cache.is_terminated())
            .finish()
    }
}

impl<S, C> Drop for WorkerPool<S, C>
where
    S: PriorityStore,
    C: WorkCursor<Id = S::Id>,
{
    fn drop(&mut self) {
        if !self.workers.is_empty() {
            let _ = self.stop();
        }
    }
}

#[instrument(level = "debug", skip(cache, producer))]
fn run_worker<S, C, P>(name: &str, cache: &LookAheadCache<S, C>, producer: &P) -> u64
where
    S: PriorityStore,
    C: WorkCursor<Id = S::Id>,
    P: Producer<S::Id, S::Weight, S::Data> + ?Sized,
{
    debug!(worker = name, "Worker started");
    let mut produced = 0;

    loop {
        let unit = match cache.wait_and_pop() {
            Ok(unit) => unit,
            Err(Error::Terminated) => break,
            Err(e) => {
                error!(worker = name, error = %e, "Drain failed");
                break;
            }
        };

        let Some((weight, data)) = producer.produce(&unit) else {
            debug!(worker = name, ?unit, "Producer declined unit");
            continue;
        };

        if cache.put(unit.clone(), weight, data) {
            produced += 1;
        } else {
            warn!(worker = name, ?unit, ?weight, "Cache refused produced unit");
        }
    }

    debug!(worker = name, produced, "Worker stopped");
    produced
}

// =============================================================================
// Tests
// =============================================================================
