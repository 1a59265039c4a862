//! LookAhead Integration Tests
//!
//! Exercises the public API across threads:
//! - Job protocol: last push wins, pre-emption, termination
//! - Drain: skip, saturation, one active consumer at a time
//! - Store access: mutual exclusion and capacity under contention
//! - Worker pool driven by range cursors

use std::collections::HashSet;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use assert_matches::assert_matches;
use crossbeam::channel;

use lookahead::{
    Direction, Error, LookAheadCache, PrefetchConfig, PriorityCache, RangeCursor, VecCursor,
    WorkerPool,
};

type UnitCache = LookAheadCache<PriorityCache<u64, u64, u64>, VecCursor<u64>>;
type FrameCache = LookAheadCache<PriorityCache<u64, u64, u64>, RangeCursor>;

const TIMEOUT: Duration = Duration::from_secs(5);

fn wait_until(mut condition: impl FnMut() -> bool) {
    let deadline = Instant::now() + TIMEOUT;
    while !condition() {
        assert!(Instant::now() < deadline, "timed out waiting for condition");
        thread::sleep(Duration::from_millis(2));
    }
}

fn pool_config(workers: usize) -> PrefetchConfig {
    PrefetchConfig {
        capacity: 1,
        workers,
        thread_name: "it-worker".into(),
    }
}

// =============================================================================
// Job Protocol
// =============================================================================

mod job_tests {
    use super::*;

    #[test]
    fn test_last_push_wins_before_consumer_starts() {
        let cache = UnitCache::new(100);

        assert!(!cache.push_job(VecCursor::new([1, 2])));
        assert!(cache.push_job(VecCursor::new([10, 11])));
        assert!(cache.push_job(VecCursor::new([20, 21])));

        assert_eq!(cache.wait_and_pop().unwrap(), 20);
        assert_eq!(cache.wait_and_pop().unwrap(), 21);

        let snapshot = cache.metrics().snapshot();
        assert_eq!(snapshot.jobs_published, 3);
        assert_eq!(snapshot.jobs_replaced, 2);
        assert_eq!(snapshot.jobs_adopted, 1);
    }

    #[test]
    fn test_blocked_consumer_wakes_on_push() {
        let cache = Arc::new(UnitCache::new(100));
        let (tx, rx) = channel::bounded(1);

        let consumer = {
            let cache = Arc::clone(&cache);
            thread::spawn(move || {
                tx.send(cache.wait_and_pop()).unwrap();
            })
        };

        thread::sleep(Duration::from_millis(20));
        assert!(rx.try_recv().is_err());

        cache.push_job(VecCursor::new([7]));
        assert_eq!(rx.recv_timeout(TIMEOUT).unwrap().unwrap(), 7);
        consumer.join().unwrap();
    }

    #[test]
    fn test_new_job_preempts_active_job() {
        let cache = UnitCache::new(100);
        cache.push_job(VecCursor::new(0..10));
        assert_eq!(cache.wait_and_pop().unwrap(), 0);
        assert_eq!(cache.wait_and_pop().unwrap(), 1);

        cache.push_job(VecCursor::new(100..102));
        assert_eq!(cache.wait_and_pop().unwrap(), 100);
        assert_eq!(cache.wait_and_pop().unwrap(), 101);
    }

    #[test]
    fn test_terminate_releases_every_blocked_consumer() {
        let cache = Arc::new(UnitCache::new(100));
        let (tx, rx) = channel::unbounded();

        let consumers: Vec<_> = (0..4)
            .map(|_| {
                let cache = Arc::clone(&cache);
                let tx = tx.clone();
                thread::spawn(move || {
                    tx.send(cache.wait_and_pop()).unwrap();
                })
            })
            .collect();

        thread::sleep(Duration::from_millis(20));
        cache.terminate(true);

        for _ in 0..4 {
            assert_matches!(rx.recv_timeout(TIMEOUT), Ok(Err(Error::Terminated)));
        }
        for consumer in consumers {
            consumer.join().unwrap();
        }
    }

    #[test]
    fn test_terminate_wins_over_pending_job() {
        let cache = UnitCache::new(100);
        cache.push_job(VecCursor::new([1]));
        cache.terminate(true);
        assert_matches!(cache.wait_and_pop(), Err(Error::Terminated));

        cache.terminate(false);
        assert_eq!(cache.wait_and_pop().unwrap(), 1);
    }
}

// =============================================================================
// Drain
// =============================================================================

mod drain_tests {
    use super::*;

    #[test]
    fn test_cached_units_are_skipped() {
        let cache = UnitCache::new(100);
        cache.put(0, 1, 0);
        cache.put(2, 1, 2);

        cache.push_job(VecCursor::new(0..4));
        assert_eq!(cache.wait_and_pop().unwrap(), 1);
        assert_eq!(cache.wait_and_pop().unwrap(), 3);
        assert_eq!(cache.metrics().snapshot().units_skipped, 2);
    }

    #[test]
    fn test_concurrent_consumers_serve_each_unit_once() {
        let cache = Arc::new(UnitCache::new(10_000));
        cache.push_job(VecCursor::new(0..500));

        let (tx, rx) = channel::unbounded();
        let consumers: Vec<_> = (0..4)
            .map(|_| {
                let cache = Arc::clone(&cache);
                let tx = tx.clone();
                thread::spawn(move || {
                    let mut served = Vec::new();
                    while let Ok(unit) = cache.wait_and_pop() {
                        served.push(unit);
                    }
                    tx.send(served).unwrap();
                })
            })
            .collect();
        drop(tx);

        wait_until(|| cache.inspect(|store| store.pending_len()) == 500);
        cache.terminate(true);
        for consumer in consumers {
            consumer.join().unwrap();
        }

        let mut all = Vec::new();
        for served in rx.iter() {
            // each consumer sees the job in order
            assert!(served.windows(2).all(|pair| pair[0] < pair[1]));
            all.extend(served);
        }
        all.sort_unstable();
        assert_eq!(all, (0..500).collect::<Vec<_>>());
    }

    #[test]
    fn test_balanced_job_serves_origin_first() {
        let cache = FrameCache::new(100);
        cache.push_job(RangeCursor::new(0, 100, 50, Direction::Balanced));

        let served: Vec<_> = (0..5).map(|_| cache.wait_and_pop().unwrap()).collect();
        assert_eq!(served, vec![50, 51, 49, 52, 48]);
    }

    #[test]
    fn test_saturated_cache_abandons_job() {
        let cache = Arc::new(UnitCache::new(3));
        let pool = WorkerPool::spawn(Arc::clone(&cache), &pool_config(1), |id: &u64| {
            Some((1u64, *id))
        })
        .unwrap();

        cache.push_job(VecCursor::new(0..10));
        wait_until(|| cache.metrics().snapshot().jobs_abandoned >= 1);

        let (mut keys, weight) = cache.dump_keys();
        keys.sort_unstable();
        assert_eq!(weight, 3);
        assert_eq!(keys, vec![0, 1, 2]);

        // the next job displaces the previous one
        cache.push_job(VecCursor::new(5..8));
        wait_until(|| {
            let (mut keys, _) = cache.dump_keys();
            keys.sort_unstable();
            keys == vec![5, 6, 7]
        });

        pool.shutdown().unwrap();
    }
}

// =============================================================================
// Store Access
// =============================================================================

mod store_tests {
    use super::*;

    #[test]
    fn test_dump_keys_is_consistent_under_contention() {
        let cache = Arc::new(UnitCache::new(64));

        let writers: Vec<_> = (0..4u64)
            .map(|offset| {
                let cache = Arc::clone(&cache);
                thread::spawn(move || {
                    for i in 0..2_000u64 {
                        let id = (i * 4 + offset) % 200;
                        cache.put(id, 1, id);
                        cache.get(&((id + 1) % 200));
                    }
                })
            })
            .collect();

        let reader = {
            let cache = Arc::clone(&cache);
            thread::spawn(move || {
                for _ in 0..2_000 {
                    let (keys, weight) = cache.dump_keys();
                    assert_eq!(keys.len() as u64, weight);
                    assert!(weight <= 64);
                    let unique: HashSet<_> = keys.iter().collect();
                    assert_eq!(unique.len(), keys.len());
                }
            })
        };

        for writer in writers {
            writer.join().unwrap();
        }
        reader.join().unwrap();

        let (_, weight) = cache.dump_keys();
        assert_eq!(weight, 64);
    }

    #[test]
    fn test_resize_while_writing_respects_capacity() {
        let cache = Arc::new(UnitCache::new(100));

        let writer = {
            let cache = Arc::clone(&cache);
            thread::spawn(move || {
                for id in 0..5_000u64 {
                    cache.put(id, 1 + id % 3, id);
                }
            })
        };

        for capacity in [80u64, 40, 10, 60, 20] {
            cache.set_cache_size(capacity);
            let (_, weight) = cache.dump_keys();
            assert!(weight <= cache.capacity());
        }
        writer.join().unwrap();

        let (_, weight) = cache.dump_keys();
        assert!(weight <= 20);
    }

    #[test]
    fn test_resize_is_idempotent() {
        let cache = UnitCache::new(10);
        for id in 0..10 {
            cache.put(id, 1, id);
        }

        cache.set_cache_size(4);
        let first = cache.dump_keys();
        cache.set_cache_size(4);
        assert_eq!(cache.dump_keys(), first);
        assert_eq!(first.1, 4);
    }

    #[test]
    fn test_oversized_put_is_refused() {
        let cache = UnitCache::new(10);
        assert!(!cache.put(1, 11, 1));
        assert_eq!(cache.get(&1), None);
        assert_eq!(cache.inspect(|store| store.stats().refused), 1);
    }
}

// =============================================================================
// Worker Pool
// =============================================================================

mod pool_tests {
    use super::*;

    #[test]
    fn test_pool_follows_moving_playhead() {
        let cache = Arc::new(FrameCache::new(1_000));
        let (rendered_tx, rendered_rx) = channel::unbounded();
        let pool = WorkerPool::spawn(Arc::clone(&cache), &pool_config(3), move |frame: &u64| {
            rendered_tx.send(*frame).ok();
            Some((1u64, frame * 2))
        })
        .unwrap();

        for playhead in [0u64, 10, 20] {
            cache.push_job(RangeCursor::new(0, 30, playhead, Direction::Forward));
        }
        // the last job covers 20..30
        wait_until(|| (20..30).all(|frame| cache.get(&frame).is_some()));

        assert_eq!(cache.get(&25), Some(50));
        let produced = pool.shutdown().unwrap();

        // in-flight frames may be rendered again after a job switch
        let rendered: HashSet<u64> = rendered_rx.try_iter().collect();
        assert!(rendered.len() as u64 <= produced);
        assert!(rendered.iter().all(|frame| *frame < 30));
    }

    #[test]
    fn test_pool_from_yaml_config() {
        let config = PrefetchConfig::from_yaml_str("capacity: 50\nworkers: 1\n").unwrap();
        let cache = Arc::new(UnitCache::new(config.capacity));
        let pool = WorkerPool::spawn(Arc::clone(&cache), &config, |id: &u64| Some((5u64, *id)))
            .unwrap();

        cache.push_job(VecCursor::new(0..20));
        wait_until(|| cache.metrics().snapshot().jobs_abandoned >= 1);

        assert_eq!(cache.dump_keys().1, 50);
        assert_eq!(pool.shutdown().unwrap(), 10);
    }
}
