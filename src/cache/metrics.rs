//! Look-Ahead Metrics Collection
//!
//! Lock-free counters recorded by the orchestrator and its accessors.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Look-ahead cache metrics collector
#[derive(Debug, Default)]
pub struct LookAheadMetrics {
    // Job protocol
    jobs_published: AtomicU64,
    jobs_replaced: AtomicU64,
    jobs_adopted: AtomicU64,
    jobs_abandoned: AtomicU64,

    // Drain loop
    units_ready: AtomicU64,
    units_skipped: AtomicU64,

    // Accessors
    hits: AtomicU64,
    misses: AtomicU64,
    puts_accepted: AtomicU64,
    puts_refused: AtomicU64,
}

impl LookAheadMetrics {
    /// Create a new metrics collector
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_job_published(&self, replaced: bool) {
        self.jobs_published.fetch_add(1, Ordering::Relaxed);
        if replaced {
            self.jobs_replaced.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn record_job_adopted(&self) {
        self.jobs_adopted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_job_abandoned(&self) {
        self.jobs_abandoned.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_unit_ready(&self) {
        self.units_ready.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_unit_skipped(&self) {
        self.units_skipped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_lookup(&self, hit: bool) {
        if hit {
            self.hits.fetch_add(1, Ordering::Relaxed);
        } else {
            self.misses.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn record_put(&self, accepted: bool) {
        if accepted {
            self.puts_accepted.fetch_add(1, Ordering::Relaxed);
        } else {
            self.puts_refused.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }

    pub fn hit_ratio(&self) -> f64 {
        let hits = self.hits() as f64;
        let total = hits + self.misses() as f64;
        if total == 0.0 {
            0.0
        } else {
            hits / total
        }
    }

    /// Point-in-time copy of every counter
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            jobs_published: self.jobs_published.load(Ordering::Relaxed),
            jobs_replaced: self.jobs_replaced.load(Ordering::Relaxed),
            jobs_adopted: self.jobs_adopted.load(Ordering::Relaxed),
            jobs_abandoned: self.jobs_abandoned.load(Ordering::Relaxed),
            units_ready: self.units_ready.load(Ordering::Relaxed),
            units_skipped: self.units_skipped.load(Ordering::Relaxed),
            hits: self.hits(),
            misses: self.misses(),
            hit_ratio: self.hit_ratio(),
            puts_accepted: self.puts_accepted.load(Ordering::Relaxed),
            puts_refused: self.puts_refused.load(Ordering::Relaxed),
        }
    }

    /// Reset all counters
    pub fn reset(&self) {
        for counter in [
            &self.jobs_published,
            &self.jobs_replaced,
            &self.jobs_adopted,
            &self.jobs_abandoned,
            &self.units_ready,
            &self.units_skipped,
            &self.hits,
            &self.misses,
            &self.puts_accepted,
            &self.puts_refused,
        ] {
            counter.store(0, Ordering::Relaxed);
        }
    }
}

/// Serializable metrics snapshot
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MetricsSnapshot {
    pub jobs_published: u64,
    pub jobs_replaced: u64,
    pub jobs_adopted: u64,
    pub jobs_abandoned: u64,
    pub units_ready: u64,
    pub units_skipped: u64,
    pub hits: u64,
    pub misses: u64,
    pub hit_ratio: f64,
    pub puts_accepted: u64,
    pub puts_refused: u64,
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hit_ratio() {
        let metrics = LookAheadMetrics::new();
        assert_eq!(metrics.hit_ratio(), 0.0);

        metrics.record_lookup(true);
        metrics.record_lookup(true);
        metrics.record_lookup(true);
        metrics.record_lookup(false);

        assert_eq!(metrics.hits(), 3);
        assert_eq!(metrics.misses(), 1);
        assert!((metrics.hit_ratio() - 0.75).abs() < 0.001);
    }

    #[test]
    fn test_job_counters() {
        let metrics = LookAheadMetrics::new();
        metrics.record_job_published(false);
        metrics.record_job_published(true);
        metrics.record_job_adopted();
        metrics.record_job_abandoned();

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.jobs_published, 2);
        assert_eq!(snapshot.jobs_replaced, 1);
        assert_eq!(snapshot.jobs_adopted, 1);
        assert_eq!(snapshot.jobs_abandoned, 1);
    }

    #[test]
    fn test_snapshot_serializes() {
        let metrics = LookAheadMetrics::new();
        metrics.record_unit_ready();
        metrics.record_put(false);

        let json = serde_json::to_string(&metrics.snapshot()).unwrap();
        assert!(json.contains("\"units_ready\":1"));
        assert!(json.contains("\"puts_refused\":1"));
    }

    #[test]
    fn test_reset() {
        let metrics = LookAheadMetrics::new();
        metrics.record_unit_skipped();
        metrics.record_put(true);
        metrics.reset();
        assert_eq!(metrics.snapshot(), MetricsSnapshot::default());
    }
}
