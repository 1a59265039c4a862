//! Look-Ahead Cache System
//!
//! Bounded, priority-weighted cache drained by a background consumer that
//! walks an ordered job of work units ahead of demand.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────────────┐
//! │                           LookAheadCache                                  │
//! ├──────────────────────────────────────────────────────────────────────────┤
//! │  Producer thread          │  Consumer role           │  Any thread        │
//! │  push_job / terminate     │  wait_and_pop            │  get / put /       │
//! │         │                 │      │                   │  dump_keys /       │
//! │         ▼                 │      ▼                   │  set_cache_size    │
//! │  ┌──────────────┐         │ ┌──────────────┐         │        │           │
//! │  │  JobMailbox  │─────────┼▶│ active job   │         │        │           │
//! │  │ (single slot)│         │ │ (pop lock)   │         │        │           │
//! │  └──────────────┘         │ └──────┬───────┘         │        │           │
//! │                           │        │ classify         │        │           │
//! │                           │        ▼                 │        ▼           │
//! │                           │ ┌─────────────────────────────────────────┐   │
//! │                           │ │   PriorityStore (store lock)            │   │
//! │                           │ └─────────────────────────────────────────┘   │
//! └──────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Design Principles
//!
//! - One lock serializes drain calls, one guards the store
//! - The store vetoes further look-ahead the moment it saturates
//! - Units already cached are skipped without returning to the caller
//! - Termination always surfaces as [`Error::Terminated`](crate::Error::Terminated)

mod cursor;
mod lookahead;
mod mailbox;
mod metrics;
mod store;
mod weight;

#[cfg(test)]
mod proptest;

pub use cursor::{Direction, RangeCursor, VecCursor, WorkCursor};
pub use lookahead::LookAheadCache;
pub use mailbox::JobMailbox;
pub use metrics::{LookAheadMetrics, MetricsSnapshot};
pub use store::{Classification, PriorityCache, PriorityStore, StoreStats};
pub use weight::Weight;

/// Default capacity used by [`PrefetchConfig`](crate::config::PrefetchConfig) (256MB)
pub const DEFAULT_CAPACITY: u64 = 256 * 1024 * 1024;
