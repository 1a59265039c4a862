//! LookAhead - Bounded Look-Ahead Cache
//!
//! A bounded, priority-weighted cache drained by background workers that walk
//! an ordered job of work units (frames, tiles, files) ahead of demand, while
//! a foreground producer keeps replacing the job.
//!
//! # Architecture
//!
//! ```text
//! Producer (push_job) → JobMailbox → Consumer (wait_and_pop) → Workers (put)
//!                                          │
//!                                    PriorityStore
//! ```
//!
//! # Modules
//!
//! - [`cache`] - Look-ahead cache, priority store, mailbox and cursors
//! - [`config`] - Worker pool configuration
//! - [`error`] - Error types
//! - [`queue`] - `push_back` adapter over concurrent queues
//! - [`worker`] - Background worker pool

pub mod cache;
pub mod config;
pub mod error;
pub mod queue;
pub mod worker;

// Re-export commonly used types
pub use cache::{
    Classification, Direction, JobMailbox, LookAheadCache, LookAheadMetrics, MetricsSnapshot,
    PriorityCache, PriorityStore, RangeCursor, VecCursor, Weight, WorkCursor,
};
pub use config::PrefetchConfig;
pub use error::{Error, Result};
pub use queue::{ConcurrentQueue, QueueAdapter};
pub use worker::{Producer, WorkerPool};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
