//! Job Mailbox
//!
//! Single-slot hand-off cell between the thread that publishes jobs and the
//! thread that drains them.
//!
//! - `publish` never blocks and overwrites any job not yet taken
//! - `take` blocks until a job arrives or the mailbox is terminated
//! - termination is persistent and wakes every waiter

use parking_lot::{Condvar, Mutex};

use crate::error::{Error, Result};

struct Slot<C> {
    job: Option<C>,
    terminated: bool,
    /// Bumped by every `terminate(true)`
    shutdowns: u64,
}

/// Thread-safe single-slot job hand-off
pub struct JobMailbox<C> {
    slot: Mutex<Slot<C>>,
    available: Condvar,
}

impl<C> Default for JobMailbox<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> JobMailbox<C> {
    /// Create an empty, open mailbox
    pub fn new() -> Self {
        Self {
            slot: Mutex::new(Slot {
                job: None,
                terminated: false,
                shutdowns: 0,
            }),
            available: Condvar::new(),
        }
    }

    /// Publish a job, replacing any job still waiting for pickup.
    ///
    /// Returns `true` if a pending job was replaced.
    pub fn publish(&self, job: C) -> bool {
        let replaced = {
            let mut slot = self.slot.lock();
            slot.job.replace(job).is_some()
        };
        self.available.notify_one();
        replaced
    }

    /// Take the pending job without blocking
    pub fn try_take(&self) -> Option<C> {
        self.slot.lock().job.take()
    }

    /// Block until a job is available.
    ///
    /// Returns [`Error::Terminated`] once the mailbox is terminated, even if
    /// a job is still pending.
    ///
    /// A waiter blocked when `terminate(true)` is called always returns
    /// [`Error::Terminated`], even if the flag is cleared before it wakes.
    pub fn take(&self) -> Result<C> {
        let mut slot = self.slot.lock();
        let shutdowns = slot.shutdowns;
        loop {
            if slot.terminated || slot.shutdowns != shutdowns {
                return Err(Error::Terminated);
            }
            if let Some(job) = slot.job.take() {
                return Ok(job);
            }
            self.available.wait(&mut slot);
        }
    }

    /// Set or clear the shutdown flag. Every blocked `take` is woken.
    pub fn terminate(&self, value: bool) {
        {
            let mut slot = self.slot.lock();
            slot.terminated = value;
            if value {
                slot.shutdowns += 1;
            }
        }
        self.available.notify_all();
    }

    /// Check if the shutdown flag is set
    pub fn is_terminated(&self) -> bool {
        self.slot.lock().terminated
    }

    /// Check if a job is waiting for pickup
    pub fn has_pending(&self) -> bool {
        self.slot.lock().job.is_some()
    }
}

// =============================================================================
// Tests
// =============================================================================
