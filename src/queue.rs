//! Queue Adapter
//!
//! Lets code written against a `push_back` / [`Extend`] sink feed a
//! concurrent queue directly.

use crossbeam::channel::Sender;
use crossbeam::queue::SegQueue;
use tracing::warn;

/// A thread-safe queue accepting values through a shared reference
pub trait ConcurrentQueue<T> {
    /// Enqueue `value`
    fn push(&self, value: T);
}

impl<T> ConcurrentQueue<T> for SegQueue<T> {
    fn push(&self, value: T) {
        SegQueue::push(self, value);
    }
}

impl<T> ConcurrentQueue<T> for Sender<T> {
    /// Blocks while a bounded channel is full. Values sent after every
    /// receiver is gone are dropped.
    fn push(&self, value: T) {
        if self.send(value).is_err() {
            warn!("Queue receiver disconnected, dropping value");
        }
    }
}

/// Sequence-style front end over a [`ConcurrentQueue`]
pub struct QueueAdapter<'a, Q> {
    queue: &'a Q,
}

impl<'a, Q> QueueAdapter<'a, Q> {
    /// Wrap `queue`
    pub fn new(queue: &'a Q) -> Self {
        Self { queue }
    }

    /// Append `value` to the underlying queue
    pub fn push_back<T>(&mut self, value: T)
    where
        Q: ConcurrentQueue<T>,
    {
        self.queue.push(value);
    }
}

impl<T, Q: ConcurrentQueue<T>> Extend<T> for QueueAdapter<'_, Q> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for value in iter {
            self.queue.push(value);
        }
    }
}
