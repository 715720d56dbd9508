//! Bounded cross-thread output queues
//!
//! The detection worker produces faster than consumers read, so every
//! outbound queue is bounded with an explicit overflow policy:
//! - frames: keep the freshest, evict the oldest (capacity 2)
//! - stats and events: keep what the consumer has not read, drop the newest

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tracing::trace;
use zone_presence::{ZoneEvent, ZoneSnapshot};

use crate::pipeline::AnnotatedFrame;

pub const FRAME_QUEUE_CAPACITY: usize = 2;
pub const STATS_QUEUE_CAPACITY: usize = 10;
pub const EVENT_QUEUE_CAPACITY: usize = 50;

/// Mutex-guarded bounded FIFO shared between the worker and its consumers.
#[derive(Debug)]
pub struct BoundedQueue<T> {
    inner: Mutex<VecDeque<T>>,
    capacity: usize,
}

impl<T> BoundedQueue<T> {
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Mutex::new(VecDeque::with_capacity(capacity)),
            capacity,
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, VecDeque<T>> {
        // Pushes and pops cannot panic while holding the lock, so a
        // poisoned mutex still holds a coherent queue.
        match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Push, evicting the oldest entry when full. Returns `true` when an
    /// entry was evicted.
    pub fn push_rotate(&self, value: T) -> bool {
        let mut queue = self.lock();
        let evicted = queue.len() >= self.capacity;
        if evicted {
            queue.pop_front();
            trace!("queue full, oldest entry evicted");
        }
        queue.push_back(value);
        evicted
    }

    /// Push, dropping the new entry when full. Returns `true` when the
    /// entry was accepted.
    pub fn push_drop(&self, value: T) -> bool {
        let mut queue = self.lock();
        if queue.len() >= self.capacity {
            trace!("queue full, new entry dropped");
            return false;
        }
        queue.push_back(value);
        true
    }

    /// Pop the oldest entry, if any.
    pub fn try_pop(&self) -> Option<T> {
        self.lock().pop_front()
    }

    /// Drain everything currently queued, oldest first.
    pub fn drain(&self) -> Vec<T> {
        self.lock().drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

/// The worker side's handle to all three output queues. Cloning shares the
/// underlying queues.
#[derive(Debug, Clone)]
pub struct OutputChannels {
    pub frames: Arc<BoundedQueue<AnnotatedFrame>>,
    pub stats: Arc<BoundedQueue<ZoneSnapshot>>,
    pub events: Arc<BoundedQueue<ZoneEvent>>,
}

impl OutputChannels {
    pub fn new() -> Self {
        Self {
            frames: Arc::new(BoundedQueue::new(FRAME_QUEUE_CAPACITY)),
            stats: Arc::new(BoundedQueue::new(STATS_QUEUE_CAPACITY)),
            events: Arc::new(BoundedQueue::new(EVENT_QUEUE_CAPACITY)),
        }
    }
}

impl Default for OutputChannels {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_rotate_evicts_oldest() {
        let queue = BoundedQueue::new(2);
        assert!(!queue.push_rotate(1));
        assert!(!queue.push_rotate(2));
        assert!(queue.push_rotate(3));
        assert_eq!(queue.drain(), vec![2, 3]);
    }

    #[test]
    fn test_push_rotate_never_exceeds_capacity() {
        let queue = BoundedQueue::new(FRAME_QUEUE_CAPACITY);
        for i in 0..100 {
            queue.push_rotate(i);
            assert!(queue.len() <= FRAME_QUEUE_CAPACITY);
        }
        // Freshest entries survive
        assert_eq!(queue.drain(), vec![98, 99]);
    }

    #[test]
    fn test_push_drop_keeps_oldest() {
        let queue = BoundedQueue::new(3);
        for i in 0..3 {
            assert!(queue.push_drop(i));
        }
        assert!(!queue.push_drop(99));
        assert_eq!(queue.drain(), vec![0, 1, 2]);
    }

    #[test]
    fn test_try_pop_fifo_order() {
        let queue = BoundedQueue::new(4);
        queue.push_drop("a");
        queue.push_drop("b");
        assert_eq!(queue.try_pop(), Some("a"));
        assert_eq!(queue.try_pop(), Some("b"));
        assert_eq!(queue.try_pop(), None);
    }

    #[test]
    fn test_drain_empties_queue() {
        let queue = BoundedQueue::new(4);
        queue.push_drop(1);
        queue.push_drop(2);
        assert_eq!(queue.drain().len(), 2);
        assert!(queue.is_empty());
    }
}
