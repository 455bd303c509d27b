//! Packet queue between the receive and process threads.
//!
//! A FIFO guarded by a mutex and condition variable. The receive thread is the
//! only producer and the process thread the only consumer.
//!
//! # Lifecycle
//!
//! ```text
//!  open ──destroy()──▶ closed (pop drains, then returns None)
//!   ▲                    │
//!   └──────reset()───────┘
//! ```
//!
//! # Capacity
//!
//! [`PacketQueue::unbounded`] never applies backpressure: a slow consumer grows
//! the queue instead of slowing ingestion. [`PacketQueue::bounded`] caps the
//! queue and discards datagrams according to an [`OverflowPolicy`].

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};

/// Datagram to discard when a bounded queue is full.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverflowPolicy {
    /// Evict the oldest queued datagram to make room
    #[default]
    DropOldest,
    /// Discard the incoming datagram
    DropNewest,
}

#[derive(Debug, Default)]
struct QueueState {
    items: VecDeque<Vec<u8>>,
    closed: bool,
}

/// Thread-safe FIFO handoff of raw datagrams.
#[derive(Debug)]
pub struct PacketQueue {
    state: Mutex<QueueState>,
    available: Condvar,
    capacity: Option<usize>,
    policy: OverflowPolicy,
    dropped: AtomicU64,
}

impl Default for PacketQueue {
    fn default() -> Self {
        Self::unbounded()
    }
}

impl PacketQueue {
    /// Create a queue without a capacity bound.
    pub fn unbounded() -> Self {
        Self {
            state: Mutex::new(QueueState::default()),
            available: Condvar::new(),
            capacity: None,
            policy: OverflowPolicy::default(),
            dropped: AtomicU64::new(0),
        }
    }

    /// Create a queue holding at most `capacity` datagrams (minimum 1).
    pub fn bounded(capacity: usize, policy: OverflowPolicy) -> Self {
        Self { capacity: Some(capacity.max(1)), policy, ..Self::unbounded() }
    }

    /// Create a queue from an optional capacity.
    pub fn with_capacity(capacity: Option<usize>, policy: OverflowPolicy) -> Self {
        match capacity {
            Some(capacity) => Self::bounded(capacity, policy),
            None => Self::unbounded(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, QueueState> {
        // The state stays consistent even if a holder panicked mid-operation
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Append a datagram. Never blocks; ignored once the queue is destroyed.
    pub fn push(&self, datagram: Vec<u8>) {
        let mut state = self.lock();
        if state.closed {
            return;
        }

        if let Some(capacity) = self.capacity {
            if state.items.len() >= capacity {
                self.dropped.fetch_add(1, Ordering::Relaxed);
                match self.policy {
                    OverflowPolicy::DropNewest => return,
                    OverflowPolicy::DropOldest => {
                        state.items.pop_front();
                    }
                }
            }
        }

        state.items.push_back(datagram);
        drop(state);
        self.available.notify_one();
    }

    /// Take the oldest datagram, blocking until one is available.
    ///
    /// Returns `None` once the queue is destroyed and drained.
    pub fn pop(&self) -> Option<Vec<u8>> {
        let mut state = self.lock();
        loop {
            if let Some(item) = state.items.pop_front() {
                return Some(item);
            }
            if state.closed {
                return None;
            }
            state = self.available.wait(state).unwrap_or_else(PoisonError::into_inner);
        }
    }

    /// Close the queue and wake every blocked consumer.
    pub fn destroy(&self) {
        self.lock().closed = true;
        self.available.notify_all();
    }

    /// Discard buffered datagrams and re-open the queue.
    pub fn reset(&self) {
        let mut state = self.lock();
        state.items.clear();
        state.closed = false;
    }

    /// Number of buffered datagrams.
    pub fn len(&self) -> usize {
        self.lock().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether [`destroy`](Self::destroy) was called since the last reset.
    pub fn is_closed(&self) -> bool {
        self.lock().closed
    }

    /// Datagrams discarded by the overflow policy.
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    pub fn capacity(&self) -> Option<usize> {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn pop_blocks_until_push() {
        let queue = Arc::new(PacketQueue::unbounded());
        let consumer = {
            let queue = Arc::clone(&queue);
            thread::spawn(move || queue.pop())
        };

        thread::sleep(Duration::from_millis(50));
        queue.push(vec![1, 2, 3]);

        assert_eq!(consumer.join().unwrap(), Some(vec![1, 2, 3]));
    }

    #[test]
    fn destroy_wakes_blocked_consumer() {
        let queue = Arc::new(PacketQueue::unbounded());
        let consumer = {
            let queue = Arc::clone(&queue);
            thread::spawn(move || queue.pop())
        };

        thread::sleep(Duration::from_millis(50));
        queue.destroy();

        assert_eq!(consumer.join().unwrap(), None);
    }

    #[test]
    fn destroyed_queue_drains_then_reports_closed() {
        let queue = PacketQueue::unbounded();
        queue.push(vec![1]);
        queue.push(vec![2]);
        queue.destroy();
        queue.push(vec![3]);

        assert_eq!(queue.pop(), Some(vec![1]));
        assert_eq!(queue.pop(), Some(vec![2]));
        assert_eq!(queue.pop(), None);
        assert_eq!(queue.pop(), None);
    }

    #[test]
    fn reset_rearms_destroyed_queue() {
        let queue = PacketQueue::unbounded();
        queue.push(vec![1]);
        queue.destroy();
        assert!(queue.is_closed());

        queue.reset();
        assert!(!queue.is_closed());
        assert!(queue.is_empty());

        queue.push(vec![9]);
        assert_eq!(queue.pop(), Some(vec![9]));
    }

    #[test]
    fn bounded_drop_oldest_keeps_latest() {
        let queue = PacketQueue::bounded(2, OverflowPolicy::DropOldest);
        for i in 0..5u8 {
            queue.push(vec![i]);
        }

        assert_eq!(queue.len(), 2);
        assert_eq!(queue.dropped(), 3);
        assert_eq!(queue.pop(), Some(vec![3]));
        assert_eq!(queue.pop(), Some(vec![4]));
    }

    #[test]
    fn bounded_drop_newest_keeps_earliest() {
        let queue = PacketQueue::bounded(2, OverflowPolicy::DropNewest);
        for i in 0..5u8 {
            queue.push(vec![i]);
        }

        assert_eq!(queue.dropped(), 3);
        assert_eq!(queue.pop(), Some(vec![0]));
        assert_eq!(queue.pop(), Some(vec![1]));
    }

    #[test]
    fn zero_capacity_is_raised_to_one() {
        let queue = PacketQueue::bounded(0, OverflowPolicy::DropNewest);
        assert_eq!(queue.capacity(), Some(1));
        queue.push(vec![1]);
        assert_eq!(queue.len(), 1);
    }

    proptest! {
        #[test]
        fn unbounded_queue_preserves_order(items in prop::collection::vec(prop::collection::vec(any::<u8>(), 0..16), 0..64)) {
            let queue = PacketQueue::unbounded();
            for item in &items {
                queue.push(item.clone());
            }
            queue.destroy();

            let mut popped = Vec::new();
            while let Some(item) = queue.pop() {
                popped.push(item);
            }
            prop_assert_eq!(popped, items);
        }
    }
}
