//! Per-stream counters
//!
//! Updated lock-free by the receive and process threads; read via
//! [`StatsSnapshot`].

use std::sync::atomic::{AtomicU64, Ordering};

/// Live counters shared by a transport's worker threads.
#[derive(Debug, Default)]
pub struct StreamStats {
    datagrams_received: AtomicU64,
    datagrams_filtered: AtomicU64,
    datagrams_malformed: AtomicU64,
    receive_errors: AtomicU64,
    frames_delivered: AtomicU64,
    frames_incomplete: AtomicU64,
    frames_aborted: AtomicU64,
    frames_oversized: AtomicU64,
}

/// Point-in-time copy of a stream's counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StatsSnapshot {
    /// Datagrams from the configured peer handed to the queue
    pub datagrams_received: u64,
    /// Datagrams discarded because the source address did not match
    pub datagrams_filtered: u64,
    /// Datagrams shorter than the framing header
    pub datagrams_malformed: u64,
    /// Socket errors other than timeouts
    pub receive_errors: u64,
    pub frames_delivered: u64,
    /// Frames whose marker packet arrived with packets missing
    pub frames_incomplete: u64,
    /// Frames aborted on overflow or out-of-bounds packets
    pub frames_aborted: u64,
    /// Frames larger than the profile's declared size
    pub frames_oversized: u64,
    /// Datagrams waiting in the queue
    pub queue_depth: usize,
    /// Datagrams discarded by a bounded queue
    pub queue_dropped: u64,
}

impl StatsSnapshot {
    /// Frames dropped for any reason.
    pub fn frames_dropped(&self) -> u64 {
        self.frames_incomplete + self.frames_aborted + self.frames_oversized
    }
}

macro_rules! counter {
    ($($name:ident),* $(,)?) => {
        impl StreamStats {
            $(
                pub(crate) fn $name(&self) {
                    self.$name.fetch_add(1, Ordering::Relaxed);
                }
            )*
        }
    };
}

// Increment helpers share the counter's name
counter!(
    datagrams_received,
    datagrams_filtered,
    datagrams_malformed,
    receive_errors,
    frames_delivered,
    frames_incomplete,
    frames_aborted,
    frames_oversized,
);

impl StreamStats {
    /// Copy the counters, adding queue state supplied by the caller.
    pub fn snapshot(&self, queue_depth: usize, queue_dropped: u64) -> StatsSnapshot {
        StatsSnapshot {
            datagrams_received: self.datagrams_received.load(Ordering::Relaxed),
            datagrams_filtered: self.datagrams_filtered.load(Ordering::Relaxed),
            datagrams_malformed: self.datagrams_malformed.load(Ordering::Relaxed),
            receive_errors: self.receive_errors.load(Ordering::Relaxed),
            frames_delivered: self.frames_delivered.load(Ordering::Relaxed),
            frames_incomplete: self.frames_incomplete.load(Ordering::Relaxed),
            frames_aborted: self.frames_aborted.load(Ordering::Relaxed),
            frames_oversized: self.frames_oversized.load(Ordering::Relaxed),
            queue_depth,
            queue_dropped,
        }
    }
}
