//! Update rate control for frame streams

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Delivery rate for async frame streams
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum UpdateRate {
    /// Every frame the camera completes
    Native,

    /// Throttled to at most this many frames per second
    /// If the requested rate reaches the stream's frame rate, Native is used
    Max(u32),
}

impl UpdateRate {
    /// Normalize rate against the stream's frame rate
    /// A source rate of 0 means unknown and leaves throttling in place
    pub fn normalize(self, source_fps: u32) -> Self {
        match self {
            UpdateRate::Native => UpdateRate::Native,
            UpdateRate::Max(0) => UpdateRate::Native,
            UpdateRate::Max(hz) if source_fps > 0 && hz >= source_fps => UpdateRate::Native,
            UpdateRate::Max(hz) => UpdateRate::Max(hz),
        }
    }

    /// Get throttle interval if needed
    pub fn throttle_interval(self, source_fps: u32) -> Option<Duration> {
        match self.normalize(source_fps) {
            UpdateRate::Native => None,
            UpdateRate::Max(hz) => Some(Duration::from_secs_f64(1.0 / f64::from(hz))),
        }
    }
}
