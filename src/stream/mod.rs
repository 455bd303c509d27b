//! Async frame streams
//!
//! Bridges the callback-driven process thread to `futures::Stream` consumers.
//! Completed frames are published into a `tokio::sync::watch` channel, so a
//! slow consumer only ever sees the latest frame. The stream ends when the
//! publishing side is dropped, which happens when the transport's process
//! thread exits.

mod throttle;

pub use throttle::{Throttle, ThrottleExt};

use futures::StreamExt;
use futures::stream::BoxStream;
use std::sync::Arc;
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;

use crate::types::{Frame, UpdateRate};

/// Publishing side of a frame stream, driven from the process thread.
#[derive(Debug)]
pub struct FrameSink {
    tx: watch::Sender<Option<Arc<Frame>>>,
}

impl FrameSink {
    /// Publish a frame, replacing any frame not yet observed.
    pub fn publish(&self, frame: Frame) {
        // send_replace succeeds without receivers; a dropped stream is not an error
        self.tx.send_replace(Some(Arc::new(frame)));
    }

    /// Whether every stream attached to this sink has been dropped.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Create a sink and the stream it feeds.
///
/// `source_fps` is the stream's native rate, used to normalize `rate`.
pub fn frame_channel(
    source_fps: u32,
    rate: UpdateRate,
) -> (FrameSink, BoxStream<'static, Arc<Frame>>) {
    let (tx, rx) = watch::channel(None);

    // WatchStream yields the current value first; skip the initial None
    let frames = WatchStream::new(rx).filter_map(|opt| async move { opt });

    let stream = match rate.throttle_interval(source_fps) {
        None => frames.boxed(),
        Some(interval) => frames.throttle(interval).boxed(),
    };

    (FrameSink { tx }, stream)
}
