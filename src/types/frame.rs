//! Completed frames and the factory that builds them

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use super::{StreamKind, StreamProfile};

/// A completed frame handed to the caller's callback.
///
/// Metadata and payload are already byte-order normalized. Buffers are shared
/// via `Arc` so frames can be cloned cheaply across consumers.
#[derive(Debug, Clone)]
pub struct Frame {
    /// Kind of stream that produced the frame
    pub kind: StreamKind,

    /// Profile the frame was decoded against (`None` for non-video streams)
    pub profile: Option<StreamProfile>,

    /// Camera metadata block, empty for non-video frames
    pub metadata: Arc<[u8]>,

    /// Frame payload
    pub data: Arc<[u8]>,

    /// Capture timestamp in device units, as carried by the packet header
    pub timestamp: u64,

    /// Monotonic frame counter of the stream
    pub number: u64,

    /// Local wall-clock receive time, microseconds since the Unix epoch
    pub system_timestamp_us: u64,
}

impl Frame {
    /// Size of the payload in bytes.
    pub fn data_size(&self) -> usize {
        self.data.len()
    }
}

/// Raw parts of a frame before it is wrapped by a [`FrameFactory`].
#[derive(Debug, Clone, Default)]
pub struct FrameParts {
    pub metadata: Vec<u8>,
    pub data: Vec<u8>,
    pub timestamp: u64,
    pub number: u64,
    pub system_timestamp_us: u64,
}

/// Builds output frames for a stream.
///
/// The sensor layer may plug in its own factory to attach format information
/// or use pooled allocations. `profile` is `None` for non-video streams.
pub trait FrameFactory: Send + Sync + 'static {
    fn create_frame(&self, profile: Option<&StreamProfile>, parts: FrameParts) -> Frame;
}

/// Factory producing plain [`Frame`] values typed by the stream profile.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultFrameFactory;

impl FrameFactory for DefaultFrameFactory {
    fn create_frame(&self, profile: Option<&StreamProfile>, parts: FrameParts) -> Frame {
        Frame {
            kind: profile.map_or(StreamKind::Unknown, |p| p.kind),
            profile: profile.copied(),
            metadata: parts.metadata.into(),
            data: parts.data.into(),
            timestamp: parts.timestamp,
            number: parts.number,
            system_timestamp_us: parts.system_timestamp_us,
        }
    }
}

/// Current wall-clock time in microseconds since the Unix epoch.
pub fn system_time_us() -> u64 {
    SystemTime::now().duration_since(UNIX_EPOCH).map_or(0, |d| d.as_micros() as u64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_factory_types_frame_from_profile() {
        let profile = StreamProfile::new(StreamKind::Ir, 4, 2, 30, 8);
        let parts = FrameParts {
            metadata: vec![1; 96],
            data: vec![7; 8],
            timestamp: 42,
            number: 3,
            system_timestamp_us: 1000,
        };

        let frame = DefaultFrameFactory.create_frame(Some(&profile), parts);

        assert_eq!(frame.kind, StreamKind::Ir);
        assert_eq!(frame.profile, Some(profile));
        assert_eq!(frame.data_size(), 8);
        assert_eq!(frame.metadata.len(), 96);
        assert_eq!(frame.timestamp, 42);
        assert_eq!(frame.number, 3);
    }

    #[test]
    fn missing_profile_yields_unknown_frame() {
        let frame = DefaultFrameFactory.create_frame(None, FrameParts::default());
        assert_eq!(frame.kind, StreamKind::Unknown);
        assert!(frame.profile.is_none());
    }

    #[test]
    fn system_time_is_after_2020() {
        assert!(system_time_us() > 1_577_836_800_000_000);
    }
}
