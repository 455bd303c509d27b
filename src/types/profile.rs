//! Stream kind and stream profile descriptors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of data carried by a stream.
///
/// Selects the byte-order normalization the reassembler applies: only
/// [`StreamKind::Depth`] payloads are 16-bit swapped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StreamKind {
    Depth,
    Color,
    Ir,
    /// Non-video data (IMU samples) delivered without reassembly
    Unknown,
}

impl StreamKind {
    /// Whether payloads of this kind arrive as big-endian 16-bit samples.
    pub fn is_big_endian_u16(self) -> bool {
        matches!(self, StreamKind::Depth)
    }
}

impl fmt::Display for StreamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StreamKind::Depth => "depth",
            StreamKind::Color => "color",
            StreamKind::Ir => "ir",
            StreamKind::Unknown => "unknown",
        };
        f.write_str(name)
    }
}

/// Video stream descriptor supplied by the sensor layer.
///
/// A stream started without a profile is treated as a non-video stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamProfile {
    pub kind: StreamKind,
    pub width: u32,
    pub height: u32,
    pub fps: u32,
    /// Largest decoded frame size in bytes the sensor layer accepts
    pub frame_size: usize,
}

impl StreamProfile {
    /// Create a profile with an explicit expected frame size.
    pub fn new(kind: StreamKind, width: u32, height: u32, fps: u32, frame_size: usize) -> Self {
        Self { kind, width, height, fps, frame_size }
    }

    /// Create a profile whose expected frame size is `width × height × bytes_per_pixel`.
    pub fn with_bytes_per_pixel(
        kind: StreamKind,
        width: u32,
        height: u32,
        fps: u32,
        bytes_per_pixel: usize,
    ) -> Self {
        let frame_size = width as usize * height as usize * bytes_per_pixel;
        Self::new(kind, width, height, fps, frame_size)
    }
}

impl fmt::Display for StreamProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}x{}@{}", self.kind, self.width, self.height, self.fps)
    }
}
