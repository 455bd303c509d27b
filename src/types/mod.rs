//! Core types shared between the transport and its callers.
//!
//! - [`StreamProfile`] describes a video stream as configured by the sensor layer
//! - [`StreamKind`] selects per-kind byte-order normalization
//! - [`Frame`] is a completed, normalized frame delivered to callbacks
//! - [`FrameFactory`] lets the sensor layer control how frames are built
//! - [`UpdateRate`] throttles async frame streams
//!
//! ## Usage Example
//!
//! ```rust
//! use depthlink::types::{DefaultFrameFactory, FrameFactory, FrameParts, StreamKind, StreamProfile};
//!
//! let profile = StreamProfile::with_bytes_per_pixel(StreamKind::Depth, 640, 480, 30, 2);
//! let frame = DefaultFrameFactory.create_frame(
//!     Some(&profile),
//!     FrameParts { data: vec![0; 16], timestamp: 1234, ..Default::default() },
//! );
//!
//! assert_eq!(frame.kind, StreamKind::Depth);
//! assert_eq!(frame.data_size(), 16);
//! ```

mod frame;
mod profile;
mod update_rate;

pub use frame::{DefaultFrameFactory, Frame, FrameFactory, FrameParts, system_time_us};
pub use profile::{StreamKind, StreamProfile};
pub use update_rate::UpdateRate;
