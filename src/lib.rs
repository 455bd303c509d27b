//! Ethernet streaming client for network-attached depth cameras.
//!
//! Depthlink receives a camera's UDP packet streams, reassembles packets into
//! frames, normalizes byte order and hands completed frames to the caller.
//!
//! # Features
//!
//! - **Frame reassembly**: RTP-like framing with sequence/marker validation;
//!   incomplete frames are dropped, never partially delivered
//! - **Byte-order normalization**: depth payloads and metadata converted to
//!   host order exactly once per frame
//! - **Two-thread pipeline**: socket reads never wait on frame processing
//! - **Non-video streams**: IMU datagrams delivered one frame per packet
//! - **Async streams**: latest-wins `futures::Stream` view with rate limiting
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use depthlink::{StreamConfig, StreamKind, StreamProfile, StreamingClient, UpdateRate};
//! use futures::StreamExt;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut client = StreamingClient::new(StreamConfig::new("192.168.1.10", 8900));
//!     client.init()?;
//!
//!     let profile = StreamProfile::with_bytes_per_pixel(StreamKind::Depth, 640, 480, 30, 2);
//!     let mut frames = client.start_stream(Some(profile), UpdateRate::Max(10));
//!
//!     while let Some(frame) = frames.next().await {
//!         println!("frame {} at {}: {} bytes", frame.number, frame.timestamp, frame.data_size());
//!     }
//!     Ok(())
//! }
//! ```

// Core types and error handling
pub mod config;
mod error;
pub mod protocol;
#[cfg(any(test, feature = "benchmark"))]
pub mod test_utils;
pub mod types;

// Receive pipeline
pub mod queue;
pub mod reassembly;
pub mod transport;

// Caller-facing surfaces
pub mod client;
pub mod stream;

// Core exports
pub use error::*;
pub use types::*;

pub use client::StreamingClient;
pub use config::{QueueConfig, StreamConfig};
pub use protocol::PacketHeader;
pub use queue::{OverflowPolicy, PacketQueue};
pub use reassembly::{AssemblyState, FrameReassembler};
pub use transport::{StatsSnapshot, UdpTransport};
