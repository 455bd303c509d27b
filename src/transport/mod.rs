//! UDP transport for camera streams
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐   Vec<u8>    ┌──────────────┐   Frame   ┌──────────┐
//! │ receive      │─────────────▶│ process      │──────────▶│ callback │
//! │ thread       │ PacketQueue  │ thread       │           └──────────┘
//! │ (socket,     │              │ (header,     │
//! │  peer filter)│              │  reassembly) │
//! └──────────────┘              └──────────────┘
//! ```
//!
//! Each transport owns one socket bound with [`bind_with_retry`]. The receive
//! thread is the only producer on the queue and the process thread the only
//! consumer. Counters are kept in [`StreamStats`] and read as a
//! [`StatsSnapshot`].

mod socket;
mod stats;
mod udp;

pub use socket::{BIND_PORT_STEP, bind_with_retry};
pub use stats::{StatsSnapshot, StreamStats};
pub use udp::{FrameCallback, UdpTransport};
