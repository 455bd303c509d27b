//! Wire format of the camera's UDP framing protocol.
//!
//! Every datagram starts with a 12-byte RTP-like [`PacketHeader`], followed by
//! a slice of the frame being transmitted. A frame is split into packets with
//! per-frame sequence numbers starting at 0; the last packet carries the
//! marker bit. The first 96 bytes of every frame are camera metadata.
//!
//! ```text
//! reassembly buffer
//! ┌────────┬───────────────┬──────────────────────────────────┐
//! │ pad 12 │ metadata 96   │ frame payload                    │
//! └────────┴───────────────┴──────────────────────────────────┘
//!          ^ METADATA_OFFSET ^ FRAME_DATA_OFFSET
//! ```

mod byte_order;
mod header;

pub use byte_order::{swap_u16_words, swap_u32_words};
pub use header::PacketHeader;

/// Size of the framing header in bytes.
pub const HEADER_LEN: usize = 12;

/// Largest UDP payload that avoids IP fragmentation on a 1500-byte MTU.
pub const MAX_UDP_PAYLOAD: usize = 1472;

/// Frame bytes carried by one full-size packet.
pub const PACKET_PAYLOAD_CAPACITY: usize = MAX_UDP_PAYLOAD - HEADER_LEN;

/// Largest frame the protocol carries (4 bytes per pixel at 1920x1080).
pub const MAX_FRAME_BYTES: usize = 4 * 1920 * 1080;

/// Maximum packets a single frame may span.
pub const MAX_PACKET_COUNT: usize = MAX_FRAME_BYTES.div_ceil(PACKET_PAYLOAD_CAPACITY) + 1;

/// Size of the metadata block at the start of every frame.
pub const METADATA_LEN: usize = 96;

/// Offset of the metadata block inside the reassembly buffer.
pub const METADATA_OFFSET: usize = HEADER_LEN;

/// Offset of the frame payload inside the reassembly buffer.
pub const FRAME_DATA_OFFSET: usize = METADATA_OFFSET + METADATA_LEN;

/// Receive buffer size for one datagram.
pub const RECV_BUFFER_LEN: usize = 1500;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derived_constants_match_wire_layout() {
        assert_eq!(PACKET_PAYLOAD_CAPACITY, 1460);
        assert_eq!(MAX_FRAME_BYTES, 8_294_400);
        // ceil(8_294_400 / 1460) = 5682, plus one spare packet
        assert_eq!(MAX_PACKET_COUNT, 5683);
        assert_eq!(FRAME_DATA_OFFSET, 108);
    }
}
