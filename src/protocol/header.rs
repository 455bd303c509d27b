//! RTP-like packet header parsing
//!
//! # Header Layout
//!
//! ```text
//!  0                   1                   2                   3
//!  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |V=2|P|X|  CC   |M|     PT      |       sequence number         |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |                           timestamp                           |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |                             SSRC                              |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! ```
//!
//! Multi-byte fields travel in network byte order. Unlike RTP, the sequence
//! number restarts at 0 for every frame and the marker bit flags the last
//! packet of a frame.

use super::HEADER_LEN;
use crate::{Result, StreamError};

/// Parsed framing header, fields converted to host byte order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PacketHeader {
    /// Protocol version (2 bits)
    pub version: u8,
    /// Padding flag
    pub padding: bool,
    /// Header extension flag
    pub extension: bool,
    /// CSRC count (4 bits)
    pub csrc_count: u8,
    /// Set on the last packet of a frame
    pub marker: bool,
    /// Payload type (7 bits)
    pub payload_type: u8,
    /// Packet index within the current frame; 0 starts a frame
    pub sequence: u16,
    /// Capture timestamp in device units
    pub timestamp: u32,
    /// Synchronization source identifier
    pub ssrc: u32,
    /// Timestamp field exactly as laid out in the datagram, without byte-order conversion
    pub raw_timestamp: u32,
}

impl PacketHeader {
    /// Parse the header at the start of a datagram.
    pub fn parse(datagram: &[u8]) -> Result<Self> {
        let Some(bytes) = datagram.first_chunk::<HEADER_LEN>() else {
            return Err(StreamError::malformed_packet(format!(
                "datagram of {} bytes is shorter than the {HEADER_LEN}-byte header",
                datagram.len()
            )));
        };

        let b0 = bytes[0];
        let b1 = bytes[1];
        let timestamp_bytes = [bytes[4], bytes[5], bytes[6], bytes[7]];

        Ok(Self {
            version: b0 >> 6,
            padding: b0 & 0x20 != 0,
            extension: b0 & 0x10 != 0,
            csrc_count: b0 & 0x0F,
            marker: b1 & 0x80 != 0,
            payload_type: b1 & 0x7F,
            sequence: u16::from_be_bytes([bytes[2], bytes[3]]),
            timestamp: u32::from_be_bytes(timestamp_bytes),
            ssrc: u32::from_be_bytes([bytes[8], bytes[9], bytes[10], bytes[11]]),
            raw_timestamp: u32::from_ne_bytes(timestamp_bytes),
        })
    }

    /// Encode the header in wire format.
    ///
    /// `raw_timestamp` is derived from `timestamp` on the wire and is ignored here.
    pub fn to_bytes(&self) -> [u8; HEADER_LEN] {
        let mut out = [0u8; HEADER_LEN];
        out[0] = (self.version & 0x03) << 6
            | u8::from(self.padding) << 5
            | u8::from(self.extension) << 4
            | (self.csrc_count & 0x0F);
        out[1] = u8::from(self.marker) << 7 | (self.payload_type & 0x7F);
        out[2..4].copy_from_slice(&self.sequence.to_be_bytes());
        out[4..8].copy_from_slice(&self.timestamp.to_be_bytes());
        out[8..12].copy_from_slice(&self.ssrc.to_be_bytes());
        out
    }

    /// Whether this packet starts a new frame.
    pub fn is_frame_start(&self) -> bool {
        self.sequence == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn parses_known_header_bytes() {
        let bytes = [0x80, 0xE0, 0x01, 0x02, 0xDE, 0xAD, 0xBE, 0xEF, 0x00, 0x00, 0x12, 0x34, 0xFF];
        let header = PacketHeader::parse(&bytes).unwrap();

        assert_eq!(header.version, 2);
        assert!(!header.padding);
        assert!(!header.extension);
        assert_eq!(header.csrc_count, 0);
        assert!(header.marker);
        assert_eq!(header.payload_type, 0x60);
        assert_eq!(header.sequence, 0x0102);
        assert_eq!(header.timestamp, 0xDEAD_BEEF);
        assert_eq!(header.ssrc, 0x1234);
        assert_eq!(header.raw_timestamp, u32::from_ne_bytes([0xDE, 0xAD, 0xBE, 0xEF]));
        assert!(!header.is_frame_start());
    }

    #[test]
    fn short_datagram_is_malformed() {
        let result = PacketHeader::parse(&[0x80; 11]);
        assert!(matches!(result, Err(StreamError::MalformedPacket { .. })));
    }

    #[test]
    fn marker_is_most_significant_bit_of_second_byte() {
        let header = PacketHeader { marker: true, payload_type: 0x7F, ..Default::default() };
        let bytes = header.to_bytes();
        assert_eq!(bytes[1], 0xFF);

        let header = PacketHeader { marker: false, payload_type: 0x7F, ..Default::default() };
        assert_eq!(header.to_bytes()[1], 0x7F);
    }

    proptest! {
        #[test]
        fn any_twelve_bytes_parse_to_their_bit_fields(bytes in prop::array::uniform12(any::<u8>())) {
            let header = PacketHeader::parse(&bytes).unwrap();

            prop_assert_eq!(header.version, bytes[0] >> 6);
            prop_assert_eq!(header.csrc_count, bytes[0] & 0x0F);
            prop_assert_eq!(header.marker, bytes[1] >= 0x80);
            prop_assert_eq!(header.sequence as usize, (bytes[2] as usize) << 8 | bytes[3] as usize);
            prop_assert_eq!(header.timestamp.to_be_bytes(), [bytes[4], bytes[5], bytes[6], bytes[7]]);
            prop_assert_eq!(header.ssrc.to_be_bytes(), [bytes[8], bytes[9], bytes[10], bytes[11]]);
            prop_assert_eq!(header.to_bytes(), bytes);
        }
    }
}
