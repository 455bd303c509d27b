//! Synthetic packet builders for tests and benchmarks
//!
//! These helpers produce datagrams exactly as a camera would send them, so
//! reassembly can be exercised without hardware.

#![cfg(any(test, feature = "benchmark"))]

use crate::protocol::PacketHeader;

/// Payload type the helpers stamp into generated headers.
pub const TEST_PAYLOAD_TYPE: u8 = 96;

/// SSRC the helpers stamp into generated headers.
pub const TEST_SSRC: u32 = 0x5EED_CAFE;

/// Deterministic byte pattern without repeating 16- or 32-bit words.
pub fn test_pattern(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i.wrapping_mul(7).wrapping_add(3) % 251) as u8).collect()
}

/// Build one datagram: framing header followed by `payload`.
pub fn build_datagram(sequence: u16, marker: bool, timestamp: u32, payload: &[u8]) -> Vec<u8> {
    let header = PacketHeader {
        version: 2,
        marker,
        payload_type: TEST_PAYLOAD_TYPE,
        sequence,
        timestamp,
        ssrc: TEST_SSRC,
        ..Default::default()
    };

    let mut datagram = Vec::with_capacity(header.to_bytes().len() + payload.len());
    datagram.extend_from_slice(&header.to_bytes());
    datagram.extend_from_slice(payload);
    datagram
}

/// Split a frame (metadata included) into datagrams of `chunk` payload bytes.
///
/// Sequence numbers start at 0 and only the last datagram carries the marker.
pub fn packetize(frame: &[u8], chunk: usize, timestamp: u32) -> Vec<Vec<u8>> {
    let count = frame.len().div_ceil(chunk).max(1);
    if frame.is_empty() {
        return vec![build_datagram(0, true, timestamp, &[])];
    }

    frame
        .chunks(chunk)
        .enumerate()
        .map(|(i, slice)| build_datagram(i as u16, i + 1 == count, timestamp, slice))
        .collect()
}
