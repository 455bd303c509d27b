//! Frame reassembly from loss-prone packet streams.
//!
//! One [`FrameReassembler`] exists per active stream and is owned by the
//! process thread. Its buffer is allocated once and reused for every frame.
//!
//! # State Machine
//!
//! ```text
//!            seq == 0 (from any state)
//!   Idle ──────────────────────────▶ Assembling ──marker, count ok──▶ Complete
//!    ▲                                   │    └────marker, count bad──▶ Error
//!    └──── reset() / overflow / out-of-bounds write ◀────────────────────┘
//! ```
//!
//! # Packet Placement
//!
//! Packet `n` of a frame lands at `HEADER_LEN + n × stride`, where `stride` is
//! the payload length of the start-of-frame packet. Full-size senders use
//! [`PACKET_PAYLOAD_CAPACITY`]. Every write is checked against the sequence
//! limit and the buffer bounds before copying; a packet that would land
//! outside the buffer aborts the frame instead.
//!
//! # Completion
//!
//! A frame completes when the marker packet's sequence number matches the
//! number of packets received. Lost or duplicated packets therefore surface
//! as [`AssemblyState::Error`] and the frame is never partially delivered.
//! Completion normalizes byte order exactly once: the metadata block as 32-bit
//! words and, for depth streams, the payload as 16-bit words.

use tracing::{debug, trace};

use crate::StreamError;
use crate::protocol::{
    FRAME_DATA_OFFSET, HEADER_LEN, MAX_PACKET_COUNT, METADATA_LEN, METADATA_OFFSET,
    PACKET_PAYLOAD_CAPACITY, PacketHeader, swap_u16_words, swap_u32_words,
};
use crate::types::StreamKind;

/// Total reassembly buffer length, including the leading header pad.
pub const BUFFER_LEN: usize = HEADER_LEN + MAX_PACKET_COUNT * PACKET_PAYLOAD_CAPACITY;

/// Reassembly progress of the frame in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AssemblyState {
    /// Waiting for a start-of-frame packet
    #[default]
    Idle,
    /// Start-of-frame seen, collecting packets
    Assembling,
    /// Marker packet seen with a consistent packet count
    Complete,
    /// Marker packet seen but packets were lost or duplicated
    Error,
}

/// Per-stream frame reassembly state machine.
pub struct FrameReassembler {
    buffer: Box<[u8]>,
    state: AssemblyState,
    /// Packets accepted for the current frame
    received: usize,
    /// Payload bytes written for the current frame (metadata included)
    written: usize,
    /// Byte placement stride learned from the start-of-frame packet
    stride: usize,
    /// Highest buffer offset written since the last clear
    dirty_len: usize,
    timestamp: u32,
    frame_number: u64,
    last_error: Option<StreamError>,
}

impl Default for FrameReassembler {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for FrameReassembler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameReassembler")
            .field("state", &self.state)
            .field("received", &self.received)
            .field("written", &self.written)
            .field("stride", &self.stride)
            .field("timestamp", &self.timestamp)
            .field("frame_number", &self.frame_number)
            .finish()
    }
}

impl FrameReassembler {
    /// Allocate a reassembler sized for the largest frame the protocol carries.
    pub fn new() -> Self {
        Self {
            buffer: vec![0u8; BUFFER_LEN].into_boxed_slice(),
            state: AssemblyState::Idle,
            received: 0,
            written: 0,
            stride: PACKET_PAYLOAD_CAPACITY,
            dirty_len: 0,
            timestamp: 0,
            frame_number: 0,
            last_error: None,
        }
    }

    /// Feed one datagram into the state machine.
    ///
    /// `datagram` is the full packet as received, header included, and `header`
    /// its parsed form. Returns `false` when the packet was dropped: no frame
    /// start has been seen yet, or the frame was aborted by this packet. Check
    /// [`is_complete`](Self::is_complete) and [`is_error`](Self::is_error)
    /// after every accepted packet.
    pub fn process(&mut self, header: &PacketHeader, datagram: &[u8], kind: StreamKind) -> bool {
        let payload = datagram.get(HEADER_LEN..).unwrap_or_default();

        if header.is_frame_start() {
            self.clear_buffer();
            self.state = AssemblyState::Assembling;
            self.received = 0;
            self.written = 0;
            self.last_error = None;
            self.timestamp = header.timestamp;
            // A header-only start packet carries no stride; assume full-size packets
            self.stride = match payload.len() {
                0 => PACKET_PAYLOAD_CAPACITY,
                len => len.min(PACKET_PAYLOAD_CAPACITY),
            };
        }

        if self.state != AssemblyState::Assembling {
            trace!(sequence = header.sequence, state = ?self.state, "Dropping packet outside a frame");
            return false;
        }

        self.received += 1;
        if self.received > MAX_PACKET_COUNT {
            self.abort(StreamError::sequence_overflow(self.received, MAX_PACKET_COUNT));
            return false;
        }

        if let Err(error) = self.write_payload(header.sequence, payload) {
            self.abort(error);
            return false;
        }

        if header.marker {
            self.finish_frame(header.sequence, kind);
        }

        true
    }

    /// Copy a packet payload into its slot after checking every bound.
    fn write_payload(&mut self, sequence: u16, payload: &[u8]) -> Result<(), StreamError> {
        let index = usize::from(sequence);
        let offset = HEADER_LEN + index * self.stride;
        let out_of_bounds =
            || StreamError::PayloadOutOfBounds { sequence, offset, len: payload.len() };

        if index >= MAX_PACKET_COUNT || payload.len() > self.stride {
            return Err(out_of_bounds());
        }

        let end = offset.checked_add(payload.len()).ok_or_else(out_of_bounds)?;
        let slot = self.buffer.get_mut(offset..end).ok_or_else(out_of_bounds)?;
        slot.copy_from_slice(payload);

        self.written += payload.len();
        self.dirty_len = self.dirty_len.max(end);
        Ok(())
    }

    fn finish_frame(&mut self, sequence: u16, kind: StreamKind) {
        let expected = usize::from(sequence) + 1;
        if self.received != expected {
            debug!(
                received = self.received,
                expected,
                timestamp = self.timestamp,
                "Frame incomplete at marker packet"
            );
            self.last_error =
                Some(StreamError::PacketCountMismatch { received: self.received, expected });
            self.state = AssemblyState::Error;
            return;
        }

        swap_u32_words(&mut self.buffer[METADATA_OFFSET..FRAME_DATA_OFFSET]);
        if kind.is_big_endian_u16() {
            let end = FRAME_DATA_OFFSET + self.frame_data_len();
            swap_u16_words(&mut self.buffer[FRAME_DATA_OFFSET..end]);
        }

        self.state = AssemblyState::Complete;
        self.frame_number += 1;
        trace!(
            frame_number = self.frame_number,
            packets = self.received,
            bytes = self.written,
            "Frame complete"
        );
    }

    fn abort(&mut self, error: StreamError) {
        debug!(%error, received = self.received, "Aborting frame");
        self.reset();
        self.last_error = Some(error);
    }

    fn clear_buffer(&mut self) {
        // Bytes beyond dirty_len were never written since the last clear
        self.buffer[..self.dirty_len].fill(0);
        self.dirty_len = 0;
    }

    fn frame_data_len(&self) -> usize {
        self.written.saturating_sub(METADATA_LEN)
    }

    /// Return to [`AssemblyState::Idle`], zeroing the buffer and packet count.
    ///
    /// The frame counter and last captured timestamp persist.
    pub fn reset(&mut self) {
        self.clear_buffer();
        self.state = AssemblyState::Idle;
        self.received = 0;
        self.written = 0;
        self.last_error = None;
    }

    pub fn state(&self) -> AssemblyState {
        self.state
    }

    pub fn is_complete(&self) -> bool {
        self.state == AssemblyState::Complete
    }

    pub fn is_error(&self) -> bool {
        self.state == AssemblyState::Error
    }

    /// Reason the last frame failed, until the next reset or frame start.
    pub fn last_error(&self) -> Option<&StreamError> {
        self.last_error.as_ref()
    }

    /// Normalized payload of the completed frame.
    pub fn frame_data(&self) -> Option<&[u8]> {
        self.is_complete()
            .then(|| &self.buffer[FRAME_DATA_OFFSET..FRAME_DATA_OFFSET + self.frame_data_len()])
    }

    /// Payload size of the frame in flight.
    pub fn frame_data_size(&self) -> usize {
        self.frame_data_len()
    }

    /// Normalized metadata block of the completed frame.
    ///
    /// The block is swapped once at completion, so repeated reads agree.
    pub fn metadata(&self) -> Option<&[u8]> {
        self.is_complete().then(|| &self.buffer[METADATA_OFFSET..FRAME_DATA_OFFSET])
    }

    pub fn metadata_size(&self) -> usize {
        METADATA_LEN
    }

    /// Header timestamp captured at the last start-of-frame packet.
    pub fn timestamp(&self) -> u32 {
        self.timestamp
    }

    /// Number of frames completed since creation.
    pub fn frame_number(&self) -> u64 {
        self.frame_number
    }

    /// Packets accepted for the frame in flight.
    pub fn received_packets(&self) -> usize {
        self.received
    }
}
