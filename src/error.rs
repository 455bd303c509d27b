//! Error types for the streaming client.
//!
//! All errors implement `std::error::Error` and carry structured context for
//! debugging and recovery guidance.
//!
//! ## Error Categories
//!
//! - **Setup Errors**: socket creation, bind and configuration failures. These
//!   are fatal and surface from [`UdpTransport::bind`](crate::UdpTransport::bind).
//! - **Receive Errors**: socket receive failures on the ingest thread. Logged at
//!   a rate-limited interval, never returned to the caller.
//! - **Frame Errors**: per-frame reassembly failures (sequence overflow, packet
//!   count mismatch, out-of-bounds payloads, size mismatches). The frame is
//!   dropped and the reassembler returns to idle.
//!
//! ## Recovery and Retry
//!
//! ```rust
//! use depthlink::StreamError;
//!
//! let error = StreamError::sequence_overflow(5684, 5683);
//! assert!(error.is_retryable());
//! for suggestion in error.recovery_suggestions() {
//!     println!("  - {}", suggestion);
//! }
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for streaming operations.
pub type Result<T, E = StreamError> = std::result::Result<T, E>;

/// Main error type for streaming operations.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum StreamError {
    #[error("Socket setup failed: {operation}")]
    Socket {
        operation: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to bind UDP socket to {addr}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    #[error("No free port after {attempts} bind attempts starting at {first_port}")]
    BindExhausted { first_port: u16, attempts: u32 },

    #[error("UDP receive failed")]
    Receive {
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed packet: {details}")]
    MalformedPacket { details: String },

    #[error("Sequence overflow: {received} packets exceed capacity of {max}")]
    SequenceOverflow { received: usize, max: usize },

    #[error("Packet count mismatch: received {received}, expected {expected}")]
    PacketCountMismatch { received: usize, expected: usize },

    #[error("Payload out of bounds: sequence {sequence}, {len} bytes at offset {offset:#x}")]
    PayloadOutOfBounds { sequence: u16, offset: usize, len: usize },

    #[error("Decoded frame size {actual} exceeds declared size {declared}")]
    DeclaredSizeMismatch { actual: usize, declared: usize },

    #[error("Configuration error: {reason}")]
    Config {
        reason: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Configuration file error: {path}")]
    ConfigFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to spawn {thread} thread")]
    ThreadSpawn {
        thread: String,
        #[source]
        source: std::io::Error,
    },
}

impl StreamError {
    /// Returns whether this error is potentially recoverable through retry.
    ///
    /// Per-frame errors are always recoverable: the next start-of-frame packet
    /// begins a fresh frame.
    pub fn is_retryable(&self) -> bool {
        match self {
            StreamError::Socket { .. } => false,
            StreamError::Bind { .. } => false,
            StreamError::BindExhausted { .. } => true,
            StreamError::Receive { .. } => true,
            StreamError::MalformedPacket { .. } => true,
            StreamError::SequenceOverflow { .. } => true,
            StreamError::PacketCountMismatch { .. } => true,
            StreamError::PayloadOutOfBounds { .. } => true,
            StreamError::DeclaredSizeMismatch { .. } => true,
            StreamError::Config { .. } => false,
            StreamError::ConfigFile { .. } => false,
            StreamError::ThreadSpawn { .. } => true,
        }
    }

    /// Returns whether this error only affects a single frame.
    pub fn is_frame_local(&self) -> bool {
        matches!(
            self,
            StreamError::MalformedPacket { .. }
                | StreamError::SequenceOverflow { .. }
                | StreamError::PacketCountMismatch { .. }
                | StreamError::PayloadOutOfBounds { .. }
                | StreamError::DeclaredSizeMismatch { .. }
        )
    }

    /// Returns suggested recovery actions for this error.
    pub fn recovery_suggestions(&self) -> Vec<&'static str> {
        match self {
            StreamError::Socket { .. } => vec![
                "Check the process may open UDP sockets",
                "Verify the local address belongs to this host",
                "Check system socket buffer limits",
            ],
            StreamError::Bind { .. } => vec![
                "Verify the local address is assigned to an interface",
                "Use a port above 1024 or run with sufficient privileges",
            ],
            StreamError::BindExhausted { .. } => vec![
                "Close other streams using the same port range",
                "Increase max_bind_attempts in the stream configuration",
                "Pick a different base port",
            ],
            StreamError::Receive { .. } => vec![
                "Check the network link to the camera",
                "Verify firewall rules allow inbound UDP",
            ],
            StreamError::MalformedPacket { .. } => vec![
                "Verify the camera firmware speaks the expected framing protocol",
                "Check that no other sender targets this port",
            ],
            StreamError::SequenceOverflow { .. } | StreamError::PayloadOutOfBounds { .. } => vec![
                "Check the stream resolution does not exceed the supported maximum",
                "Verify the camera firmware version",
            ],
            StreamError::PacketCountMismatch { .. } => vec![
                "Increase the socket receive buffer size",
                "Reduce stream resolution or frame rate",
                "Check for packet loss on the network link",
            ],
            StreamError::DeclaredSizeMismatch { .. } => vec![
                "Verify the stream profile matches the camera's active mode",
                "Restart the stream after changing resolution",
            ],
            StreamError::Config { .. } | StreamError::ConfigFile { .. } => vec![
                "Check the configuration file exists and is readable",
                "Verify addresses and ports are valid",
            ],
            StreamError::ThreadSpawn { .. } => vec![
                "Check system thread limits",
                "Stop unused streams before starting new ones",
            ],
        }
    }

    /// Helper constructor for socket setup errors.
    pub fn socket(operation: impl Into<String>, source: std::io::Error) -> Self {
        StreamError::Socket { operation: operation.into(), source }
    }

    /// Helper constructor for malformed packet errors.
    pub fn malformed_packet(details: impl Into<String>) -> Self {
        StreamError::MalformedPacket { details: details.into() }
    }

    /// Helper constructor for sequence overflow errors.
    pub fn sequence_overflow(received: usize, max: usize) -> Self {
        StreamError::SequenceOverflow { received, max }
    }

    /// Helper constructor for configuration errors.
    pub fn config(reason: impl Into<String>) -> Self {
        StreamError::Config { reason: reason.into(), source: None }
    }

    /// Helper constructor for configuration errors with source.
    pub fn config_with_source(
        reason: impl Into<String>,
        source: Box<dyn std::error::Error + Send + Sync>,
    ) -> Self {
        StreamError::Config { reason: reason.into(), source: Some(source) }
    }
}

impl From<serde_yaml_ng::Error> for StreamError {
    fn from(err: serde_yaml_ng::Error) -> Self {
        StreamError::config_with_source("Invalid YAML configuration", Box::new(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn error_messages_format_correctly_with_arbitrary_context(
            details in ".*",
            received in 0usize..10_000,
            max in 0usize..10_000,
            sequence in any::<u16>(),
            offset in 0usize..0x100_0000,
        ) {
            let malformed = StreamError::malformed_packet(details.clone());
            prop_assert!(malformed.to_string().contains(&details));

            let overflow = StreamError::sequence_overflow(received, max);
            let msg = overflow.to_string();
            prop_assert!(msg.contains(&received.to_string()));
            prop_assert!(msg.contains(&max.to_string()));

            let bounds = StreamError::PayloadOutOfBounds { sequence, offset, len: 1460 };
            let hex = format!("{offset:#x}");
            prop_assert!(bounds.to_string().contains(&hex));
        }
    }

    #[test]
    fn frame_errors_are_retryable_and_local() {
        let errors = [
            StreamError::sequence_overflow(10, 5),
            StreamError::PacketCountMismatch { received: 2, expected: 3 },
            StreamError::PayloadOutOfBounds { sequence: 9, offset: 0, len: 0 },
            StreamError::DeclaredSizeMismatch { actual: 10, declared: 5 },
        ];

        for error in &errors {
            assert!(error.is_retryable());
            assert!(error.is_frame_local());
            assert!(!error.recovery_suggestions().is_empty());
        }
    }

    #[test]
    fn setup_errors_are_fatal() {
        let addr: SocketAddr = "127.0.0.1:8900".parse().unwrap();
        let bind = StreamError::Bind {
            addr,
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert!(!bind.is_retryable());
        assert!(!bind.is_frame_local());
        assert!(bind.to_string().contains("127.0.0.1:8900"));

        let config = StreamError::config("peer address missing");
        assert!(!config.is_retryable());
    }

    #[test]
    fn source_chain_is_preserved() {
        let io = std::io::Error::new(std::io::ErrorKind::AddrNotAvailable, "no such address");
        let error = StreamError::socket("set_read_timeout", io);
        let source = std::error::Error::source(&error).expect("socket error has a source");
        assert_eq!(source.to_string(), "no such address");
    }

    #[test]
    fn error_traits_validation() {
        fn assert_send_sync_static<T: Send + Sync + 'static>() {}
        assert_send_sync_static::<StreamError>();
    }

    #[test]
    fn yaml_errors_convert_to_config() {
        let err = serde_yaml_ng::from_str::<u32>("not: [a number").unwrap_err();
        let converted: StreamError = err.into();
        assert!(matches!(converted, StreamError::Config { source: Some(_), .. }));
    }
}
