//! Shared helpers for loopback streaming tests.
//!
//! `depthlink::test_utils` is compiled only for unit tests and the `benchmark`
//! feature, so a plain `cargo test` cannot link it from here. The builders
//! below mirror it through the public `PacketHeader` API instead.

#![allow(dead_code)]

use depthlink::{Frame, PacketHeader, StreamConfig, UdpTransport};
use std::net::{SocketAddr, UdpSocket};
use std::sync::mpsc::{self, Receiver};
use std::time::{Duration, Instant};

pub const RECV_TIMEOUT: Duration = Duration::from_secs(2);

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Deterministic byte pattern without repeating 16- or 32-bit words.
pub fn test_pattern(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i.wrapping_mul(7).wrapping_add(3) % 251) as u8).collect()
}

pub fn datagram(sequence: u16, marker: bool, timestamp: u32, payload: &[u8]) -> Vec<u8> {
    let header =
        PacketHeader { version: 2, marker, payload_type: 96, sequence, timestamp, ..Default::default() };
    let mut out = header.to_bytes().to_vec();
    out.extend_from_slice(payload);
    out
}

/// Split a frame into datagrams of `chunk` payload bytes, marker on the last.
pub fn packetize(frame: &[u8], chunk: usize, timestamp: u32) -> Vec<Vec<u8>> {
    let count = frame.len().div_ceil(chunk);
    frame
        .chunks(chunk)
        .enumerate()
        .map(|(i, slice)| datagram(i as u16, i + 1 == count, timestamp, slice))
        .collect()
}

pub fn loopback_config() -> StreamConfig {
    StreamConfig::new("127.0.0.1", 0).with_local_address("127.0.0.1")
}

/// A camera stand-in sending to a bound transport.
pub struct Camera {
    socket: UdpSocket,
    target: SocketAddr,
}

impl Camera {
    pub fn new(target: SocketAddr) -> Self {
        let socket = UdpSocket::bind("127.0.0.1:0").unwrap();
        Self { socket, target }
    }

    pub fn send(&self, datagram: &[u8]) {
        self.socket.send_to(datagram, self.target).unwrap();
    }

    pub fn send_all(&self, datagrams: &[Vec<u8>]) {
        for datagram in datagrams {
            self.send(datagram);
        }
    }
}

/// Bind a loopback transport and a camera pointed at it.
pub fn bind_loopback(config: StreamConfig) -> (UdpTransport, Camera) {
    let transport = UdpTransport::bind(config).unwrap();
    let camera = Camera::new(transport.local_addr().unwrap());
    (transport, camera)
}

/// Callback forwarding frames into a channel.
pub fn frame_channel() -> (impl FnMut(Frame) + Send + 'static, Receiver<Frame>) {
    let (tx, rx) = mpsc::channel();
    let callback = move |frame: Frame| {
        let _ = tx.send(frame);
    };
    (callback, rx)
}

/// Poll `condition` until it holds or the timeout elapses.
pub fn wait_until(timeout: Duration, mut condition: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(5));
    }
    condition()
}
