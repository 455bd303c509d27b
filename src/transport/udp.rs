//! UDP stream transport
//!
//! Owns the socket and the two worker threads of an active stream:
//!
//! - the **receive thread** reads datagrams with a bounded timeout, filters by
//!   peer address and pushes copies onto the [`PacketQueue`];
//! - the **process thread** pops datagrams, drives the [`FrameReassembler`]
//!   and invokes the frame callback synchronously.
//!
//! The queue is the only state the two threads share besides atomic counters.
//! Shutdown flips the running flag, joins the receive thread (at most one
//! receive timeout later), destroys the queue to release the process thread
//! and joins it.

use std::io::ErrorKind;
use std::net::{IpAddr, SocketAddr, UdpSocket};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tracing::{debug, error, info, trace, warn};

use super::socket::bind_with_retry;
use super::stats::{StatsSnapshot, StreamStats};
use crate::config::StreamConfig;
use crate::protocol::{HEADER_LEN, PacketHeader, RECV_BUFFER_LEN};
use crate::queue::PacketQueue;
use crate::reassembly::{AssemblyState, FrameReassembler};
use crate::types::{
    DefaultFrameFactory, Frame, FrameFactory, FrameParts, StreamProfile, system_time_us,
};
use crate::{Result, StreamError};

/// Callback receiving completed frames on the process thread.
pub type FrameCallback = Box<dyn FnMut(Frame) + Send + 'static>;

/// Accepts datagrams whose source IP renders exactly as the configured peer string.
#[derive(Debug, Clone, Copy)]
struct PeerFilter {
    /// `None` when the configured string is not a canonical IP, so nothing matches
    peer: Option<IpAddr>,
}

impl PeerFilter {
    fn new(peer_address: &str) -> Self {
        let peer = peer_address.parse::<IpAddr>().ok().filter(|ip| ip.to_string() == peer_address);
        Self { peer }
    }

    fn accepts(&self, source: &SocketAddr) -> bool {
        self.peer == Some(source.ip())
    }
}

/// Emits at most one log line per interval and counts what it swallowed.
#[derive(Debug)]
struct LogLimiter {
    interval: Duration,
    last: Option<Instant>,
    suppressed: u64,
}

impl LogLimiter {
    fn new(interval: Duration) -> Self {
        Self { interval, last: None, suppressed: 0 }
    }

    /// Returns the number of suppressed events when a line should be logged.
    fn check(&mut self) -> Option<u64> {
        let now = Instant::now();
        match self.last {
            Some(last) if now.duration_since(last) < self.interval => {
                self.suppressed += 1;
                None
            }
            _ => {
                self.last = Some(now);
                Some(std::mem::take(&mut self.suppressed))
            }
        }
    }
}

struct Workers {
    receive: JoinHandle<()>,
    process: JoinHandle<()>,
}

/// UDP transport for one camera stream.
pub struct UdpTransport {
    config: StreamConfig,
    socket: Option<Arc<UdpSocket>>,
    port: u16,
    queue: Arc<PacketQueue>,
    running: Arc<AtomicBool>,
    stats: Arc<StreamStats>,
    factory: Arc<dyn FrameFactory>,
    workers: Option<Workers>,
}

impl std::fmt::Debug for UdpTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UdpTransport")
            .field("port", &self.port)
            .field("peer", &self.config.peer_address)
            .field("open", &self.socket.is_some())
            .field("started", &self.workers.is_some())
            .finish()
    }
}

impl UdpTransport {
    /// Create and bind the stream socket.
    ///
    /// Address conflicts are retried on `port + 2`; see
    /// [`bind_with_retry`](super::bind_with_retry). All other failures are
    /// returned to the caller.
    pub fn bind(config: StreamConfig) -> Result<Self> {
        config.validate()?;

        let socket = bind_with_retry(&config)?;
        let local = socket.local_addr().map_err(|e| StreamError::socket("local_addr", e))?;

        info!(local = %local, peer = %config.peer_address, "UDP stream socket bound");

        let queue = PacketQueue::with_capacity(config.queue.capacity, config.queue.overflow);

        Ok(Self {
            config,
            socket: Some(Arc::new(socket)),
            port: local.port(),
            queue: Arc::new(queue),
            running: Arc::new(AtomicBool::new(false)),
            stats: Arc::new(StreamStats::default()),
            factory: Arc::new(DefaultFrameFactory),
            workers: None,
        })
    }

    /// Replace the factory used to build output frames.
    pub fn with_frame_factory(mut self, factory: Arc<dyn FrameFactory>) -> Self {
        self.factory = factory;
        self
    }

    /// Port the socket is actually bound to.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Local socket address, or `None` once closed.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.socket.as_ref().and_then(|s| s.local_addr().ok())
    }

    pub fn peer_address(&self) -> &str {
        &self.config.peer_address
    }

    pub fn is_started(&self) -> bool {
        self.workers.is_some()
    }

    pub fn is_open(&self) -> bool {
        self.socket.is_some()
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot(self.queue.len(), self.queue.dropped())
    }

    /// Start receiving and delivering frames.
    ///
    /// With a `profile`, datagrams are reassembled into frames of that kind.
    /// Without one, every datagram becomes its own frame (IMU path).
    /// Does nothing if already started or closed.
    pub fn start<F>(&mut self, profile: Option<StreamProfile>, callback: F) -> Result<()>
    where
        F: FnMut(Frame) + Send + 'static,
    {
        if self.workers.is_some() {
            debug!(port = self.port, "Stream already started");
            return Ok(());
        }
        let Some(socket) = self.socket.as_ref().map(Arc::clone) else {
            debug!(port = self.port, "Stream socket closed, not starting");
            return Ok(());
        };

        self.queue.reset();
        self.running.store(true, Ordering::Release);

        let receiver = Receiver {
            socket,
            filter: PeerFilter::new(&self.config.peer_address),
            queue: Arc::clone(&self.queue),
            running: Arc::clone(&self.running),
            stats: Arc::clone(&self.stats),
            log_interval: self.config.log_interval(),
            port: self.port,
        };
        let receive = thread::Builder::new()
            .name(format!("depthlink-rx-{}", self.port))
            .spawn(move || receiver.run())
            .map_err(|source| {
                self.running.store(false, Ordering::Release);
                StreamError::ThreadSpawn { thread: "receive".to_string(), source }
            })?;

        let processor = Processor {
            profile,
            callback: Box::new(callback),
            factory: Arc::clone(&self.factory),
            queue: Arc::clone(&self.queue),
            running: Arc::clone(&self.running),
            stats: Arc::clone(&self.stats),
        };
        let process = match thread::Builder::new()
            .name(format!("depthlink-proc-{}", self.port))
            .spawn(move || processor.run())
        {
            Ok(handle) => handle,
            Err(source) => {
                self.running.store(false, Ordering::Release);
                let _ = receive.join();
                return Err(StreamError::ThreadSpawn { thread: "process".to_string(), source });
            }
        };

        self.workers = Some(Workers { receive, process });

        match profile {
            Some(profile) => info!(port = self.port, %profile, "Stream started"),
            None => info!(port = self.port, "Non-video stream started"),
        }
        Ok(())
    }

    /// Stop both worker threads. Safe to call repeatedly or before `start`.
    pub fn stop(&mut self) {
        let Some(workers) = self.workers.take() else {
            return;
        };

        self.running.store(false, Ordering::Release);
        if workers.receive.join().is_err() {
            error!(port = self.port, "Receive thread panicked");
        }

        self.queue.destroy();
        if workers.process.join().is_err() {
            error!(port = self.port, "Process thread panicked");
        }

        info!(port = self.port, "Stream stopped");
    }

    /// Stop and release the socket. Safe to call repeatedly.
    pub fn close(&mut self) {
        self.stop();
        if self.socket.take().is_some() {
            info!(port = self.port, "Stream socket closed");
        }
    }
}

impl Drop for UdpTransport {
    fn drop(&mut self) {
        self.close();
    }
}

/// Receive-thread state.
struct Receiver {
    socket: Arc<UdpSocket>,
    filter: PeerFilter,
    queue: Arc<PacketQueue>,
    running: Arc<AtomicBool>,
    stats: Arc<StreamStats>,
    log_interval: Duration,
    port: u16,
}

impl Receiver {
    fn run(self) {
        debug!(port = self.port, "Receive thread started");
        let mut buffer = [0u8; RECV_BUFFER_LEN];
        let mut timeouts = LogLimiter::new(self.log_interval);
        let mut failures = LogLimiter::new(self.log_interval);

        while self.running.load(Ordering::Acquire) {
            match self.socket.recv_from(&mut buffer) {
                Ok((len, source)) => {
                    if !self.filter.accepts(&source) {
                        self.stats.datagrams_filtered();
                        trace!(%source, len, "Discarding datagram from unexpected source");
                        continue;
                    }
                    self.stats.datagrams_received();
                    self.queue.push(buffer[..len].to_vec());
                }
                Err(e) if matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) => {
                    if let Some(suppressed) = timeouts.check() {
                        debug!(port = self.port, suppressed, "No datagrams within receive timeout");
                    }
                }
                Err(e) => {
                    self.stats.receive_errors();
                    if let Some(suppressed) = failures.check() {
                        let error = StreamError::Receive { source: e };
                        warn!(port = self.port, %error, suppressed, "UDP receive failed");
                    }
                }
            }
        }

        debug!(port = self.port, "Receive thread exiting");
    }
}

/// Process-thread state; sole owner of the reassembler.
struct Processor {
    profile: Option<StreamProfile>,
    callback: FrameCallback,
    factory: Arc<dyn FrameFactory>,
    queue: Arc<PacketQueue>,
    running: Arc<AtomicBool>,
    stats: Arc<StreamStats>,
}

impl Processor {
    fn run(mut self) {
        debug!("Process thread started");
        let mut reassembler = self.profile.map(|_| FrameReassembler::new());

        while self.running.load(Ordering::Acquire) {
            let Some(datagram) = self.queue.pop() else {
                break;
            };

            let header = match PacketHeader::parse(&datagram) {
                Ok(header) => header,
                Err(error) => {
                    self.stats.datagrams_malformed();
                    trace!(%error, "Dropping malformed datagram");
                    continue;
                }
            };

            match (self.profile, reassembler.as_mut()) {
                (Some(profile), Some(reassembler)) => {
                    self.handle_video_packet(&profile, reassembler, &header, &datagram)
                }
                _ => self.deliver_raw(&header, &datagram),
            }
        }

        debug!("Process thread exiting");
    }

    fn handle_video_packet(
        &mut self,
        profile: &StreamProfile,
        reassembler: &mut FrameReassembler,
        header: &PacketHeader,
        datagram: &[u8],
    ) {
        let in_frame =
            header.is_frame_start() || reassembler.state() == AssemblyState::Assembling;

        if !reassembler.process(header, datagram, profile.kind) {
            if in_frame {
                self.stats.frames_aborted();
                if let Some(error) = reassembler.last_error() {
                    warn!(%error, kind = %profile.kind, "Frame aborted");
                }
            }
            return;
        }

        if reassembler.is_complete() {
            self.deliver_frame(profile, reassembler);
            reassembler.reset();
        } else if reassembler.is_error() {
            self.stats.frames_incomplete();
            if let Some(error) = reassembler.last_error() {
                warn!(%error, kind = %profile.kind, "Dropping incomplete frame");
            }
            reassembler.reset();
        }
    }

    fn deliver_frame(&mut self, profile: &StreamProfile, reassembler: &FrameReassembler) {
        let actual = reassembler.frame_data_size();
        if actual > profile.frame_size {
            self.stats.frames_oversized();
            let error = StreamError::DeclaredSizeMismatch { actual, declared: profile.frame_size };
            warn!(%error, %profile, "Dropping frame larger than its profile");
            return;
        }

        let (Some(metadata), Some(data)) = (reassembler.metadata(), reassembler.frame_data()) else {
            return;
        };

        let parts = FrameParts {
            metadata: metadata.to_vec(),
            data: data.to_vec(),
            timestamp: u64::from(reassembler.timestamp()),
            number: reassembler.frame_number(),
            system_timestamp_us: system_time_us(),
        };
        let frame = self.factory.create_frame(Some(profile), parts);

        trace!(number = frame.number, size = frame.data_size(), "Delivering frame");
        // Counter is updated before the callback runs
        self.stats.frames_delivered();
        (self.callback)(frame);
    }

    /// Non-video path: one frame per datagram, header stripped, no swapping.
    fn deliver_raw(&mut self, header: &PacketHeader, datagram: &[u8]) {
        let parts = FrameParts {
            data: datagram[HEADER_LEN..].to_vec(),
            timestamp: u64::from(header.raw_timestamp),
            system_timestamp_us: system_time_us(),
            ..Default::default()
        };
        let frame = self.factory.create_frame(None, parts);

        self.stats.frames_delivered();
        (self.callback)(frame);
    }
}
