//! Streaming client facade
//!
//! [`StreamingClient`] is the entry point the sensor layer uses for one camera
//! stream. It wraps a [`UdpTransport`] with a forgiving lifecycle: only
//! [`init`](StreamingClient::init) reports errors, while `start`, `stop` and
//! `close` log failures and carry on.
//!
//! ```rust,no_run
//! use depthlink::{StreamConfig, StreamKind, StreamProfile, StreamingClient};
//!
//! # fn main() -> depthlink::Result<()> {
//! let mut client = StreamingClient::new(StreamConfig::new("192.168.1.10", 8900));
//! client.init()?;
//!
//! let profile = StreamProfile::with_bytes_per_pixel(StreamKind::Depth, 640, 480, 30, 2);
//! client.start(Some(profile), |frame| {
//!     println!("frame {} ({} bytes)", frame.number, frame.data_size());
//! });
//!
//! // ...
//! client.close();
//! # Ok(())
//! # }
//! ```

use futures::stream::BoxStream;
use std::sync::Arc;
use tracing::{debug, error};

use crate::Result;
use crate::config::StreamConfig;
use crate::stream::frame_channel;
use crate::transport::{StatsSnapshot, UdpTransport};
use crate::types::{DefaultFrameFactory, Frame, FrameFactory, StreamProfile, UpdateRate};

/// Lifecycle facade over one UDP camera stream.
pub struct StreamingClient {
    config: StreamConfig,
    factory: Arc<dyn FrameFactory>,
    transport: Option<UdpTransport>,
}

impl std::fmt::Debug for StreamingClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamingClient")
            .field("config", &self.config)
            .field("transport", &self.transport)
            .finish_non_exhaustive()
    }
}

impl StreamingClient {
    /// Create an uninitialized client; no socket is opened yet.
    pub fn new(config: StreamConfig) -> Self {
        Self { config, factory: Arc::new(DefaultFrameFactory), transport: None }
    }

    /// Use a custom factory for output frames.
    pub fn with_frame_factory(mut self, factory: Arc<dyn FrameFactory>) -> Self {
        self.factory = factory;
        self
    }

    pub fn config(&self) -> &StreamConfig {
        &self.config
    }

    /// Open and bind the stream socket.
    ///
    /// Calling `init` on an initialized client does nothing.
    pub fn init(&mut self) -> Result<()> {
        if self.transport.is_some() {
            return Ok(());
        }

        let transport =
            UdpTransport::bind(self.config.clone())?.with_frame_factory(Arc::clone(&self.factory));
        self.transport = Some(transport);
        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        self.transport.is_some()
    }

    pub fn is_started(&self) -> bool {
        self.transport.as_ref().is_some_and(UdpTransport::is_started)
    }

    /// Port actually bound, once initialized.
    pub fn port(&self) -> Option<u16> {
        self.transport.as_ref().map(UdpTransport::port)
    }

    /// Start delivering frames to `callback`.
    ///
    /// Does nothing before [`init`](Self::init) or while already started.
    /// The callback runs on the stream's process thread.
    pub fn start<F>(&mut self, profile: Option<StreamProfile>, callback: F)
    where
        F: FnMut(Frame) + Send + 'static,
    {
        let Some(transport) = self.transport.as_mut() else {
            debug!("Stream start requested before init");
            return;
        };

        if let Err(error) = transport.start(profile, callback) {
            error!(%error, port = transport.port(), "Failed to start stream");
        }
    }

    /// Start the stream and observe it as an async stream of frames.
    ///
    /// Frames pass through a latest-wins channel, so a slow consumer skips
    /// frames rather than queueing them. `rate` throttles delivery below the
    /// profile's frame rate. The stream ends when the client stops, or
    /// immediately if the stream could not be started.
    pub fn start_stream(
        &mut self,
        profile: Option<StreamProfile>,
        rate: UpdateRate,
    ) -> BoxStream<'static, Arc<Frame>> {
        let source_fps = profile.map_or(0, |p| p.fps);
        let (sink, stream) = frame_channel(source_fps, rate);

        if self.is_started() {
            debug!("Stream already started, returning a closed frame stream");
            return stream;
        }

        self.start(profile, move |frame| sink.publish(frame));
        stream
    }

    /// Stop delivering frames; the socket stays open.
    pub fn stop(&mut self) {
        if let Some(transport) = self.transport.as_mut() {
            transport.stop();
        }
    }

    /// Stop and release the socket. The client may be initialized again.
    pub fn close(&mut self) {
        if let Some(mut transport) = self.transport.take() {
            transport.close();
        }
    }

    /// Counters of the current transport, once initialized.
    pub fn stats(&self) -> Option<StatsSnapshot> {
        self.transport.as_ref().map(UdpTransport::stats)
    }
}
