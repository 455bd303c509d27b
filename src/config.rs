//! Stream configuration
//!
//! Configuration is passed explicitly into [`UdpTransport::bind`](crate::UdpTransport::bind)
//! and [`StreamingClient::new`](crate::StreamingClient::new). It can be built in
//! code or loaded from YAML:
//!
//! ```rust
//! use depthlink::StreamConfig;
//!
//! let config = StreamConfig::from_yaml_str(
//!     r#"
//! peer_address: 192.168.1.10
//! port: 8900
//! queue:
//!   capacity: 4096
//!   overflow: drop_oldest
//! "#,
//! )?;
//! assert_eq!(config.port, 8900);
//! assert_eq!(config.recv_timeout_ms, 100);
//! # Ok::<(), depthlink::StreamError>(())
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::net::{IpAddr, SocketAddr};
use std::path::Path;
use std::time::Duration;

use crate::queue::OverflowPolicy;
use crate::{Result, StreamError};

/// Default base port the camera streams to.
pub const DEFAULT_PORT: u16 = 8900;

/// Default socket receive buffer (4 MiB).
pub const DEFAULT_RECV_BUFFER_SIZE: usize = 4 * 1024 * 1024;

/// Packet queue settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct QueueConfig {
    /// Maximum buffered datagrams; `None` leaves the queue unbounded
    pub capacity: Option<usize>,
    /// What to discard when a bounded queue is full
    pub overflow: OverflowPolicy,
}

/// Configuration for one UDP stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamConfig {
    /// Local interface address to bind
    pub local_address: String,
    /// Camera address; datagrams from any other source IP are discarded
    pub peer_address: String,
    /// Requested local port; the bound port may differ after a conflict
    pub port: u16,
    /// Socket receive buffer size in bytes
    pub recv_buffer_size: usize,
    /// Socket receive timeout, bounding shutdown latency
    pub recv_timeout_ms: u64,
    /// Bind attempts before giving up on address conflicts
    pub max_bind_attempts: u32,
    /// Minimum interval between repeated receive-error log lines
    pub log_interval_ms: u64,
    pub queue: QueueConfig,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            local_address: "0.0.0.0".to_string(),
            peer_address: String::new(),
            port: DEFAULT_PORT,
            recv_buffer_size: DEFAULT_RECV_BUFFER_SIZE,
            recv_timeout_ms: 100,
            max_bind_attempts: 16,
            log_interval_ms: 5000,
            queue: QueueConfig::default(),
        }
    }
}

impl StreamConfig {
    /// Configuration for a camera at `peer_address` streaming to `port` on any interface.
    pub fn new(peer_address: impl Into<String>, port: u16) -> Self {
        Self { peer_address: peer_address.into(), port, ..Self::default() }
    }

    /// Set the local interface address.
    pub fn with_local_address(mut self, local_address: impl Into<String>) -> Self {
        self.local_address = local_address.into();
        self
    }

    /// Bound the packet queue.
    pub fn with_queue_capacity(mut self, capacity: usize, overflow: OverflowPolicy) -> Self {
        self.queue = QueueConfig { capacity: Some(capacity), overflow };
        self
    }

    /// Parse and validate a YAML configuration.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml_ng::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a YAML configuration file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let yaml = fs::read_to_string(&path).map_err(|source| StreamError::ConfigFile {
            path: path.as_ref().to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&yaml)
    }

    /// Check addresses parse and timing values are usable.
    pub fn validate(&self) -> Result<()> {
        self.local_ip()?;

        if self.peer_address.parse::<IpAddr>().is_err() {
            return Err(StreamError::config(format!(
                "peer_address '{}' is not an IP address",
                self.peer_address
            )));
        }

        if self.recv_timeout_ms == 0 {
            return Err(StreamError::config("recv_timeout_ms must be greater than zero"));
        }

        if self.max_bind_attempts == 0 {
            return Err(StreamError::config("max_bind_attempts must be at least 1"));
        }

        if self.queue.capacity == Some(0) {
            return Err(StreamError::config("queue capacity must be at least 1"));
        }

        Ok(())
    }

    /// Local interface address as an IP.
    pub fn local_ip(&self) -> Result<IpAddr> {
        self.local_address.parse::<IpAddr>().map_err(|e| {
            StreamError::config_with_source(
                format!("local_address '{}' is not an IP address", self.local_address),
                Box::new(e),
            )
        })
    }

    /// Socket address for a bind attempt on `port`.
    pub fn bind_addr(&self, port: u16) -> Result<SocketAddr> {
        Ok(SocketAddr::new(self.local_ip()?, port))
    }

    pub fn recv_timeout(&self) -> Duration {
        Duration::from_millis(self.recv_timeout_ms)
    }

    pub fn log_interval(&self) -> Duration {
        Duration::from_millis(self.log_interval_ms)
    }
}
