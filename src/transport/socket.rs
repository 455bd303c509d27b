//! UDP socket setup with bounded bind-conflict retry.

use std::io::ErrorKind;
use std::net::UdpSocket;
use tracing::{debug, info, warn};

use crate::config::StreamConfig;
use crate::{Result, StreamError};

/// Distance between ports tried after an address conflict.
pub const BIND_PORT_STEP: u16 = 2;

/// Bind a UDP socket for `config`, stepping the port on conflicts.
///
/// An `AddrInUse` failure moves on to `port + 2`, up to
/// `config.max_bind_attempts` attempts. Any other failure is returned as is.
pub fn bind_with_retry(config: &StreamConfig) -> Result<UdpSocket> {
    let first_port = config.port;
    let mut port = first_port;
    let mut attempts = 0;

    while attempts < config.max_bind_attempts {
        attempts += 1;
        let addr = config.bind_addr(port)?;

        match UdpSocket::bind(addr) {
            Ok(socket) => {
                configure(&socket, config)?;
                if port != first_port {
                    info!(requested = first_port, bound = port, "Bound after port conflict");
                }
                return Ok(socket);
            }
            Err(e) if e.kind() == ErrorKind::AddrInUse => {
                debug!(%addr, attempt = attempts, "Port in use, trying next");
                match port.checked_add(BIND_PORT_STEP) {
                    Some(next) => port = next,
                    None => break,
                }
            }
            Err(source) => return Err(StreamError::Bind { addr, source }),
        }
    }

    Err(StreamError::BindExhausted { first_port, attempts })
}

/// Apply receive timeout and buffer size.
fn configure(socket: &UdpSocket, config: &StreamConfig) -> Result<()> {
    socket
        .set_read_timeout(Some(config.recv_timeout()))
        .map_err(|e| StreamError::socket("set_read_timeout", e))?;

    // The kernel may clamp the size; a smaller buffer only raises loss under load
    if let Err(error) = set_recv_buffer_size(socket, config.recv_buffer_size) {
        warn!(%error, size = config.recv_buffer_size, "Could not enlarge receive buffer");
    }

    Ok(())
}

#[cfg(unix)]
fn set_recv_buffer_size(socket: &UdpSocket, size: usize) -> std::io::Result<()> {
    rustix::net::sockopt::set_socket_recv_buffer_size(socket, size)?;
    Ok(())
}

#[cfg(not(unix))]
fn set_recv_buffer_size(_socket: &UdpSocket, size: usize) -> std::io::Result<()> {
    debug!(size, "Receive buffer sizing not supported on this platform");
    Ok(())
}
