//! Blocking TCP/IP endpoint using [`std::net::TcpStream`].

use std::{
    net::{TcpStream, ToSocketAddrs},
    time::Duration,
};

use log::info;

use crate::{EndpointError, StreamEndpoint};

/// Shortcut to open a raw socket to an instrument, e.g., a Keysight SMU on port 5025 or a
/// GPIB-to-ethernet adapter.
#[derive(Debug)]
pub struct TcpIpEndpoint {}

impl TcpIpEndpoint {
    /// Connect to the given socket address with a read/write timeout of three seconds.
    ///
    /// A `TcpStream` without read timeout would block forever on a missing response, which is
    /// never what we want when talking to instruments.
    ///
    /// # Arguments
    /// * `sock_addr` - Socket address, e.g., `"192.168.1.10:5025"`.
    pub fn simple<A: ToSocketAddrs>(
        sock_addr: A,
    ) -> Result<StreamEndpoint<TcpStream>, EndpointError> {
        Self::with_timeout(sock_addr, Duration::from_secs(3))
    }

    /// Connect to the given socket address with a custom read/write timeout.
    pub fn with_timeout<A: ToSocketAddrs>(
        sock_addr: A,
        timeout: Duration,
    ) -> Result<StreamEndpoint<TcpStream>, EndpointError> {
        let stream = TcpStream::connect(sock_addr)?;
        stream.set_write_timeout(Some(timeout))?;
        stream.set_read_timeout(Some(timeout))?;
        if let Ok(peer) = stream.peer_addr() {
            info!("Connected to {peer}");
        }
        Ok(StreamEndpoint::new(stream, timeout))
    }
}
