//! Line-oriented endpoint on top of a byte stream.
//!
//! [`TcpIpEndpoint`](crate::TcpIpEndpoint) and `SerialEndpoint` only open the port and hand it
//! to [`StreamEndpoint`], which does the actual framing. Anything else that reads and writes
//! bytes, e.g., a USB-serial bridge with its own crate or an in-memory buffer in tests, can be
//! wrapped the same way.

use std::{
    io::{Read, Write},
    time::Duration,
};

use crate::{Endpoint, EndpointError};

/// Frames commands and responses with a terminator on a `Read + Write` port.
///
/// Each command goes out in one `write_all` and is flushed. Responses are collected byte by byte
/// until the terminator shows up or the response deadline passes.
///
/// ```no_run
/// use std::{net::TcpStream, time::Duration};
///
/// use scpi_endpoint::{Endpoint, StreamEndpoint};
///
/// // A B2900 answers SCPI on raw socket port 5025.
/// let stream = TcpStream::connect("192.168.10.1:5025").unwrap();
/// let mut smu = StreamEndpoint::new(stream, Duration::from_secs(3));
/// println!("{}", smu.query("*IDN?").unwrap());
/// ```
#[derive(Debug)]
pub struct StreamEndpoint<P: Read + Write> {
    port: P,
    terminator: String,
    deadline: Duration,
}

impl<P: Read + Write> StreamEndpoint<P> {
    /// Wrap `port`. Queries give up after `deadline` without a complete response line.
    ///
    /// Drivers set their terminator in `try_new`, until then it is `"\n"`.
    pub fn new(port: P, deadline: Duration) -> Self {
        Self {
            port,
            terminator: "\n".to_string(),
            deadline,
        }
    }

    /// Change the response deadline of [`Endpoint::query`].
    ///
    /// The deadline is independent of the port's own read timeout. Raise it for instruments
    /// that answer slowly, e.g., an SMU running a long integration before `:MEAS:VOLT?` returns.
    pub fn set_timeout(&mut self, deadline: Duration) {
        self.deadline = deadline;
    }

    /// Give the port back, e.g., to change its settings and wrap it again.
    pub fn into_inner(self) -> P {
        self.port
    }
}

impl<P: Read + Write> Endpoint for StreamEndpoint<P> {
    fn read_exact(&mut self, buf: &mut [u8]) -> Result<(), EndpointError> {
        self.port.read_exact(buf)?;
        Ok(())
    }

    fn write_raw(&mut self, data: &[u8]) -> Result<(), EndpointError> {
        self.port.write_all(data)?;
        self.port.flush()?;
        Ok(())
    }

    fn terminator(&self) -> &str {
        self.terminator.as_str()
    }

    fn set_terminator(&mut self, terminator: &str) {
        self.terminator = terminator.to_string();
    }

    fn timeout(&self) -> Duration {
        self.deadline
    }
}
