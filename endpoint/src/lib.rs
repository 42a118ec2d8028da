//! scpi_endpoint: talk to text-based laboratory instruments from Rust
//!
//! Every instrument driver in this workspace talks to its hardware through the [`Endpoint`]
//! trait. An endpoint knows how to write raw bytes, read raw bytes, and which terminator ends a
//! line. On top of that, the trait provides the two operations drivers actually use:
//!
//! - [`Endpoint::send`]: write a command followed by the terminator.
//! - [`Endpoint::query`]: send a command and block until a terminated response arrives, or the
//!   endpoint's timeout expires.
//!
//! # Available endpoints
//!
//! - [`StreamEndpoint`]: any type implementing [`std::io::Read`] and [`std::io::Write`].
//! - [`SerialEndpoint`]: blocking serial port using the [`serialport`] crate (feature `serial`).
//! - [`TcpIpEndpoint`]: blocking raw socket, e.g., SCPI on port 5025.
//! - [`LoopbackEndpoint`]: a scripted endpoint for testing drivers without hardware.
//!
//! Drivers never care which endpoint they were handed. A source-measure unit connected via
//! RS-232 today can be connected through an ethernet-to-serial bridge tomorrow without changing
//! a single line of the driver.

#![warn(missing_docs)]

mod loopback;
mod stream;
mod tcp_ip;

#[cfg(feature = "serial")]
mod serial;

use std::{str::FromStr, time::Duration, time::Instant};

use log::{debug, warn};
use thiserror::Error;

pub use loopback::LoopbackEndpoint;
pub use stream::StreamEndpoint;
pub use tcp_ip::TcpIpEndpoint;

#[cfg(feature = "serial")]
pub use serial::SerialEndpoint;

/// The error enum for all endpoints and the drivers built on top of them.
///
/// Drivers return this error for every command they send or query they perform, such that
/// transport failures, timeouts, and unparsable responses propagate nicely with the `?`
/// operator.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum EndpointError {
    /// A given float value is out of the range the instrument accepts.
    #[error("Float value {value} is out of range. Allowed range is [{min}, {max}]")]
    FloatValueOutOfRange {
        /// The value that is out of range.
        value: f64,
        /// The minimum value that is allowed.
        min: f64,
        /// The maximum value that is allowed.
        max: f64,
    },
    /// A given integer value is out of the range the instrument accepts.
    #[error("Integer value {value} is out of range. Allowed range is [{min}, {max}]")]
    IntValueOutOfRange {
        /// The value that is out of range.
        value: i64,
        /// The minimum value that is allowed.
        min: i64,
        /// The maximum value that is allowed.
        max: i64,
    },
    /// An invalid argument was passed to a driver function. The message is meant for the user.
    #[error("{0}")]
    InvalidArgument(String),
    /// Error when reading from/writing to an endpoint. See [`std::io::Error`] for more details.
    #[error(transparent)]
    Io(#[from] std::io::Error),
    /// The instrument answered, but the driver could not make sense of the response.
    #[error("Response from instrument could not be parsed. Response was: {0}")]
    ResponseParseError(String),
    #[cfg(feature = "serial")]
    /// Serial port errors can occur when opening a serial endpoint. See [`serialport::Error`].
    #[error(transparent)]
    Serialport(#[from] serialport::Error),
    /// No terminated response arrived within the timeout.
    #[error(
        "Timeout occured while waiting for a response from the instrument. Timeout was set to {0:?}."
    )]
    Timeout(Duration),
    /// No terminated response to the given query arrived within the timeout.
    #[error(
        "Timeout occured while waiting for a response to query: {query}. Timeout was set to {timeout:?}."
    )]
    TimeoutQuery {
        /// The query that timed out.
        query: String,
        /// The timeout that was set.
        timeout: Duration,
    },
}

/// The `Endpoint` trait defines the communication contract between a driver and an instrument.
///
/// Implementors provide raw byte I/O ([`Endpoint::read_exact`], [`Endpoint::write_raw`]) and,
/// where applicable, their terminator and timeout. The line-oriented operations `send` and
/// `query` are provided on top of that and should rarely need to be overridden.
pub trait Endpoint {
    /// Read exactly `buf.len()` bytes from the instrument.
    fn read_exact(&mut self, buf: &mut [u8]) -> Result<(), EndpointError>;

    /// Write all bytes to the instrument and flush.
    fn write_raw(&mut self, data: &[u8]) -> Result<(), EndpointError>;

    /// The terminator appended to commands and expected at the end of responses.
    fn terminator(&self) -> &str {
        "\n"
    }

    /// Set the terminator of an endpoint.
    ///
    /// The default implementation ignores the request, which is correct for endpoints whose
    /// terminator is fixed.
    fn set_terminator(&mut self, _terminator: &str) {}

    /// Time after which a blocking read is given up.
    fn timeout(&self) -> Duration {
        Duration::from_secs(3)
    }

    /// Write a string to the instrument as is, i.e., without appending the terminator.
    fn write(&mut self, data: &str) -> Result<(), EndpointError> {
        self.write_raw(data.as_bytes())
    }

    /// Send a command to the instrument.
    ///
    /// The terminator is appended to the command and the whole line is written at once.
    fn send(&mut self, cmd: &str) -> Result<(), EndpointError> {
        debug!("-> {cmd}");
        let line = format!("{cmd}{}", self.terminator());
        self.write_raw(line.as_bytes())
    }

    /// Read from the instrument byte by byte until the response ends with the terminator.
    ///
    /// The terminator and surrounding whitespace are stripped from the returned string. Bytes
    /// that are not valid UTF-8 are skipped with a warning.
    fn read_until_terminator(&mut self) -> Result<String, EndpointError> {
        let terminator = self.terminator().to_string();
        let timeout = self.timeout();
        let mut response = String::new();
        let mut single_buf = [0u8];

        let tic = Instant::now();
        while tic.elapsed() < timeout {
            self.read_exact(&mut single_buf)?;
            match std::str::from_utf8(&single_buf) {
                Ok(val) => response.push_str(val),
                Err(_) => warn!("Received invalid UTF-8 data: {single_buf:?}"),
            }
            if response.ends_with(&terminator) {
                let response = response.trim().to_string();
                debug!("<- {response}");
                return Ok(response);
            }
        }
        Err(EndpointError::Timeout(timeout))
    }

    /// Send a query to the instrument and return its response.
    fn query(&mut self, cmd: &str) -> Result<String, EndpointError> {
        self.send(cmd)?;
        self.read_until_terminator().map_err(|err| match err {
            EndpointError::Timeout(timeout) => EndpointError::TimeoutQuery {
                query: cmd.to_string(),
                timeout,
            },
            other => other,
        })
    }
}

impl<E: Endpoint + ?Sized> Endpoint for Box<E> {
    fn read_exact(&mut self, buf: &mut [u8]) -> Result<(), EndpointError> {
        (**self).read_exact(buf)
    }

    fn write_raw(&mut self, data: &[u8]) -> Result<(), EndpointError> {
        (**self).write_raw(data)
    }

    fn terminator(&self) -> &str {
        (**self).terminator()
    }

    fn set_terminator(&mut self, terminator: &str) {
        (**self).set_terminator(terminator)
    }

    fn timeout(&self) -> Duration {
        (**self).timeout()
    }

    fn send(&mut self, cmd: &str) -> Result<(), EndpointError> {
        (**self).send(cmd)
    }

    fn query(&mut self, cmd: &str) -> Result<String, EndpointError> {
        (**self).query(cmd)
    }
}

/// Parse a scalar out of an instrument response.
///
/// Surrounding whitespace is ignored. If the response cannot be parsed, a
/// [`EndpointError::ResponseParseError`] containing the full response is returned.
pub fn parse_response<T: FromStr>(response: &str) -> Result<T, EndpointError> {
    response
        .trim()
        .parse::<T>()
        .map_err(|_| EndpointError::ResponseParseError(response.to_string()))
}

/// Check that a float argument lies within `[min, max]` before it is sent to an instrument.
pub fn check_float_range(value: f64, min: f64, max: f64) -> Result<f64, EndpointError> {
    if !(min..=max).contains(&value) {
        return Err(EndpointError::FloatValueOutOfRange { value, min, max });
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_response() {
        assert_eq!(parse_response::<f64>(" 1.5E-3\n").unwrap(), 1.5e-3);
        assert_eq!(parse_response::<i32>("0").unwrap(), 0);
        match parse_response::<f64>("ERR") {
            Err(EndpointError::ResponseParseError(resp)) => assert_eq!(resp, "ERR"),
            _ => panic!("Expected a parse error"),
        }
    }

    #[test]
    fn test_check_float_range() {
        assert_eq!(check_float_range(1.0, 0.0, 2.0).unwrap(), 1.0);
        assert!(check_float_range(-0.1, 0.0, 2.0).is_err());
        assert!(check_float_range(f64::NAN, 0.0, 2.0).is_err());
    }
}
