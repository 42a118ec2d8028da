//! Blocking serial port endpoint using the `serialport` crate.

use std::time::Duration;

use log::info;
use serialport::{SerialPort, SerialPortBuilder};

use crate::{EndpointError, StreamEndpoint};

/// Shortcuts to open a serial port as a [`StreamEndpoint`].
#[derive(Debug)]
pub struct SerialEndpoint {}

impl SerialEndpoint {
    /// Open a serial port with 8N1 framing and a timeout of three seconds.
    ///
    /// # Arguments
    /// * `port` - The name of the serial port, e.g., `"/dev/ttyUSB0"` or `"COM3"`.
    /// * `baud_rate` - The baud rate configured on the instrument.
    pub fn simple(
        port: &str,
        baud_rate: u32,
    ) -> Result<StreamEndpoint<Box<dyn SerialPort>>, EndpointError> {
        let builder = serialport::new(port, baud_rate).timeout(Duration::from_secs(3));
        Self::full(builder)
    }

    /// Open a fully configured serial port.
    ///
    /// Use this when an instrument needs a parity, data bits, or flow control setting other than
    /// the default. The timeout of the builder is used for reading responses.
    pub fn full(
        builder: SerialPortBuilder,
    ) -> Result<StreamEndpoint<Box<dyn SerialPort>>, EndpointError> {
        let port = builder.open()?;
        let timeout = port.timeout();
        let baud_rate = port.baud_rate()?;
        info!(
            "Opened serial port {} at {baud_rate} baud",
            port.name().unwrap_or_default()
        );
        Ok(StreamEndpoint::new(port, timeout))
    }
}
