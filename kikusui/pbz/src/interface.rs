//! Provide a serial interface for the PBZ.

use std::time::Duration;

use scpi_endpoint::{EndpointError, SerialEndpoint, StreamEndpoint};
use serialport::SerialPort;

/// A serial endpoint for the PBZ.
///
/// Builds a `SerialEndpoint` with the RS-232C settings of the PBZ: 9600 baud, eight data bits,
/// no parity, one stop bit.
#[derive(Debug)]
pub struct SerialInterfacePbz {}

impl SerialInterfacePbz {
    /// Try to open the PBZ on the given port with a timeout of one second.
    ///
    /// Arguments:
    /// * `port` - The name of the serial port, e.g., `"/dev/ttyUSB0"` or `"COM3"`.
    pub fn simple(port: &str) -> Result<StreamEndpoint<Box<dyn SerialPort>>, EndpointError> {
        Self::with_baud_rate(port, 9600)
    }

    /// Try to open the PBZ with a baud rate other than the factory default.
    pub fn with_baud_rate(
        port: &str,
        baud_rate: u32,
    ) -> Result<StreamEndpoint<Box<dyn SerialPort>>, EndpointError> {
        let port = serialport::new(port, baud_rate)
            .timeout(Duration::from_secs(1))
            .data_bits(serialport::DataBits::Eight)
            .parity(serialport::Parity::None)
            .stop_bits(serialport::StopBits::One);
        SerialEndpoint::full(port)
    }
}
