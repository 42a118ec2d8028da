//! Tests for the default implementations of the [`Endpoint`] trait.

use std::time::Duration;

use rstest::*;

use scpi_endpoint::{Endpoint, EndpointError};

/// An endpoint that only implements the required methods and swallows everything.
struct NullEndpoint {
    written: Vec<u8>,
}

impl Endpoint for NullEndpoint {
    fn read_exact(&mut self, buf: &mut [u8]) -> Result<(), EndpointError> {
        buf.fill(b'\n');
        Ok(())
    }

    fn write_raw(&mut self, data: &[u8]) -> Result<(), EndpointError> {
        self.written.extend_from_slice(data);
        Ok(())
    }
}

#[fixture]
fn endp() -> NullEndpoint {
    NullEndpoint { written: vec![] }
}

#[rstest]
fn test_default_terminator(mut endp: NullEndpoint) {
    assert_eq!(endp.terminator(), "\n");
    // setting is ignored by default
    endp.set_terminator("\r");
    assert_eq!(endp.terminator(), "\n");
}

#[rstest]
fn test_default_timeout(endp: NullEndpoint) {
    assert_eq!(endp.timeout(), Duration::from_secs(3));
}

#[rstest]
fn test_default_write_has_no_terminator(mut endp: NullEndpoint) {
    endp.write("\u{5}").unwrap();
    endp.send("OUTP ON").unwrap();
    assert_eq!(endp.written, b"\x05OUTP ON\n");
}

#[rstest]
fn test_default_query_empty_response(mut endp: NullEndpoint) {
    assert_eq!(endp.query("*OPC?").unwrap(), "");
}
