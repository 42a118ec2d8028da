//! Scripted endpoint for testing instrument drivers without hardware.
//!
//! The [`LoopbackEndpoint`] is handed the exact conversation a driver is expected to have with
//! its instrument: every line the host sends and every line the instrument answers. Anything
//! that deviates from the script panics, and so does a script that is not used up when the
//! endpoint is dropped.

use std::collections::VecDeque;

use crate::{Endpoint, EndpointError};

/// A self-incrementing index that starts at 0 and increments whenever `next` is called.
#[derive(Debug, Default)]
struct IncrIndex {
    index: usize,
}

impl IncrIndex {
    fn next(&mut self) -> usize {
        let current = self.index;
        self.index += 1;
        current
    }
}

/// An endpoint that allows you to write tests for your instrument driver.
///
/// # Example
///
/// A tiny driver that asks for the identification string, and a test for it.
///
/// ```
/// use std::sync::{Arc, Mutex};
/// use scpi_endpoint::{Endpoint, EndpointError, LoopbackEndpoint};
///
/// struct MyInstrument<T: Endpoint> {
///     endpoint: Arc<Mutex<T>>,
/// }
///
/// impl<T: Endpoint> MyInstrument<T> {
///     fn new(endpoint: T) -> Self {
///         MyInstrument { endpoint: Arc::new(Mutex::new(endpoint)) }
///     }
///
///     fn get_name(&mut self) -> Result<String, EndpointError> {
///         self.endpoint.lock().expect("Mutex should not be poisoned").query("*IDN?")
///     }
/// }
///
/// let host2inst = vec!["*IDN?".to_string()];
/// let inst2host = vec!["MyInstrument,1.0,1234".to_string()];
/// let loopback = LoopbackEndpoint::new(host2inst, inst2host, "\n");
///
/// let mut inst = MyInstrument::new(loopback);
/// assert_eq!("MyInstrument,1.0,1234", inst.get_name().unwrap());
/// ```
pub struct LoopbackEndpoint {
    from_host: Vec<String>,
    from_inst: Vec<String>,
    terminator_exp: String,
    from_host_index: IncrIndex,
    from_inst_index: IncrIndex,
    curr_bytes: VecDeque<u8>,
    terminator: String,
}

impl LoopbackEndpoint {
    /// Create a new loopback endpoint with the given conversation.
    ///
    /// Lines are consumed in order. Whenever the driver sends something that is not the next
    /// expected line, the endpoint panics. When the endpoint is dropped, [`Self::finalize`] is
    /// called, which panics if lines are left over.
    ///
    /// # Arguments:
    /// * `from_host` - Commands from host to instrument, without terminator.
    /// * `from_inst` - Responses from instrument to host, without terminator.
    /// * `terminator_exp` - The terminator the driver is expected to use.
    pub fn new(from_host: Vec<String>, from_inst: Vec<String>, terminator_exp: &str) -> Self {
        LoopbackEndpoint {
            from_host,
            from_inst,
            terminator_exp: terminator_exp.to_string(),
            from_host_index: IncrIndex::default(),
            from_inst_index: IncrIndex::default(),
            curr_bytes: VecDeque::new(),
            terminator: "\n".to_string(),
        }
    }

    /// Convenience constructor from string slices.
    pub fn from_strs(from_host: &[&str], from_inst: &[&str], terminator_exp: &str) -> Self {
        let h2i = from_host.iter().map(|s| s.to_string()).collect();
        let i2h = from_inst.iter().map(|s| s.to_string()).collect();
        Self::new(h2i, i2h, terminator_exp)
    }

    /// Panic if not all lines of the conversation have been used.
    ///
    /// This is called automatically on drop, but can be called manually as well.
    pub fn finalize(&mut self) {
        let from_host_leftover = self.from_host.get(self.from_host_index.next());
        let from_inst_leftover = self.from_inst.get(self.from_inst_index.next());
        if let Some(fil) = from_host_leftover {
            panic!("Leftover expected commands found from host to instrument: {fil}");
        }
        if let Some(fil) = from_inst_leftover {
            panic!("Leftover expected commands found from instrument to host: {fil}");
        }
    }

    fn get_next_from_host(&mut self) -> String {
        self.from_host
            .get(self.from_host_index.next())
            .expect("No more commands were expected from host to instrument.")
            .clone()
    }

    fn get_next_from_inst(&mut self) -> String {
        self.from_inst
            .get(self.from_inst_index.next())
            .expect("No more commands were expected from instrument to host.")
            .clone()
    }

    /// Read exactly one byte of the current response, pulling the next response if needed.
    ///
    /// Panics if the script has no more responses: a driver reading more than it should is a
    /// bug this endpoint is meant to find.
    fn read_one_byte(&mut self) -> u8 {
        match self.curr_bytes.pop_front() {
            Some(byte) => byte,
            None => {
                let next_cmd = format!("{}{}", self.get_next_from_inst(), self.terminator_exp);
                self.curr_bytes = next_cmd.bytes().collect();
                self.read_one_byte()
            }
        }
    }
}

impl Endpoint for LoopbackEndpoint {
    fn read_exact(&mut self, buf: &mut [u8]) -> Result<(), EndpointError> {
        for byte in buf.iter_mut() {
            *byte = self.read_one_byte();
        }
        Ok(())
    }

    fn write_raw(&mut self, cmd: &[u8]) -> Result<(), EndpointError> {
        let exp = format!("{}{}", self.get_next_from_host(), self.terminator_exp);
        assert_eq!(
            exp.as_bytes(),
            cmd,
            "Expected sendcmd '{exp}', got '{:?}'",
            std::str::from_utf8(cmd)
        );
        Ok(())
    }

    fn terminator(&self) -> &str {
        self.terminator.as_str()
    }

    fn set_terminator(&mut self, terminator: &str) {
        self.terminator = terminator.to_string();
    }
}

impl Drop for LoopbackEndpoint {
    fn drop(&mut self) {
        if !std::thread::panicking() {
            self.finalize();
        }
    }
}
