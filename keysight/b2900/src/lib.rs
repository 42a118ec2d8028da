//! A rust driver for the Keysight B2900 series source-measure units.
//!
//! This driver covers the source/measure functionality needed for DC sweeps on the B2901A/B2902A
//! and their successors: sourcing a current or voltage, setting compliance limits, measuring
//! voltage and current, and housekeeping such as the error queue and instrument state storage.
//! Only the first channel is addressed, the commands are sent without channel suffix.
//!
//! # Example
//!
//! ```no_run
//! use measurements::{Current, Voltage};
//! use keysight_b2900::B2900;
//! use scpi_endpoint::TcpIpEndpoint;
//!
//! let interface = TcpIpEndpoint::simple("192.168.1.20:5025").unwrap();
//! let mut smu = B2900::try_new(interface).unwrap();
//!
//! smu.set_voltage_compliance(Voltage::from_volts(10.0)).unwrap();
//! smu.apply_current(Current::from_milliamperes(1.0)).unwrap();
//! smu.set_output(true).unwrap();
//! println!("{}", smu.measure_voltage().unwrap());
//! ```

#![deny(warnings, missing_docs)]

mod modes;

pub use modes::{OutputOffMode, SourceMode};

use std::sync::{Arc, Mutex};

use measurements::{Current, Voltage};
use scpi_endpoint::{Endpoint, EndpointError, parse_response};

/// A rust driver for the Keysight B2900 series.
///
/// The driver is cheap to clone: clones share the same endpoint.
pub struct B2900<T: Endpoint> {
    interface: Arc<Mutex<T>>,
}

impl<T: Endpoint> B2900<T> {
    /// Create a new B2900 instance with the given endpoint.
    ///
    /// The terminator is set to `"\n"`, which the B2900 uses on all of its interfaces.
    ///
    /// # Arguments
    /// * `interface` - An endpoint that implements the [`Endpoint`] trait.
    pub fn try_new(interface: T) -> Result<Self, EndpointError> {
        let mut intf = interface;
        intf.set_terminator("\n");
        Ok(B2900 {
            interface: Arc::new(Mutex::new(intf)),
        })
    }

    /// Query the identification string of the instrument.
    ///
    /// Returns a comma-separated string of manufacturer, model, serial number, and firmware
    /// revision.
    pub fn get_name(&mut self) -> Result<String, EndpointError> {
        self.query("*IDN?")
    }

    /// Reset the instrument to its default state.
    pub fn reset(&mut self) -> Result<(), EndpointError> {
        self.sendcmd("*RST")
    }

    /// Let the beeper sound with the given frequency (Hz) and duration (s).
    pub fn beep(&mut self, frequency: f64, duration: f64) -> Result<(), EndpointError> {
        self.sendcmd(&format!(":SYST:BEEP {frequency},{duration}"))
    }

    /// Enable or disable the beeper.
    pub fn set_beeper(&mut self, state: bool) -> Result<(), EndpointError> {
        self.sendcmd(&format!(":SYST:BEEP:STAT {}", on_off(state)))
    }

    /// Run the instrument self-test. Returns `true` if the test passed.
    pub fn self_test(&mut self) -> Result<bool, EndpointError> {
        let resp: i32 = parse_response(&self.query("*TST?")?)?;
        Ok(resp == 0)
    }

    /// Run the self-calibration. Returns `true` if the calibration passed.
    pub fn self_calibration(&mut self) -> Result<bool, EndpointError> {
        let resp: i32 = parse_response(&self.query("*CAL?")?)?;
        Ok(resp == 0)
    }

    /// Read the oldest entry of the error queue, e.g., `+0,"No error"`.
    pub fn read_error(&mut self) -> Result<String, EndpointError> {
        self.query(":SYST:ERR?")
    }

    /// Read and clear all entries of the error queue.
    pub fn clear_errors(&mut self) -> Result<String, EndpointError> {
        self.query(":SYST:ERR:ALL?")
    }

    /// Switch the output on (`true`) or off (`false`).
    pub fn set_output(&mut self, state: bool) -> Result<(), EndpointError> {
        self.sendcmd(&format!(":OUTP {}", on_off(state)))
    }

    /// Select whether the instrument sources a current or a voltage.
    pub fn set_source_mode(&mut self, mode: SourceMode) -> Result<(), EndpointError> {
        self.sendcmd(&format!(":SOUR:FUNC:MODE {}", mode.to_cmd_str()))
    }

    /// Source the given voltage.
    ///
    /// This switches the source mode to voltage first.
    pub fn apply_voltage(&mut self, voltage: Voltage) -> Result<(), EndpointError> {
        self.set_source_mode(SourceMode::Voltage)?;
        self.sendcmd(&format!(":SOUR:VOLT {}", voltage.as_volts()))
    }

    /// Source the given current.
    ///
    /// This switches the source mode to current first.
    pub fn apply_current(&mut self, current: Current) -> Result<(), EndpointError> {
        self.set_source_mode(SourceMode::Current)?;
        self.sendcmd(&format!(":SOUR:CURR {}", current.as_amperes()))
    }

    /// Set the voltage compliance, used while sourcing a current.
    pub fn set_voltage_compliance(&mut self, limit: Voltage) -> Result<(), EndpointError> {
        self.sendcmd(&format!(":SENS:VOLT:PROT {}", limit.as_volts()))
    }

    /// Set the current compliance, used while sourcing a voltage.
    pub fn set_current_compliance(&mut self, limit: Current) -> Result<(), EndpointError> {
        self.sendcmd(&format!(":SENS:CURR:PROT {}", limit.as_amperes()))
    }

    /// Trigger a spot measurement of the voltage.
    pub fn measure_voltage(&mut self) -> Result<Voltage, EndpointError> {
        let resp = self.query(":MEAS:VOLT?")?;
        Ok(Voltage::from_volts(parse_response(&resp)?))
    }

    /// Trigger a spot measurement of the current.
    pub fn measure_current(&mut self) -> Result<Current, EndpointError> {
        let resp = self.query(":MEAS:CURR?")?;
        Ok(Current::from_amperes(parse_response(&resp)?))
    }

    /// Set the output range of the given source mode.
    ///
    /// # Arguments
    /// * `mode` - The source mode the range applies to.
    /// * `value` - The range in base units, i.e., volts or amperes.
    pub fn configure_output_range(
        &mut self,
        mode: SourceMode,
        value: f64,
    ) -> Result<(), EndpointError> {
        self.sendcmd(&format!(":SOUR:{}:RANG {value}", mode.to_cmd_str()))
    }

    /// Enable (`true`) or disable (`false`) four-wire (remote) sensing.
    pub fn enable_4wire(&mut self, enable: bool) -> Result<(), EndpointError> {
        self.sendcmd(&format!(":SENS:REM {}", on_off(enable)))
    }

    /// Select the state the output goes into when it is switched off.
    pub fn set_output_off_mode(&mut self, mode: OutputOffMode) -> Result<(), EndpointError> {
        self.sendcmd(&format!(":OUTP:OFF:MODE {}", mode.to_cmd_str()))
    }

    /// Store the instrument state in a file on the instrument and wait until this is done.
    pub fn save_status(&mut self, filename: &str) -> Result<(), EndpointError> {
        self.sendcmd(&format!(":MMEM:STOR:STAT \"{filename}\""))?;
        let resp = self.query("*OPC?")?;
        if resp != "1" {
            return Err(EndpointError::ResponseParseError(resp));
        }
        Ok(())
    }

    /// Load an instrument state from a file on the instrument.
    pub fn load_status(&mut self, filename: &str) -> Result<(), EndpointError> {
        self.sendcmd(&format!(":MMEM:LOAD:STAT \"{filename}\""))
    }

    /// Initiate the source/measure action.
    pub fn init_output(&mut self) -> Result<(), EndpointError> {
        self.sendcmd(":INIT")
    }

    /// Send a command to the instrument.
    fn sendcmd(&mut self, cmd: &str) -> Result<(), EndpointError> {
        let mut intf = self.interface.lock().expect("Mutex should not be poisoned");
        intf.send(cmd)
    }

    /// Query the instrument with a command and return the response as a String.
    fn query(&mut self, cmd: &str) -> Result<String, EndpointError> {
        let mut intf = self.interface.lock().expect("Mutex should not be poisoned");
        intf.query(cmd)
    }
}

impl<T: Endpoint> Clone for B2900<T> {
    fn clone(&self) -> Self {
        Self {
            interface: Arc::clone(&self.interface),
        }
    }
}

fn on_off(state: bool) -> &'static str {
    if state { "ON" } else { "OFF" }
}
