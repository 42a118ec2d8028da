//! A rust driver for the Kikusui PBZ series bipolar power supplies.
//!
//! The PBZ can source a voltage or a current of either polarity, which makes it the natural
//! choice to drive coils through a full hysteresis loop. This driver covers the output, function,
//! trigger, and measurement subsystems of the instrument.
//!
//! # Example
//!
//! This example shows the usage via the serial interface.
//!
//! ```no_run
//! use measurements::Current;
//! use kikusui_pbz::{OperationMode, Pbz, SerialInterfacePbz};
//!
//! let serial_inst = SerialInterfacePbz::simple("/dev/ttyUSB0").unwrap();
//! let mut pbz = Pbz::try_new(serial_inst).unwrap();
//!
//! pbz.set_mode(OperationMode::ConstantCurrent).unwrap();
//! pbz.set_current(Current::from_amperes(0.5)).unwrap();
//! pbz.set_output(true).unwrap();
//! println!("Output voltage: {}", pbz.measure_voltage().unwrap());
//! ```

#![deny(warnings, missing_docs)]

mod interface;
mod modes;

pub use interface::SerialInterfacePbz;
pub use modes::{
    ControlPolarity, MeasurementFunction, OperationMode, Polarity, PowerOnState, SignalSource,
    TriggerPolarity, TriggerSource,
};

use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use measurements::{Current, Voltage};
use scpi_endpoint::{Endpoint, EndpointError, check_float_range, parse_response};

/// A rust driver for the Kikusui PBZ.
///
/// See the top-level documentation for an example on how to use this driver.
pub struct Pbz<T: Endpoint> {
    interface: Arc<Mutex<T>>,
}

impl<T: Endpoint> Pbz<T> {
    /// Create a new PBZ instance with the given endpoint.
    ///
    /// # Arguments
    /// * `interface` - An endpoint that implements the [`Endpoint`] trait.
    pub fn try_new(interface: T) -> Result<Self, EndpointError> {
        let mut intf = interface;
        intf.set_terminator("\n");
        Ok(Pbz {
            interface: Arc::new(Mutex::new(intf)),
        })
    }

    /// Query the identification string of the instrument.
    pub fn get_name(&mut self) -> Result<String, EndpointError> {
        self.query("*IDN?")
    }

    /// Reset the instrument to its default state.
    pub fn reset(&mut self) -> Result<(), EndpointError> {
        self.sendcmd("*RST")
    }

    /// Query the standard event status register.
    pub fn get_event_status_register(&mut self) -> Result<u8, EndpointError> {
        parse_response(&self.query("*ESR?")?)
    }

    /// Set the output voltage, used in constant voltage mode.
    pub fn set_voltage(&mut self, voltage: Voltage) -> Result<(), EndpointError> {
        self.sendcmd(&format!("VOLT {}", voltage.as_volts()))
    }

    /// Set the output current, used in constant current mode.
    pub fn set_current(&mut self, current: Current) -> Result<(), EndpointError> {
        self.sendcmd(&format!("CURR {}", current.as_amperes()))
    }

    /// Switch the output on (`true`) or off (`false`).
    pub fn set_output(&mut self, state: bool) -> Result<(), EndpointError> {
        self.sendcmd(&format!("OUTP {}", on_off(state)))
    }

    /// Measure the output voltage.
    pub fn measure_voltage(&mut self) -> Result<Voltage, EndpointError> {
        let resp = self.query("MEAS:VOLT?")?;
        Ok(Voltage::from_volts(parse_response(&resp)?))
    }

    /// Measure the output current.
    pub fn measure_current(&mut self) -> Result<Current, EndpointError> {
        let resp = self.query("MEAS:CURR?")?;
        Ok(Current::from_amperes(parse_response(&resp)?))
    }

    /// Select constant voltage or constant current operation.
    pub fn set_mode(&mut self, mode: OperationMode) -> Result<(), EndpointError> {
        self.sendcmd(&format!("FUNC:MODE {}", mode.to_cmd_str()))
    }

    /// Select bipolar or unipolar output.
    pub fn set_polarity(&mut self, polarity: Polarity) -> Result<(), EndpointError> {
        self.sendcmd(&format!("FUNC:POL {}", polarity.to_cmd_str()))
    }

    /// Select the signal source: internal, external, or both summed.
    pub fn set_source(&mut self, source: SignalSource) -> Result<(), EndpointError> {
        self.sendcmd(&format!("FUNC:SOUR {}", source.to_cmd_str()))
    }

    /// Set the over-voltage protection level.
    pub fn set_overvoltage_protection(&mut self, voltage: Voltage) -> Result<(), EndpointError> {
        self.sendcmd(&format!("VOLT:PROT:OVER {}", voltage.as_volts()))
    }

    /// Set the over-current protection level.
    pub fn set_overcurrent_protection(&mut self, current: Current) -> Result<(), EndpointError> {
        self.sendcmd(&format!("CURR:PROT:OVER {}", current.as_amperes()))
    }

    /// Enable or disable the output trigger.
    pub fn set_output_trigger(&mut self, state: bool) -> Result<(), EndpointError> {
        self.sendcmd(&format!("OUTP:TRIG {}", on_off(state)))
    }

    /// Set the output state after power on.
    pub fn set_power_on_state(&mut self, state: PowerOnState) -> Result<(), EndpointError> {
        self.sendcmd(&format!("OUTP:PON:STAT {}", state.to_cmd_str()))
    }

    /// Set the polarity of the external output control signal.
    pub fn set_external_control_polarity(
        &mut self,
        polarity: ControlPolarity,
    ) -> Result<(), EndpointError> {
        self.sendcmd(&format!("OUTP:EXT {}", polarity.to_cmd_str()))
    }

    /// Set the polarity of the trigger signal output.
    pub fn set_trigger_polarity(&mut self, polarity: TriggerPolarity) -> Result<(), EndpointError> {
        self.sendcmd(&format!("OUTP:TRIG:POL {}", polarity.to_cmd_str()))
    }

    /// Switch the trigger signal output on or off.
    pub fn set_trigger_signal_output(&mut self, state: bool) -> Result<(), EndpointError> {
        self.sendcmd(&format!("OUTP:TRIG:STAT {}", on_off(state)))
    }

    /// Switch the option port output on or off.
    pub fn set_option_output(&mut self, state: bool) -> Result<(), EndpointError> {
        self.sendcmd(&format!("OUTP:PORT {}", on_off(state)))
    }

    /// Clear all protection alarms.
    pub fn clear_protection(&mut self) -> Result<(), EndpointError> {
        self.sendcmd("OUTP:PROT:CLE")
    }

    /// Set the polarity of the trigger input.
    pub fn set_trigger_input_polarity(
        &mut self,
        polarity: TriggerPolarity,
    ) -> Result<(), EndpointError> {
        self.sendcmd(&format!("INP:TRIG:POL {}", polarity.to_cmd_str()))
    }

    /// Set the measurement time (aperture).
    ///
    /// The PBZ accepts apertures between 0.1 ms and 3600 s.
    pub fn set_measurement_time(&mut self, aperture: Duration) -> Result<(), EndpointError> {
        let secs = check_float_range(aperture.as_secs_f64(), 0.0001, 3600.0)?;
        self.sendcmd(&format!("SENS:APER {secs}"))
    }

    /// Select what the measurement subsystem reports.
    pub fn set_measurement_function(
        &mut self,
        function: MeasurementFunction,
    ) -> Result<(), EndpointError> {
        self.sendcmd(&format!("SENS:FUNC {}", function.to_cmd_str()))
    }

    /// Set the delay between the measurement trigger and the start of the measurement.
    ///
    /// The PBZ accepts delays between 0 and 3600 s.
    pub fn set_trigger_delay(&mut self, delay: Duration) -> Result<(), EndpointError> {
        let secs = check_float_range(delay.as_secs_f64(), 0.0, 3600.0)?;
        self.sendcmd(&format!("SENS:TRIG:DEL {secs}"))
    }

    /// Select what starts a measurement.
    pub fn set_trigger_source(&mut self, source: TriggerSource) -> Result<(), EndpointError> {
        self.sendcmd(&format!("SENS:TRIG:SOUR {}", source.to_cmd_str()))
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

impl<T: Endpoint> Clone for Pbz<T> {
    fn clone(&self) -> Self {
        Self {
            interface: Arc::clone(&self.interface),
        }
    }
}

fn on_off(state: bool) -> &'static str {
    if state { "ON" } else { "OFF" }
}
