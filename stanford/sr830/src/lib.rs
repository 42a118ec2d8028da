//! A rust driver for the Stanford Research Systems SR830 lock-in amplifier.
//!
//! The driver covers the reference oscillator, the input and gain settings, the auto functions,
//! and the readout of the demodulated signal, either one quantity at a time or several at once
//! with [`Sr830::snap`].
//!
//! Sensitivity and time constant are selected from the instrument's discrete tables, see
//! [`SENSITIVITIES`] and [`TIME_CONSTANTS`]. Values that are not in the table are rejected
//! before anything is sent to the instrument.
//!
//! # Example
//!
//! ```no_run
//! use std::time::Duration;
//!
//! use measurements::{Frequency, Voltage};
//! use scpi_endpoint::SerialEndpoint;
//! use stanford_sr830::{SnapParameter, Sr830};
//!
//! let interface = SerialEndpoint::simple("/dev/ttyUSB1", 9600).unwrap();
//! let mut lockin = Sr830::try_new(interface).unwrap();
//!
//! lockin.set_frequency(Frequency::from_hertz(137.0)).unwrap();
//! lockin.set_amplitude(Voltage::from_volts(0.5)).unwrap();
//! lockin.set_time_constant(Duration::from_millis(300)).unwrap();
//!
//! let xy = lockin.snap(&[SnapParameter::X, SnapParameter::Y]).unwrap();
//! println!("X = {} V, Y = {} V", xy[0], xy[1]);
//! ```

#![deny(warnings, missing_docs)]

mod settings;

pub use settings::{
    InputConfig, InputCoupling, OutputInterface, ReferenceSource, SENSITIVITIES, SnapParameter,
    TIME_CONSTANTS, TriggerSlope,
};

use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use measurements::{Angle, Frequency, Voltage};
use scpi_endpoint::{Endpoint, EndpointError, check_float_range, parse_response};

use settings::{table_index, table_value};

/// A snapshot of the readout and all settings of the lock-in.
#[derive(Debug, Clone, PartialEq)]
pub struct LockinStatus {
    /// In-phase component.
    pub x: Voltage,
    /// Quadrature component.
    pub y: Voltage,
    /// Magnitude.
    pub r: Voltage,
    /// Phase of the signal.
    pub theta: Angle,
    /// Amplitude of the sine output.
    pub amplitude: Voltage,
    /// Reference frequency.
    pub frequency: Frequency,
    /// Full scale sensitivity.
    pub sensitivity: Voltage,
    /// Time constant of the low pass filter.
    pub time_constant: Duration,
    /// Input configuration.
    pub input_config: InputConfig,
    /// Input coupling.
    pub input_coupling: InputCoupling,
    /// Reference source.
    pub reference_source: ReferenceSource,
    /// Detection harmonic.
    pub harmonic: u32,
    /// Reference trigger slope.
    pub trigger_slope: TriggerSlope,
}

/// A rust driver for the SR830.
///
/// See the top-level documentation for an example on how to use this driver.
pub struct Sr830<T: Endpoint> {
    interface: Arc<Mutex<T>>,
}

impl<T: Endpoint> Sr830<T> {
    /// Create a new SR830 instance with the given endpoint.
    ///
    /// The terminator is set to `"\r"`, which the SR830 uses on its RS-232 port.
    ///
    /// # Arguments
    /// * `interface` - An endpoint that implements the [`Endpoint`] trait.
    pub fn try_new(interface: T) -> Result<Self, EndpointError> {
        let mut intf = interface;
        intf.set_terminator("\r");
        Ok(Sr830 {
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

    /// Select the interface the instrument answers on.
    ///
    /// This must be set to [`OutputInterface::Rs232`] before any query over the serial port.
    pub fn set_output_interface(&mut self, intf: OutputInterface) -> Result<(), EndpointError> {
        self.sendcmd(&format!("OUTX {}", intf.to_cmd_str()))
    }

    /// Set the amplitude of the sine output (0.004 V to 5 V).
    pub fn set_amplitude(&mut self, amplitude: Voltage) -> Result<(), EndpointError> {
        let value = check_float_range(amplitude.as_volts(), 0.004, 5.0)?;
        self.sendcmd(&format!("SLVL {value}"))
    }

    /// Get the amplitude of the sine output.
    pub fn get_amplitude(&mut self) -> Result<Voltage, EndpointError> {
        Ok(Voltage::from_volts(parse_response(&self.query("SLVL?")?)?))
    }

    /// Set the frequency of the internal reference (1 mHz to 102 kHz).
    pub fn set_frequency(&mut self, frequency: Frequency) -> Result<(), EndpointError> {
        let value = check_float_range(frequency.as_hertz(), 0.001, 102_000.0)?;
        self.sendcmd(&format!("FREQ {value}"))
    }

    /// Get the reference frequency.
    pub fn get_frequency(&mut self) -> Result<Frequency, EndpointError> {
        Ok(Frequency::from_hertz(parse_response(&self.query("FREQ?")?)?))
    }

    /// Set the reference phase shift (-360 to 729.99 degrees).
    pub fn set_phase(&mut self, phase: Angle) -> Result<(), EndpointError> {
        let value = check_float_range(phase.as_degrees(), -360.0, 729.99)?;
        self.sendcmd(&format!("PHAS {value}"))
    }

    /// Get the reference phase shift.
    pub fn get_phase(&mut self) -> Result<Angle, EndpointError> {
        Ok(Angle::from_degrees(parse_response(&self.query("PHAS?")?)?))
    }

    /// Set the full scale sensitivity. Must be one of [`SENSITIVITIES`].
    pub fn set_sensitivity(&mut self, sensitivity: Voltage) -> Result<(), EndpointError> {
        let idx = table_index(&SENSITIVITIES, sensitivity.as_volts(), "sensitivity")?;
        self.sendcmd(&format!("SENS {idx}"))
    }

    /// Get the full scale sensitivity.
    pub fn get_sensitivity(&mut self) -> Result<Voltage, EndpointError> {
        let resp = self.query("SENS?")?;
        Ok(Voltage::from_volts(table_value(&SENSITIVITIES, &resp)?))
    }

    /// Set the time constant. Must be one of [`TIME_CONSTANTS`].
    pub fn set_time_constant(&mut self, time_constant: Duration) -> Result<(), EndpointError> {
        let idx = table_index(&TIME_CONSTANTS, time_constant.as_secs_f64(), "time constant")?;
        self.sendcmd(&format!("OFLT {idx}"))
    }

    /// Get the time constant.
    pub fn get_time_constant(&mut self) -> Result<Duration, EndpointError> {
        let resp = self.query("OFLT?")?;
        Ok(Duration::from_secs_f64(table_value(&TIME_CONSTANTS, &resp)?))
    }

    /// Select the reference source.
    pub fn set_reference_source(&mut self, source: ReferenceSource) -> Result<(), EndpointError> {
        self.sendcmd(&format!("FMOD {}", source.to_cmd_str()))
    }

    /// Get the reference source.
    pub fn get_reference_source(&mut self) -> Result<ReferenceSource, EndpointError> {
        ReferenceSource::from_cmd_str(&self.query("FMOD?")?)
    }

    /// Set the detection harmonic (1 to 19999).
    ///
    /// The instrument additionally limits the product of harmonic and frequency to 102 kHz.
    pub fn set_harmonic(&mut self, harmonic: u32) -> Result<(), EndpointError> {
        if !(1..=19999).contains(&harmonic) {
            return Err(EndpointError::IntValueOutOfRange {
                value: harmonic.into(),
                min: 1,
                max: 19999,
            });
        }
        self.sendcmd(&format!("HARM {harmonic}"))
    }

    /// Get the detection harmonic.
    pub fn get_harmonic(&mut self) -> Result<u32, EndpointError> {
        parse_response(&self.query("HARM?")?)
    }

    /// Set the input configuration.
    pub fn set_input_config(&mut self, config: InputConfig) -> Result<(), EndpointError> {
        self.sendcmd(&format!("ISRC {}", config.to_cmd_str()))
    }

    /// Get the input configuration.
    pub fn get_input_config(&mut self) -> Result<InputConfig, EndpointError> {
        InputConfig::from_cmd_str(&self.query("ISRC?")?)
    }

    /// Set the input coupling.
    pub fn set_input_coupling(&mut self, coupling: InputCoupling) -> Result<(), EndpointError> {
        self.sendcmd(&format!("ICPL {}", coupling.to_cmd_str()))
    }

    /// Get the input coupling.
    pub fn get_input_coupling(&mut self) -> Result<InputCoupling, EndpointError> {
        InputCoupling::from_cmd_str(&self.query("ICPL?")?)
    }

    /// Set the slope the external reference triggers on.
    pub fn set_trigger_slope(&mut self, slope: TriggerSlope) -> Result<(), EndpointError> {
        self.sendcmd(&format!("RSLP {}", slope.to_cmd_str()))
    }

    /// Get the slope the external reference triggers on.
    pub fn get_trigger_slope(&mut self) -> Result<TriggerSlope, EndpointError> {
        TriggerSlope::from_cmd_str(&self.query("RSLP?")?)
    }

    /// Read the in-phase component.
    pub fn get_x(&mut self) -> Result<Voltage, EndpointError> {
        Ok(Voltage::from_volts(self.read_output(1)?))
    }

    /// Read the quadrature component.
    pub fn get_y(&mut self) -> Result<Voltage, EndpointError> {
        Ok(Voltage::from_volts(self.read_output(2)?))
    }

    /// Read the magnitude.
    pub fn get_r(&mut self) -> Result<Voltage, EndpointError> {
        Ok(Voltage::from_volts(self.read_output(3)?))
    }

    /// Read the phase of the signal.
    pub fn get_theta(&mut self) -> Result<Angle, EndpointError> {
        Ok(Angle::from_degrees(self.read_output(4)?))
    }

    /// Read two to six quantities at the same instant.
    ///
    /// The values are returned in the order of `params`, in base units (volts, degrees, hertz).
    pub fn snap(&mut self, params: &[SnapParameter]) -> Result<Vec<f64>, EndpointError> {
        if !(2..=6).contains(&params.len()) {
            return Err(EndpointError::InvalidArgument(format!(
                "SNAP? takes 2 to 6 parameters, got {}",
                params.len()
            )));
        }
        let args = params
            .iter()
            .map(|p| p.to_cmd_str())
            .collect::<Vec<_>>()
            .join(",");
        let resp = self.query(&format!("SNAP? {args}"))?;
        let values = resp
            .split(',')
            .map(parse_response::<f64>)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|_| EndpointError::ResponseParseError(resp.clone()))?;
        if values.len() != params.len() {
            return Err(EndpointError::ResponseParseError(resp));
        }
        Ok(values)
    }

    /// Run the auto phase function.
    pub fn auto_phase(&mut self) -> Result<(), EndpointError> {
        self.sendcmd("APHS")
    }

    /// Run the auto gain function.
    pub fn auto_gain(&mut self) -> Result<(), EndpointError> {
        self.sendcmd("AGAN")
    }

    /// Run the auto reserve function.
    pub fn auto_reserve(&mut self) -> Result<(), EndpointError> {
        self.sendcmd("ARSV")
    }

    /// Read the demodulated signal and all settings at once.
    pub fn get_all(&mut self) -> Result<LockinStatus, EndpointError> {
        Ok(LockinStatus {
            x: self.get_x()?,
            y: self.get_y()?,
            r: self.get_r()?,
            theta: self.get_theta()?,
            amplitude: self.get_amplitude()?,
            frequency: self.get_frequency()?,
            sensitivity: self.get_sensitivity()?,
            time_constant: self.get_time_constant()?,
            input_config: self.get_input_config()?,
            input_coupling: self.get_input_coupling()?,
            reference_source: self.get_reference_source()?,
            harmonic: self.get_harmonic()?,
            trigger_slope: self.get_trigger_slope()?,
        })
    }

    fn read_output(&mut self, idx: u8) -> Result<f64, EndpointError> {
        parse_response(&self.query(&format!("OUTP? {idx}"))?)
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

impl<T: Endpoint> Clone for Sr830<T> {
    fn clone(&self) -> Self {
        Self {
            interface: Arc::clone(&self.interface),
        }
    }
}
