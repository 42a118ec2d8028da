//! Run files: TOML descriptions of a sweep and the instruments it runs on.
//!
//! ```toml
//! [run]
//! experiment = "coil_a"
//! note = "4 K, contacts 1-4"
//!
//! [sweep]
//! start = -2.0
//! end = 2.0
//! points = 41
//! repeats = 3
//! samples = 5
//! sample_delay_ms = 50
//! settle_delay_ms = 500
//! alternating = true
//!
//! [pbz]
//! link = { kind = "serial", port = "/dev/ttyUSB0" }
//!
//! [b2900]
//! link = { kind = "tcp", address = "192.168.1.20:5025" }
//! currents = [1e-3, -1e-3]
//! voltage_compliance = 10.0
//! ```

use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use log::info;
use measurements::{Frequency, Voltage};
use scpi_endpoint::{Endpoint, EndpointError, SerialEndpoint, TcpIpEndpoint};
use serde::Deserialize;
use thiserror::Error;

use crate::{
    rig::LockinSettings,
    sweep::{SaveTarget, SweepConfig},
};

/// Errors that can occur while reading a run file.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// The file could not be read.
    #[error("Failed to read run file {path}: {source}")]
    Read {
        /// Path of the run file.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },
    /// The file is not a valid run description.
    #[error("Failed to parse run file: {0}")]
    Parse(#[from] toml::de::Error),
    /// A section the selected sweep needs is missing.
    #[error("Missing section [{0}] in run file")]
    MissingSection(&'static str),
    /// A setting holds a value no instrument accepts.
    #[error("Invalid value {value} for {key}")]
    InvalidValue {
        /// Name of the setting.
        key: &'static str,
        /// The rejected value.
        value: f64,
    },
}

/// A complete run description.
#[derive(Debug, Clone, Deserialize)]
pub struct RunConfig {
    /// Naming and output locations.
    #[serde(default)]
    pub run: RunSection,
    /// The sweep itself.
    pub sweep: SweepSection,
    /// The bipolar supply, used by both sweeps.
    pub pbz: InstrumentSection,
    /// The source-measure unit of the hysteresis sweep.
    pub b2900: Option<B2900Section>,
    /// The lock-in of the lock-in sweep.
    pub sr830: Option<Sr830Section>,
}

impl RunConfig {
    /// Read and parse a run file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::parse(&text)?;
        info!("Loaded run file {}", path.display());
        Ok(config)
    }

    /// Parse a run description.
    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// The B2900 section, required by the hysteresis sweep.
    pub fn b2900(&self) -> Result<&B2900Section, ConfigError> {
        self.b2900.as_ref().ok_or(ConfigError::MissingSection("b2900"))
    }

    /// The SR830 section, required by the lock-in sweep.
    pub fn sr830(&self) -> Result<&Sr830Section, ConfigError> {
        self.sr830.as_ref().ok_or(ConfigError::MissingSection("sr830"))
    }
}

/// The `[run]` table.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RunSection {
    /// Experiment name, prefix of the data files.
    pub experiment: String,
    /// Free text written into the human readable data file.
    pub note: String,
    /// Directory for data files.
    pub data_dir: PathBuf,
    /// Directory for chart images.
    pub plot_dir: PathBuf,
    /// Wait after resetting the instruments, in milliseconds.
    pub reset_settle_ms: u64,
}

impl Default for RunSection {
    fn default() -> Self {
        Self {
            experiment: "sweep".to_string(),
            note: String::new(),
            data_dir: PathBuf::from("data"),
            plot_dir: PathBuf::from("plots"),
            reset_settle_ms: 1000,
        }
    }
}

impl RunSection {
    /// Where the controller saves the data files.
    pub fn save_target(&self) -> SaveTarget {
        SaveTarget {
            dir: self.data_dir.clone(),
            experiment: self.experiment.clone(),
            note: self.note.clone(),
        }
    }

    /// Wait after resetting the instruments.
    pub fn reset_settle(&self) -> Duration {
        Duration::from_millis(self.reset_settle_ms)
    }
}

/// The `[sweep]` table. Delays are given in milliseconds.
#[derive(Debug, Clone, Deserialize)]
pub struct SweepSection {
    /// First value of the sweep.
    pub start: f64,
    /// Last value of the sweep.
    pub end: f64,
    /// Number of points per direction.
    pub points: usize,
    /// Number of passes.
    #[serde(default = "one")]
    pub repeats: usize,
    /// Number of readings per point.
    #[serde(default = "one")]
    pub samples: usize,
    /// Delay before each reading.
    #[serde(default)]
    pub sample_delay_ms: u64,
    /// Delay between setting the outputs and the first reading.
    #[serde(default = "default_settle_ms")]
    pub settle_delay_ms: u64,
    /// Walk backward after each forward walk.
    #[serde(default)]
    pub alternating: bool,
}

impl From<&SweepSection> for SweepConfig {
    fn from(section: &SweepSection) -> Self {
        SweepConfig {
            start: section.start,
            end: section.end,
            points: section.points,
            repeats: section.repeats,
            samples: section.samples,
            sample_delay: Duration::from_millis(section.sample_delay_ms),
            settle_delay: Duration::from_millis(section.settle_delay_ms),
            alternating: section.alternating,
        }
    }
}

fn one() -> usize {
    1
}

fn default_settle_ms() -> u64 {
    500
}

/// How an instrument is connected.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Link {
    /// A serial port.
    Serial {
        /// Port name, e.g., `/dev/ttyUSB0` or `COM3`.
        port: String,
        /// Baud rate.
        #[serde(default = "default_baud_rate")]
        baud_rate: u32,
    },
    /// A raw TCP socket, e.g., SCPI on port 5025 or an ethernet-to-serial bridge.
    Tcp {
        /// Address in `host:port` notation.
        address: String,
        /// Read timeout in milliseconds.
        #[serde(default = "default_timeout_ms")]
        timeout_ms: u64,
    },
}

fn default_baud_rate() -> u32 {
    9600
}

fn default_timeout_ms() -> u64 {
    3000
}

impl Link {
    /// Open the endpoint this link describes.
    pub fn open(&self) -> Result<Box<dyn Endpoint>, EndpointError> {
        let endpoint: Box<dyn Endpoint> = match self {
            Link::Serial { port, baud_rate } => Box::new(SerialEndpoint::simple(port, *baud_rate)?),
            Link::Tcp {
                address,
                timeout_ms,
            } => Box::new(TcpIpEndpoint::with_timeout(
                address,
                Duration::from_millis(*timeout_ms),
            )?),
        };
        Ok(endpoint)
    }
}

/// An instrument table that only holds a link.
#[derive(Debug, Clone, Deserialize)]
pub struct InstrumentSection {
    /// How the instrument is connected.
    pub link: Link,
}

/// The `[b2900]` table.
#[derive(Debug, Clone, Deserialize)]
pub struct B2900Section {
    /// How the instrument is connected.
    pub link: Link,
    /// Bias currents in amperes, cycled through point by point.
    pub currents: Vec<f64>,
    /// Voltage compliance in volts.
    #[serde(default = "default_compliance")]
    pub voltage_compliance: f64,
}

fn default_compliance() -> f64 {
    10.0
}

/// The `[sr830]` table. Unset settings are left as they are on the instrument.
#[derive(Debug, Clone, Deserialize)]
pub struct Sr830Section {
    /// How the instrument is connected.
    pub link: Link,
    /// Reference frequency in hertz.
    pub frequency_hz: Option<f64>,
    /// Sine output amplitude in volts.
    pub amplitude_v: Option<f64>,
    /// Time constant in seconds.
    pub time_constant_s: Option<f64>,
    /// Full scale sensitivity in volts.
    pub sensitivity_v: Option<f64>,
}

impl Sr830Section {
    /// Settings applied when the lock-in rig is prepared.
    ///
    /// Every value that is set must be finite and positive.
    pub fn settings(&self) -> Result<LockinSettings, ConfigError> {
        Ok(LockinSettings {
            frequency: positive("frequency_hz", self.frequency_hz)?.map(Frequency::from_hertz),
            amplitude: positive("amplitude_v", self.amplitude_v)?.map(Voltage::from_volts),
            time_constant: positive("time_constant_s", self.time_constant_s)?
                .map(Duration::from_secs_f64),
            sensitivity: positive("sensitivity_v", self.sensitivity_v)?.map(Voltage::from_volts),
        })
    }
}

fn positive(key: &'static str, value: Option<f64>) -> Result<Option<f64>, ConfigError> {
    match value {
        Some(v) if !(v.is_finite() && v > 0.0) => Err(ConfigError::InvalidValue { key, value: v }),
        _ => Ok(value),
    }
}
