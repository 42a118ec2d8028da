//! Current sweeps with averaged readings.
//!
//! A [`SweepController`] walks a [`Rig`] through the evenly spaced points of a sweep, forward
//! and optionally backward, for a number of passes. At each point the rig's outputs are set,
//! the readings of every channel are averaged, and the result is appended as a [`Record`] to a
//! [`Recorder`], which saves the run as a comma separated and a tab separated file.
//!
//! Two rigs are provided:
//!
//! - [`HysteresisRig`]: a Kikusui PBZ sweeps the field current while a Keysight B2900 sources a
//!   bias current and measures the voltage.
//! - [`LockinRig`]: a Kikusui PBZ sweeps the current while an SR830 reads X and Y.
//!
//! # Example
//!
//! ```no_run
//! use std::time::Duration;
//!
//! use keysight_b2900::B2900;
//! use kikusui_pbz::{Pbz, SerialInterfacePbz};
//! use measurements::Voltage;
//! use scpi_endpoint::TcpIpEndpoint;
//! use sweeplab::{HysteresisRig, Rig, SaveTarget, StepOutcome, SweepConfig, SweepController};
//!
//! let pbz = Pbz::try_new(SerialInterfacePbz::simple("/dev/ttyUSB0").unwrap()).unwrap();
//! let smu = B2900::try_new(TcpIpEndpoint::simple("192.168.1.20:5025").unwrap()).unwrap();
//! let rig = HysteresisRig::new(pbz, smu, vec![1e-3], Voltage::from_volts(10.0));
//!
//! let mut ctrl = SweepController::new(rig).with_save_target(SaveTarget {
//!     dir: "data".into(),
//!     experiment: "coil_a".to_string(),
//!     note: "first cooldown".to_string(),
//! });
//! ctrl.configure(SweepConfig {
//!     start: -1.0,
//!     end: 1.0,
//!     points: 21,
//!     repeats: 2,
//!     samples: 5,
//!     sample_delay: Duration::from_millis(50),
//!     settle_delay: Duration::from_millis(500),
//!     alternating: true,
//! })
//! .unwrap();
//!
//! ctrl.rig_mut().prepare().unwrap();
//! ctrl.start().unwrap();
//! while ctrl.step() != StepOutcome::Done {}
//! ctrl.rig_mut().shutdown().unwrap();
//! ```

#![warn(missing_docs)]

pub mod chart;
pub mod config;
mod error;
mod record;
mod rig;
mod session;
mod stats;
mod sweep;

pub use error::{ChartError, RecordError, SweepError};
pub use record::{LoadReport, Reading, Record, RecordLayout, Recorder, SavedFiles};
pub use rig::{HysteresisRig, LockinRig, LockinSettings, Rig};
pub use session::{ChannelSummary, Session, SessionReport, Snapshot, summarize};
pub use stats::mean_std;
pub use sweep::{
    Direction, RunStatus, SaveTarget, StepOutcome, SweepConfig, SweepController, SweepState,
};
