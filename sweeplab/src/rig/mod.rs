//! Rigs couple the sweep controller to a set of instruments.

mod hysteresis;
mod lockin;

pub use hysteresis::HysteresisRig;
pub use lockin::{LockinRig, LockinSettings};

use scpi_endpoint::EndpointError;

use crate::error::SweepError;

/// A set of instruments the sweep controller can set and sample.
///
/// The controller calls [`Rig::apply`] once per point and [`Rig::sample`] once per reading.
/// Preparing and shutting down the instruments is left to whoever owns the run.
pub trait Rig {
    /// Names of the values set per point, e.g., `PBZ_Current`.
    fn setpoint_names(&self) -> Vec<String>;

    /// Names of the measured channels. [`Rig::sample`] returns one value per channel.
    fn channel_names(&self) -> Vec<String>;

    /// Check rig parameters before a run is configured.
    fn validate(&self) -> Result<(), SweepError> {
        Ok(())
    }

    /// Bring the instruments into a defined state with outputs on.
    fn prepare(&mut self) -> Result<(), EndpointError>;

    /// The setpoints for the `point`-th point of a direction at sweep value `value`.
    fn setpoints(&self, point: usize, value: f64) -> Vec<f64>;

    /// Push setpoints to the instruments.
    fn apply(&mut self, setpoints: &[f64]) -> Result<(), EndpointError>;

    /// Take one reading of every channel.
    fn sample(&mut self) -> Result<Vec<f64>, EndpointError>;

    /// Set outputs to zero and switch them off.
    fn shutdown(&mut self) -> Result<(), EndpointError>;
}
