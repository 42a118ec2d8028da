use std::{thread, time::Duration};

use keysight_b2900::B2900;
use kikusui_pbz::{OperationMode, Pbz};
use log::{info, warn};
use measurements::{Current, Voltage};
use scpi_endpoint::{Endpoint, EndpointError};

use super::Rig;
use crate::error::SweepError;

/// PBZ sweeps the field current, the B2900 sources a bias current and measures the voltage.
///
/// The bias current of the `n`-th point of a direction is `secondary[n % secondary.len()]`.
pub struct HysteresisRig<P: Endpoint, K: Endpoint> {
    pbz: Pbz<P>,
    smu: B2900<K>,
    secondary: Vec<f64>,
    compliance: Voltage,
    reset_settle: Duration,
}

impl<P: Endpoint, K: Endpoint> HysteresisRig<P, K> {
    /// Create a rig from the two drivers, the bias currents in amperes, and the voltage
    /// compliance of the B2900.
    pub fn new(pbz: Pbz<P>, smu: B2900<K>, secondary: Vec<f64>, compliance: Voltage) -> Self {
        Self {
            pbz,
            smu,
            secondary,
            compliance,
            reset_settle: Duration::from_secs(1),
        }
    }

    /// Time to wait after resetting the instruments. Defaults to one second.
    pub fn with_reset_settle(mut self, delay: Duration) -> Self {
        self.reset_settle = delay;
        self
    }
}

impl<P: Endpoint, K: Endpoint> Rig for HysteresisRig<P, K> {
    fn setpoint_names(&self) -> Vec<String> {
        vec!["PBZ_Current".to_string(), "Keysight_Current".to_string()]
    }

    fn channel_names(&self) -> Vec<String> {
        vec!["B2900_Voltage".to_string()]
    }

    fn validate(&self) -> Result<(), SweepError> {
        if self.secondary.is_empty() {
            return Err(SweepError::InvalidConfiguration(
                "the list of B2900 currents is empty".to_string(),
            ));
        }
        if self.secondary.iter().any(|c| !c.is_finite()) {
            return Err(SweepError::InvalidConfiguration(
                "the B2900 currents must be finite".to_string(),
            ));
        }
        Ok(())
    }

    fn prepare(&mut self) -> Result<(), EndpointError> {
        let pbz_name = self.pbz.get_name()?;
        info!("PBZ: {pbz_name}");
        let smu_name = self.smu.get_name()?;
        info!("B2900: {smu_name}");
        self.pbz.reset()?;
        self.smu.reset()?;
        thread::sleep(self.reset_settle);

        self.pbz.set_mode(OperationMode::ConstantCurrent)?;
        self.pbz.set_current(Current::from_amperes(0.0))?;
        self.pbz.set_output(true)?;

        self.smu.apply_current(Current::from_amperes(0.0))?;
        self.smu.set_voltage_compliance(self.compliance)?;
        self.smu.set_output(true)
    }

    fn setpoints(&self, point: usize, value: f64) -> Vec<f64> {
        let bias = match self.secondary.len() {
            0 => 0.0,
            n => self.secondary[point % n],
        };
        vec![value, bias]
    }

    fn apply(&mut self, setpoints: &[f64]) -> Result<(), EndpointError> {
        let [field, bias] = setpoints else {
            return Err(EndpointError::InvalidArgument(format!(
                "expected 2 setpoints, got {}",
                setpoints.len()
            )));
        };
        self.pbz.set_current(Current::from_amperes(*field))?;
        self.smu.apply_current(Current::from_amperes(*bias))
    }

    fn sample(&mut self) -> Result<Vec<f64>, EndpointError> {
        Ok(vec![self.smu.measure_voltage()?.as_volts()])
    }

    fn shutdown(&mut self) -> Result<(), EndpointError> {
        let pbz = self
            .pbz
            .set_current(Current::from_amperes(0.0))
            .and_then(|_| self.pbz.set_output(false));
        if let Err(err) = &pbz {
            warn!("Failed to switch off the PBZ: {err}");
        }
        self.smu.apply_current(Current::from_amperes(0.0))?;
        self.smu.set_output(false)?;
        pbz
    }
}
