use std::{thread, time::Duration};

use kikusui_pbz::{OperationMode, Pbz};
use log::{info, warn};
use measurements::{Current, Frequency, Voltage};
use scpi_endpoint::{Endpoint, EndpointError};
use stanford_sr830::{OutputInterface, SnapParameter, Sr830};

use super::Rig;

/// Lock-in settings applied when the rig is prepared. Unset values are left as they are.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct LockinSettings {
    /// Reference frequency.
    pub frequency: Option<Frequency>,
    /// Amplitude of the sine output.
    pub amplitude: Option<Voltage>,
    /// Time constant, one of the instrument's table values.
    pub time_constant: Option<Duration>,
    /// Full scale sensitivity, one of the instrument's table values.
    pub sensitivity: Option<Voltage>,
}

/// PBZ sweeps the current, the SR830 reads X and Y in one snapshot per sample.
pub struct LockinRig<P: Endpoint, L: Endpoint> {
    pbz: Pbz<P>,
    lockin: Sr830<L>,
    settings: LockinSettings,
    reset_settle: Duration,
}

impl<P: Endpoint, L: Endpoint> LockinRig<P, L> {
    /// Create a rig from the two drivers.
    pub fn new(pbz: Pbz<P>, lockin: Sr830<L>, settings: LockinSettings) -> Self {
        Self {
            pbz,
            lockin,
            settings,
            reset_settle: Duration::from_secs(1),
        }
    }

    /// Time to wait after resetting the PBZ. Defaults to one second.
    pub fn with_reset_settle(mut self, delay: Duration) -> Self {
        self.reset_settle = delay;
        self
    }
}

impl<P: Endpoint, L: Endpoint> Rig for LockinRig<P, L> {
    fn setpoint_names(&self) -> Vec<String> {
        vec!["PBZ_Current".to_string()]
    }

    fn channel_names(&self) -> Vec<String> {
        vec!["X".to_string(), "Y".to_string()]
    }

    fn prepare(&mut self) -> Result<(), EndpointError> {
        self.lockin.set_output_interface(OutputInterface::Rs232)?;
        let pbz_name = self.pbz.get_name()?;
        info!("PBZ: {pbz_name}");
        let lockin_name = self.lockin.get_name()?;
        info!("SR830: {lockin_name}");
        self.pbz.reset()?;
        thread::sleep(self.reset_settle);

        self.pbz.set_mode(OperationMode::ConstantCurrent)?;
        self.pbz.set_current(Current::from_amperes(0.0))?;
        self.pbz.set_output(true)?;

        if let Some(frequency) = self.settings.frequency {
            self.lockin.set_frequency(frequency)?;
        }
        if let Some(amplitude) = self.settings.amplitude {
            self.lockin.set_amplitude(amplitude)?;
        }
        if let Some(time_constant) = self.settings.time_constant {
            self.lockin.set_time_constant(time_constant)?;
        }
        if let Some(sensitivity) = self.settings.sensitivity {
            self.lockin.set_sensitivity(sensitivity)?;
        }
        Ok(())
    }

    fn setpoints(&self, _point: usize, value: f64) -> Vec<f64> {
        vec![value]
    }

    fn apply(&mut self, setpoints: &[f64]) -> Result<(), EndpointError> {
        match setpoints {
            [current] => self.pbz.set_current(Current::from_amperes(*current)),
            _ => Err(EndpointError::InvalidArgument(format!(
                "expected 1 setpoint, got {}",
                setpoints.len()
            ))),
        }
    }

    fn sample(&mut self) -> Result<Vec<f64>, EndpointError> {
        self.lockin.snap(&[SnapParameter::X, SnapParameter::Y])
    }

    fn shutdown(&mut self) -> Result<(), EndpointError> {
        if let Err(err) = self.pbz.set_current(Current::from_amperes(0.0)) {
            warn!("Failed to set the PBZ current to zero: {err}");
        }
        self.pbz.set_output(false)
    }
}
