//! Helpers shared by the integration tests.

#![allow(dead_code)]

use std::{fs, path::PathBuf, time::Duration};

use scpi_endpoint::EndpointError;
use sweeplab::{Rig, SweepConfig};

/// A rig without instruments.
///
/// Each reading returns `2 * setpoint`, plus one on every other reading.
#[derive(Debug, Default)]
pub struct FakeRig {
    pub applied: Vec<Vec<f64>>,
    pub samples_taken: usize,
    pub fail_apply: bool,
    pub fail_sample: bool,
    pub prepared: bool,
    pub shut_down: bool,
}

impl Rig for FakeRig {
    fn setpoint_names(&self) -> Vec<String> {
        vec!["Current".to_string()]
    }

    fn channel_names(&self) -> Vec<String> {
        vec!["Voltage".to_string()]
    }

    fn prepare(&mut self) -> Result<(), EndpointError> {
        self.prepared = true;
        Ok(())
    }

    fn setpoints(&self, _point: usize, value: f64) -> Vec<f64> {
        vec![value]
    }

    fn apply(&mut self, setpoints: &[f64]) -> Result<(), EndpointError> {
        self.applied.push(setpoints.to_vec());
        if self.fail_apply {
            return Err(EndpointError::Timeout(Duration::ZERO));
        }
        Ok(())
    }

    fn sample(&mut self) -> Result<Vec<f64>, EndpointError> {
        self.samples_taken += 1;
        if self.fail_sample {
            return Err(EndpointError::ResponseParseError("garbage".to_string()));
        }
        let setpoint = self.applied.last().map_or(0.0, |s| s[0]);
        Ok(vec![2.0 * setpoint + (self.samples_taken % 2) as f64])
    }

    fn shutdown(&mut self) -> Result<(), EndpointError> {
        self.shut_down = true;
        Ok(())
    }
}

/// A sweep without delays.
pub fn sweep_config(start: f64, end: f64, points: usize) -> SweepConfig {
    SweepConfig {
        start,
        end,
        points,
        repeats: 1,
        samples: 1,
        sample_delay: Duration::ZERO,
        settle_delay: Duration::ZERO,
        alternating: false,
    }
}

/// An empty scratch directory unique to the calling test.
pub fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("sweeplab_{name}_{}", std::process::id()));
    if dir.exists() {
        fs::remove_dir_all(&dir).unwrap();
    }
    fs::create_dir_all(&dir).unwrap();
    dir
}
