//! The sweep controller: a finite state machine advanced one point per [`SweepController::step`].
//!
//! A run walks the evenly spaced values between `start` and `end` forward, and if alternating is
//! enabled, backward over the same values right after. Each point sets the rig's outputs, waits
//! for the settle delay, and reduces `samples` readings per channel to mean and standard
//! deviation. A pass is one forward walk, or a forward and backward pair when alternating.

use std::{
    fmt::Display,
    path::PathBuf,
    str::FromStr,
    thread,
    time::Duration,
};

use chrono::Local;
use log::{error, info, warn};

use crate::{
    error::{RecordError, SweepError},
    record::{Reading, Record, RecordLayout, Recorder, SavedFiles},
    rig::Rig,
    stats::mean_std,
};

/// Direction a sweep walks its values in.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// From `start` to `end`.
    #[default]
    Forward,
    /// From `end` to `start`.
    Backward,
}

impl Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Direction::Forward => write!(f, "Forward"),
            Direction::Backward => write!(f, "Backward"),
        }
    }
}

impl FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "forward" => Ok(Direction::Forward),
            "backward" => Ok(Direction::Backward),
            _ => Err(format!("Unknown direction: {s}")),
        }
    }
}

/// Configuration of a sweep. It cannot be changed while a run is in progress.
#[derive(Debug, Clone, PartialEq)]
pub struct SweepConfig {
    /// First value of the sweep.
    pub start: f64,
    /// Last value of the sweep.
    pub end: f64,
    /// Number of points per direction.
    pub points: usize,
    /// Number of passes.
    pub repeats: usize,
    /// Number of readings per point.
    pub samples: usize,
    /// Delay before each reading.
    pub sample_delay: Duration,
    /// Delay between setting the outputs and the first reading.
    pub settle_delay: Duration,
    /// Walk backward after each forward walk.
    pub alternating: bool,
}

impl SweepConfig {
    /// Check the invariants of the configuration.
    pub fn validate(&self) -> Result<(), SweepError> {
        let fail = |msg: &str| Err(SweepError::InvalidConfiguration(msg.to_string()));
        if self.points == 0 {
            return fail("point count must be at least 1");
        }
        if self.repeats == 0 {
            return fail("repeat count must be at least 1");
        }
        if self.samples == 0 {
            return fail("samples per point must be at least 1");
        }
        if !self.start.is_finite() || !self.end.is_finite() {
            return fail("start and end must be finite");
        }
        Ok(())
    }

    /// The evenly spaced values of the forward walk.
    ///
    /// The first value is `start`, the last is `end`. A single point sits at `start`.
    pub fn values(&self) -> Vec<f64> {
        if self.points == 1 {
            return vec![self.start];
        }
        let last = self.points - 1;
        let step = (self.end - self.start) / last as f64;
        (0..self.points)
            .map(|i| {
                if i == last {
                    self.end
                } else {
                    self.start + step * i as f64
                }
            })
            .collect()
    }

    /// Number of points measured by a complete run.
    pub fn total_points(&self) -> usize {
        let directions = if self.alternating { 2 } else { 1 };
        self.points * directions * self.repeats
    }
}

/// Run status of the controller.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    /// No run was started yet.
    #[default]
    Idle,
    /// Steps are executed.
    Running,
    /// Steps are ignored until the run is resumed.
    Paused,
    /// All passes are complete.
    Finished,
}

/// Position of the controller within a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SweepState {
    /// Pass index, starting at 1.
    pub pass: usize,
    /// Current direction.
    pub direction: Direction,
    /// Index of the next point within the current direction.
    pub point: usize,
    /// Run status.
    pub status: RunStatus,
}

impl Default for SweepState {
    fn default() -> Self {
        Self {
            pass: 1,
            direction: Direction::Forward,
            point: 0,
            status: RunStatus::Idle,
        }
    }
}

/// What a call to [`SweepController::step`] did.
#[derive(Debug, Clone, PartialEq)]
pub enum StepOutcome {
    /// A point was measured and recorded.
    Measured(Record),
    /// The sweep turned around or started a new pass.
    Turned {
        /// Pass index after the turn.
        pass: usize,
        /// Direction after the turn.
        direction: Direction,
    },
    /// All passes are complete. The final save has been attempted.
    Done,
    /// The controller is not running, nothing was done.
    Idle,
}

/// Where and under which name runs are saved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveTarget {
    /// Directory the data files are written to.
    pub dir: PathBuf,
    /// Experiment name, used as file name prefix.
    pub experiment: String,
    /// Free text written as first line of the human readable file.
    pub note: String,
}

impl SaveTarget {
    /// Base path for a save of the given pass, e.g., `data/coil_measurement_20250101_120000_pass2`.
    pub fn base_path(&self, pass: usize) -> PathBuf {
        let timestamp = Local::now().format("%Y%m%d_%H%M%S");
        self.dir
            .join(format!("{}_measurement_{timestamp}_pass{pass}", self.experiment))
    }
}

/// Drives a [`Rig`] through a sweep and records the results.
pub struct SweepController<R: Rig> {
    rig: R,
    config: Option<SweepConfig>,
    values: Vec<f64>,
    state: SweepState,
    recorder: Recorder,
    target: Option<SaveTarget>,
    last_saved: Option<SavedFiles>,
}

impl<R: Rig> SweepController<R> {
    /// Create an idle controller for the given rig.
    pub fn new(rig: R) -> Self {
        let layout = RecordLayout::new(rig.setpoint_names(), rig.channel_names());
        Self {
            rig,
            config: None,
            values: Vec::new(),
            state: SweepState::default(),
            recorder: Recorder::new(layout),
            target: None,
            last_saved: None,
        }
    }

    /// Save runs to the given target, on [`Self::save`] and when a run finishes.
    pub fn with_save_target(mut self, target: SaveTarget) -> Self {
        self.target = Some(target);
        self
    }

    /// Validate and store a configuration.
    ///
    /// Fails if the configuration or the rig is invalid, or if a run is in progress.
    pub fn configure(&mut self, config: SweepConfig) -> Result<(), SweepError> {
        if matches!(self.state.status, RunStatus::Running | RunStatus::Paused) {
            return Err(SweepError::InvalidConfiguration(
                "cannot reconfigure while a run is in progress".to_string(),
            ));
        }
        config.validate()?;
        self.rig.validate()?;
        self.values = config.values();
        info!(
            "Configured sweep from {} to {} in {} points, {} pass(es), {} sample(s) per point",
            config.start, config.end, config.points, config.repeats, config.samples
        );
        self.config = Some(config);
        Ok(())
    }

    /// Start a new run from the first point of the first pass. Clears the record log.
    pub fn start(&mut self) -> Result<(), SweepError> {
        if self.config.is_none() {
            return Err(SweepError::InvalidConfiguration(
                "no sweep configured".to_string(),
            ));
        }
        self.recorder.clear();
        self.last_saved = None;
        self.state = SweepState {
            status: RunStatus::Running,
            ..SweepState::default()
        };
        info!("Run started");
        Ok(())
    }

    /// Advance the run by one unit of work.
    pub fn step(&mut self) -> StepOutcome {
        if self.state.status != RunStatus::Running {
            return StepOutcome::Idle;
        }
        let Some(config) = self.config.clone() else {
            return StepOutcome::Idle;
        };
        if self.state.point >= config.points {
            return self.turn(&config);
        }

        let idx = match self.state.direction {
            Direction::Forward => self.state.point,
            Direction::Backward => config.points - 1 - self.state.point,
        };
        let setpoints = self.rig.setpoints(self.state.point, self.values[idx]);
        if let Err(err) = self.rig.apply(&setpoints) {
            warn!("Failed to apply setpoints {setpoints:?}: {err}");
        }
        thread::sleep(config.settle_delay);

        let channels = self.recorder.layout().channels.len();
        let mut samples = vec![Vec::with_capacity(config.samples); channels];
        for _ in 0..config.samples {
            thread::sleep(config.sample_delay);
            let values = match self.rig.sample() {
                Ok(values) if values.len() == channels => values,
                Ok(values) => {
                    warn!("Expected {channels} values, got {}", values.len());
                    vec![f64::NAN; channels]
                }
                Err(err) => {
                    warn!("Reading failed: {err}");
                    vec![f64::NAN; channels]
                }
            };
            for (ch, value) in samples.iter_mut().zip(values) {
                ch.push(value);
            }
        }

        let readings = samples
            .iter()
            .map(|s| {
                let (mean, std) = mean_std(s);
                Reading { mean, std }
            })
            .collect();
        let record = Record {
            pass: self.state.pass,
            direction: self.state.direction,
            setpoints,
            readings,
        };
        self.recorder.append(record.clone());
        self.state.point += 1;
        StepOutcome::Measured(record)
    }

    fn turn(&mut self, config: &SweepConfig) -> StepOutcome {
        let pass_complete = match (config.alternating, self.state.direction) {
            (true, Direction::Forward) => {
                self.state.direction = Direction::Backward;
                false
            }
            (true, Direction::Backward) => {
                self.state.direction = Direction::Forward;
                true
            }
            (false, _) => true,
        };
        if pass_complete {
            self.state.pass += 1;
        }
        if self.state.pass > config.repeats {
            self.state.status = RunStatus::Finished;
            info!("Run finished after {} pass(es)", config.repeats);
            if let Err(err) = self.save() {
                error!("Final save failed: {err}");
            }
            return StepOutcome::Done;
        }
        self.state.point = 0;
        info!(
            "Pass {}/{}, direction {}",
            self.state.pass, config.repeats, self.state.direction
        );
        StepOutcome::Turned {
            pass: self.state.pass,
            direction: self.state.direction,
        }
    }

    /// Stop executing steps until [`Self::resume`] is called. Does nothing unless running.
    pub fn pause(&mut self) {
        if self.state.status == RunStatus::Running {
            self.state.status = RunStatus::Paused;
            info!("Run paused at pass {}, point {}", self.state.pass, self.state.point);
        }
    }

    /// Continue a paused run where it stopped. Does nothing unless paused.
    pub fn resume(&mut self) {
        if self.state.status == RunStatus::Paused {
            self.state.status = RunStatus::Running;
            info!("Run resumed");
        }
    }

    /// Write the record log to the save target.
    ///
    /// Returns `None` if no save target is set. A failed save leaves the records untouched.
    pub fn save(&mut self) -> Result<Option<SavedFiles>, RecordError> {
        let Some(target) = &self.target else {
            return Ok(None);
        };
        let files = self
            .recorder
            .save(&target.base_path(self.current_pass()), &target.note)?;
        self.last_saved = Some(files.clone());
        Ok(Some(files))
    }

    /// The pass being measured, or the last one once the run is finished.
    pub fn current_pass(&self) -> usize {
        match self.config.as_ref() {
            Some(config) => self.state.pass.min(config.repeats),
            None => self.state.pass,
        }
    }

    /// Snapshot of the current position and status.
    pub fn state(&self) -> SweepState {
        self.state
    }

    /// The stored configuration, if any.
    pub fn config(&self) -> Option<&SweepConfig> {
        self.config.as_ref()
    }

    /// The record log of the current run.
    pub fn recorder(&self) -> &Recorder {
        &self.recorder
    }

    /// Files written by the latest successful save of the current run.
    pub fn last_saved(&self) -> Option<&SavedFiles> {
        self.last_saved.as_ref()
    }

    /// The rig driven by this controller.
    pub fn rig(&self) -> &R {
        &self.rig
    }

    /// Mutable access to the rig, e.g., to prepare or shut it down.
    pub fn rig_mut(&mut self) -> &mut R {
        &mut self.rig
    }
}
