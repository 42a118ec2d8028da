//! Headless presentation: drive a controller to completion and report progress through the log.

use std::path::PathBuf;

use log::{error, info, warn};

use crate::{
    chart::export_charts,
    error::{RecordError, SweepError},
    record::{Record, SavedFiles},
    rig::Rig,
    sweep::{StepOutcome, SweepController},
};

/// Per-channel summary over the point means of a run.
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelSummary {
    /// Channel name.
    pub name: String,
    /// Average of the finite point means.
    pub mean: f64,
    /// Largest finite point mean.
    pub max: f64,
}

/// What a completed session produced.
#[derive(Debug, Clone, Default)]
pub struct SessionReport {
    /// Number of points measured.
    pub measured: usize,
    /// Data files of the final save, if it succeeded.
    pub saved: Option<SavedFiles>,
    /// All chart images written.
    pub charts: Vec<PathBuf>,
    /// Summary per channel.
    pub summary: Vec<ChannelSummary>,
}

/// What a manual save produced.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    /// Data files, `None` without save target.
    pub saved: Option<SavedFiles>,
    /// Charts of the current pass.
    pub charts: Vec<PathBuf>,
}

/// Runs a configured [`SweepController`] from start to finish.
pub struct Session<R: Rig> {
    controller: SweepController<R>,
    plot_dir: PathBuf,
    title: String,
}

impl<R: Rig> Session<R> {
    /// Create a session that writes its charts into `plot_dir`.
    pub fn new(controller: SweepController<R>, plot_dir: impl Into<PathBuf>, title: &str) -> Self {
        Self {
            controller,
            plot_dir: plot_dir.into(),
            title: title.to_string(),
        }
    }

    /// The controller driven by this session.
    pub fn controller(&self) -> &SweepController<R> {
        &self.controller
    }

    /// Save the record log now and chart the current pass.
    ///
    /// Chart failures are logged as during a run, only a failed data save is returned.
    pub fn save(&mut self) -> Result<Snapshot, RecordError> {
        let saved = self.controller.save()?;
        let charts = self.export(self.controller.current_pass());
        Ok(Snapshot { saved, charts })
    }

    /// Prepare the rig, run all passes, and shut the rig down.
    ///
    /// Failing to prepare the rig or to start the run is returned as error. Failures after that
    /// are logged and do not stop the run.
    pub fn run(&mut self) -> Result<SessionReport, SweepError> {
        self.controller.rig_mut().prepare()?;
        let result = self.sweep();
        if let Err(err) = self.controller.rig_mut().shutdown() {
            warn!("Failed to shut down the instruments: {err}");
        }
        result
    }

    fn sweep(&mut self) -> Result<SessionReport, SweepError> {
        self.controller.start()?;
        let mut report = SessionReport::default();
        let mut pass = self.controller.state().pass;

        loop {
            match self.controller.step() {
                StepOutcome::Measured(record) => {
                    report.measured += 1;
                    info!("{}", self.status_line(&record));
                }
                StepOutcome::Turned {
                    pass: next,
                    direction,
                } => {
                    info!("Pass {next}, direction {direction}");
                    if next != pass {
                        report.charts.extend(self.export(pass));
                        pass = next;
                    }
                }
                StepOutcome::Done => {
                    report.charts.extend(self.export(pass));
                    break;
                }
                StepOutcome::Idle => break,
            }
        }

        report.saved = self.controller.last_saved().cloned();
        match &report.saved {
            Some(files) => info!(
                "Data saved to {} and {}",
                files.csv.display(),
                files.txt.display()
            ),
            None => warn!("Run data was not saved"),
        }
        report.summary = summarize(self.controller.recorder().records(), &self.channel_names());
        for ch in &report.summary {
            info!("Final stats {}: mean {:.4e}, max {:.4e}", ch.name, ch.mean, ch.max);
        }
        Ok(report)
    }

    /// One line per point: setpoint, mean ± std of every channel, direction.
    fn status_line(&self, record: &Record) -> String {
        let setpoint = record.setpoints.first().copied().unwrap_or(f64::NAN);
        let readings = self
            .channel_names()
            .iter()
            .zip(&record.readings)
            .map(|(name, r)| format!("{name}: {:.4e}±{:.1e}", r.mean, r.std))
            .collect::<Vec<_>>()
            .join(" | ");
        format!(
            "{setpoint:.4e} | {readings} | {} (pass {})",
            record.direction, record.pass
        )
    }

    fn channel_names(&self) -> Vec<String> {
        self.controller.recorder().layout().channels.clone()
    }

    /// Export the charts of one pass, logging instead of failing.
    fn export(&self, pass: usize) -> Vec<PathBuf> {
        let recorder = self.controller.recorder();
        let title = format!("{} pass {pass}", self.title);
        match export_charts(recorder.pass(pass), recorder.layout(), &self.plot_dir, &title) {
            Ok(paths) => paths,
            Err(err) => {
                error!("Chart export failed: {err}");
                Vec::new()
            }
        }
    }
}

/// Mean and maximum of the finite point means per channel.
pub fn summarize(records: &[Record], channels: &[String]) -> Vec<ChannelSummary> {
    channels
        .iter()
        .enumerate()
        .filter_map(|(ch, name)| {
            let means: Vec<f64> = records
                .iter()
                .filter_map(|r| r.readings.get(ch).map(|r| r.mean))
                .filter(|m| m.is_finite())
                .collect();
            if means.is_empty() {
                return None;
            }
            Some(ChannelSummary {
                name: name.clone(),
                mean: means.iter().sum::<f64>() / means.len() as f64,
                max: means.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            })
        })
        .collect()
}
