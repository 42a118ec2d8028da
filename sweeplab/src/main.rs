use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use log::{info, warn};

use keysight_b2900::B2900;
use kikusui_pbz::Pbz;
use measurements::Voltage;
use stanford_sr830::Sr830;
use sweeplab::{
    HysteresisRig, LockinRig, RecordLayout, Recorder, Rig, Session, SweepConfig, SweepController,
    chart::export_charts, config::RunConfig,
};

/// Current sweeps on a Kikusui PBZ with a Keysight B2900 or an SR830 as detector.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Sweep the PBZ current and measure the B2900 voltage.
    Hysteresis {
        /// Run file in TOML format.
        config: PathBuf,
    },
    /// Sweep the PBZ current and read X and Y from the SR830.
    Lockin {
        /// Run file in TOML format.
        config: PathBuf,
    },
    /// Load a saved run and chart its latest pass.
    Load {
        /// A `.csv` or `.txt` file written by a previous run.
        file: PathBuf,
        /// Directory for the chart images.
        #[arg(long, default_value = "plots")]
        plot_dir: PathBuf,
    },
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match Cli::parse().command {
        Command::Hysteresis { config } => hysteresis(&config),
        Command::Lockin { config } => lockin(&config),
        Command::Load { file, plot_dir } => load(&file, &plot_dir),
    }
}

fn hysteresis(path: &Path) -> Result<()> {
    let config = RunConfig::from_file(path)?;
    let b2900 = config.b2900()?;

    let pbz_link = config.pbz.link.open().context("Failed to connect to the PBZ")?;
    let smu_link = b2900.link.open().context("Failed to connect to the B2900")?;
    let rig = HysteresisRig::new(
        Pbz::try_new(pbz_link)?,
        B2900::try_new(smu_link)?,
        b2900.currents.clone(),
        Voltage::from_volts(b2900.voltage_compliance),
    )
    .with_reset_settle(config.run.reset_settle());
    run(rig, &config)
}

fn lockin(path: &Path) -> Result<()> {
    let config = RunConfig::from_file(path)?;
    let sr830 = config.sr830()?;
    let settings = sr830.settings()?;

    let pbz_link = config.pbz.link.open().context("Failed to connect to the PBZ")?;
    let lockin_link = sr830.link.open().context("Failed to connect to the SR830")?;
    let rig = LockinRig::new(
        Pbz::try_new(pbz_link)?,
        Sr830::try_new(lockin_link)?,
        settings,
    )
    .with_reset_settle(config.run.reset_settle());
    run(rig, &config)
}

fn run<R: Rig>(rig: R, config: &RunConfig) -> Result<()> {
    let mut controller = SweepController::new(rig).with_save_target(config.run.save_target());
    controller.configure(SweepConfig::from(&config.sweep))?;
    info!(
        "Sweep will measure {} points",
        SweepConfig::from(&config.sweep).total_points()
    );

    let mut session = Session::new(controller, &config.run.plot_dir, &config.run.experiment);
    let report = session.run().context("Sweep failed")?;
    info!(
        "Measured {} points, wrote {} chart(s)",
        report.measured,
        report.charts.len()
    );
    if report.saved.is_none() {
        bail!("the run finished but its data could not be saved");
    }
    Ok(())
}

fn load(file: &Path, plot_dir: &Path) -> Result<()> {
    // Files without header row are read with the hysteresis layout.
    let layout = RecordLayout::new(["PBZ_Current", "Keysight_Current"], ["B2900_Voltage"]);
    let mut recorder = Recorder::new(layout);
    let report = recorder
        .load(file)
        .with_context(|| format!("Failed to load {}", file.display()))?;
    if !report.skipped.is_empty() {
        warn!("Skipped {} malformed line(s)", report.skipped.len());
    }
    if report.failure.is_some() {
        warn!("Only the records before the invalid line were loaded");
    }

    let Some(pass) = recorder.latest_pass() else {
        bail!("no valid data found in {}", file.display());
    };
    info!("Loaded {} records, showing pass {pass}", report.loaded);
    let name = file
        .file_stem()
        .map_or_else(|| file.display().to_string(), |s| s.to_string_lossy().into_owned());
    let title = format!("{name} pass {pass}");
    export_charts(recorder.pass(pass), recorder.layout(), plot_dir, &title)?;
    Ok(())
}
