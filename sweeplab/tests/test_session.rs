//! Tests for running a whole session.

mod common;

use rstest::*;

use sweeplab::{
    ChannelSummary, Direction, Reading, Record, Recorder, SaveTarget, Session, StepOutcome,
    SweepConfig, SweepController, summarize,
};

use common::{FakeRig, scratch_dir, sweep_config};

#[rstest]
fn test_session_run() {
    let dir = scratch_dir("session_run");
    let mut ctrl = SweepController::new(FakeRig::default()).with_save_target(SaveTarget {
        dir: dir.join("data"),
        experiment: "session".to_string(),
        note: String::new(),
    });
    ctrl.configure(SweepConfig {
        repeats: 2,
        ..sweep_config(0.0, 1.0, 3)
    })
    .unwrap();

    let mut session = Session::new(ctrl, dir.join("plots"), "session");
    let report = session.run().unwrap();

    assert_eq!(report.measured, 6);
    assert!(report.saved.as_ref().unwrap().csv.exists());
    // One chart per pass and channel.
    assert_eq!(report.charts.len(), 2);
    assert!(report.charts.iter().all(|p| p.exists()));
    let names: Vec<String> = report
        .charts
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert!(names[0].starts_with("session_pass_1_Voltage_"));
    assert!(names[1].starts_with("session_pass_2_Voltage_"));

    let rig = session.controller().rig();
    assert!(rig.prepared);
    assert!(rig.shut_down);

    assert_eq!(report.summary.len(), 1);
    assert_eq!(report.summary[0].name, "Voltage");
    assert_eq!(report.summary[0].max, 3.0);
}

/// Saving in the middle of a run writes the data and the charts of the current pass.
#[rstest]
fn test_manual_save_exports_charts() {
    let dir = scratch_dir("session_manual_save");
    let mut ctrl = SweepController::new(FakeRig::default()).with_save_target(SaveTarget {
        dir: dir.join("data"),
        experiment: "manual".to_string(),
        note: String::new(),
    });
    ctrl.configure(SweepConfig {
        repeats: 2,
        ..sweep_config(0.0, 1.0, 3)
    })
    .unwrap();
    ctrl.start().unwrap();
    for _ in 0..2 {
        assert!(matches!(ctrl.step(), StepOutcome::Measured(_)));
    }

    let mut session = Session::new(ctrl, dir.join("plots"), "manual");
    let snapshot = session.save().unwrap();

    let saved = snapshot.saved.unwrap();
    assert!(saved.csv.exists());
    assert!(saved.txt.exists());
    assert_eq!(snapshot.charts.len(), 1);
    assert!(snapshot.charts[0].exists());
    let name = snapshot.charts[0].file_name().unwrap().to_string_lossy().into_owned();
    assert!(name.starts_with("manual_pass_1_Voltage_"));

    let mut loaded = Recorder::new(session.controller().recorder().layout().clone());
    assert_eq!(loaded.load(&saved.csv).unwrap().loaded, 2);
}

/// Without save target only the charts are written.
#[rstest]
fn test_manual_save_without_target() {
    let dir = scratch_dir("session_manual_no_target");
    let mut ctrl = SweepController::new(FakeRig::default());
    ctrl.configure(sweep_config(0.0, 1.0, 3)).unwrap();
    ctrl.start().unwrap();
    assert!(matches!(ctrl.step(), StepOutcome::Measured(_)));

    let mut session = Session::new(ctrl, &dir, "bare");
    let snapshot = session.save().unwrap();
    assert!(snapshot.saved.is_none());
    assert_eq!(snapshot.charts.len(), 1);
}

/// A failed run still has its instruments shut down.
#[rstest]
fn test_session_without_configuration() {
    let dir = scratch_dir("session_unconfigured");
    let ctrl = SweepController::new(FakeRig::default());
    let mut session = Session::new(ctrl, &dir, "empty");
    assert!(session.run().is_err());
    assert!(session.controller().rig().prepared);
    assert!(session.controller().rig().shut_down);
}

#[rstest]
fn test_summarize_skips_nan() {
    let reading = |mean| Reading { mean, std: 0.0 };
    let records = vec![
        Record {
            pass: 1,
            direction: Direction::Forward,
            setpoints: vec![0.0],
            readings: vec![reading(1.0), reading(f64::NAN)],
        },
        Record {
            pass: 1,
            direction: Direction::Forward,
            setpoints: vec![1.0],
            readings: vec![reading(3.0), reading(f64::NAN)],
        },
    ];
    let channels = vec!["X".to_string(), "Y".to_string()];
    assert_eq!(
        summarize(&records, &channels),
        vec![ChannelSummary {
            name: "X".to_string(),
            mean: 2.0,
            max: 3.0
        }]
    );
}
