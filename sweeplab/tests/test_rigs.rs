//! Tests for the instrument rigs, using loopback endpoints instead of instruments.

mod common;

use std::time::Duration;

use keysight_b2900::B2900;
use kikusui_pbz::Pbz;
use measurements::{Frequency, Voltage};
use rstest::*;
use scpi_endpoint::LoopbackEndpoint;
use stanford_sr830::Sr830;

use sweeplab::{
    HysteresisRig, LockinRig, LockinSettings, Rig, StepOutcome, SweepConfig, SweepController,
    SweepError,
};

use common::sweep_config;

type HysteresisLbk = HysteresisRig<LoopbackEndpoint, LoopbackEndpoint>;
type LockinLbk = LockinRig<LoopbackEndpoint, LoopbackEndpoint>;

fn pbz(host2inst: Vec<&str>, inst2host: Vec<&str>) -> Pbz<LoopbackEndpoint> {
    Pbz::try_new(LoopbackEndpoint::from_strs(&host2inst, &inst2host, "\n")).unwrap()
}

fn smu(host2inst: Vec<&str>, inst2host: Vec<&str>) -> B2900<LoopbackEndpoint> {
    B2900::try_new(LoopbackEndpoint::from_strs(&host2inst, &inst2host, "\n")).unwrap()
}

fn sr830(host2inst: Vec<&str>, inst2host: Vec<&str>) -> Sr830<LoopbackEndpoint> {
    Sr830::try_new(LoopbackEndpoint::from_strs(&host2inst, &inst2host, "\r")).unwrap()
}

fn hysteresis(pbz: Pbz<LoopbackEndpoint>, smu: B2900<LoopbackEndpoint>) -> HysteresisLbk {
    HysteresisRig::new(pbz, smu, vec![1e-3], Voltage::from_volts(10.0))
        .with_reset_settle(Duration::ZERO)
}

#[rstest]
fn test_hysteresis_prepare() {
    let pbz = pbz(
        vec!["*IDN?", "*RST", "FUNC:MODE CC", "CURR 0", "OUTP ON"],
        vec!["KIKUSUI,PBZ20-20,AB123456,1.00"],
    );
    let smu = smu(
        vec![
            "*IDN?",
            "*RST",
            ":SOUR:FUNC:MODE CURR",
            ":SOUR:CURR 0",
            ":SENS:VOLT:PROT 10",
            ":OUTP ON",
        ],
        vec!["Keysight Technologies,B2901A,MY12345678,4.0"],
    );
    let mut rig = hysteresis(pbz, smu);
    rig.prepare().unwrap();
}

#[rstest]
fn test_hysteresis_shutdown() {
    let pbz = pbz(vec!["CURR 0", "OUTP OFF"], vec![]);
    let smu = smu(
        vec![":SOUR:FUNC:MODE CURR", ":SOUR:CURR 0", ":OUTP OFF"],
        vec![],
    );
    let mut rig = hysteresis(pbz, smu);
    rig.shutdown().unwrap();
}

/// Three field currents, one bias current, two voltage readings per point.
#[rstest]
fn test_hysteresis_sweep() {
    let pbz = pbz(vec!["CURR 0", "CURR 5", "CURR 10"], vec![]);
    let mut host2inst = Vec::new();
    for _ in 0..3 {
        host2inst.extend([
            ":SOUR:FUNC:MODE CURR",
            ":SOUR:CURR 0.001",
            ":MEAS:VOLT?",
            ":MEAS:VOLT?",
        ]);
    }
    let smu = smu(
        host2inst,
        vec!["+1.0E-3", "+3.0E-3", "2e-3", "2e-3", "-1E-3", "-2E-3"],
    );

    let mut ctrl = SweepController::new(hysteresis(pbz, smu));
    let config = SweepConfig {
        samples: 2,
        ..sweep_config(0.0, 10.0, 3)
    };
    ctrl.configure(config).unwrap();
    ctrl.start().unwrap();
    while ctrl.step() != StepOutcome::Done {}

    let records = ctrl.recorder().records();
    assert_eq!(records.len(), 3);
    assert_eq!(records[2].setpoints, vec![10.0, 1e-3]);
    assert!((records[0].readings[0].mean - 2e-3).abs() < 1e-15);
    assert_eq!(records[1].readings[0].std, 0.0);
    assert!((records[2].readings[0].mean + 1.5e-3).abs() < 1e-15);
    assert_eq!(
        ctrl.recorder().layout().header(),
        vec![
            "Pass",
            "Direction",
            "PBZ_Current",
            "Keysight_Current",
            "B2900_Voltage",
            "B2900_Voltage_std"
        ]
    );
}

#[rstest]
#[case(vec![1e-3, 2e-3], 0, 1e-3)]
#[case(vec![1e-3, 2e-3], 1, 2e-3)]
#[case(vec![1e-3, 2e-3], 4, 1e-3)]
#[case(vec![5e-4], 7, 5e-4)]
fn test_bias_current_cycles(#[case] currents: Vec<f64>, #[case] point: usize, #[case] exp: f64) {
    let rig = HysteresisRig::new(
        pbz(vec![], vec![]),
        smu(vec![], vec![]),
        currents,
        Voltage::from_volts(10.0),
    );
    assert_eq!(rig.setpoints(point, 0.25), vec![0.25, exp]);
}

#[rstest]
#[case(vec![])]
#[case(vec![1e-3, f64::NAN])]
fn test_invalid_bias_currents(#[case] currents: Vec<f64>) {
    let rig = HysteresisRig::new(
        pbz(vec![], vec![]),
        smu(vec![], vec![]),
        currents,
        Voltage::from_volts(10.0),
    );
    let mut ctrl = SweepController::new(rig);
    assert!(matches!(
        ctrl.configure(sweep_config(0.0, 1.0, 3)),
        Err(SweepError::InvalidConfiguration(_))
    ));
}

#[fixture]
fn lockin_settings() -> LockinSettings {
    LockinSettings {
        frequency: Some(Frequency::from_hertz(1000.0)),
        amplitude: Some(Voltage::from_volts(0.5)),
        time_constant: Some(Duration::from_millis(100)),
        sensitivity: Some(Voltage::from_volts(1e-3)),
    }
}

fn lockin(
    pbz: Pbz<LoopbackEndpoint>,
    sr830: Sr830<LoopbackEndpoint>,
    settings: LockinSettings,
) -> LockinLbk {
    LockinRig::new(pbz, sr830, settings).with_reset_settle(Duration::ZERO)
}

#[rstest]
fn test_lockin_prepare(lockin_settings: LockinSettings) {
    let pbz = pbz(
        vec!["*IDN?", "*RST", "FUNC:MODE CC", "CURR 0", "OUTP ON"],
        vec!["KIKUSUI,PBZ20-20,AB123456,1.00"],
    );
    let sr830 = sr830(
        vec!["OUTX 0", "*IDN?", "FREQ 1000", "SLVL 0.5", "OFLT 8", "SENS 17"],
        vec!["Stanford_Research_Systems,SR830,s/n12345,ver1.07"],
    );
    let mut rig = lockin(pbz, sr830, lockin_settings);
    rig.prepare().unwrap();
}

/// Unset lock-in settings are not sent.
#[rstest]
fn test_lockin_prepare_keeps_settings() {
    let pbz = pbz(
        vec!["*IDN?", "*RST", "FUNC:MODE CC", "CURR 0", "OUTP ON"],
        vec!["KIKUSUI,PBZ20-20,AB123456,1.00"],
    );
    let sr830 = sr830(
        vec!["OUTX 0", "*IDN?"],
        vec!["Stanford_Research_Systems,SR830,s/n12345,ver1.07"],
    );
    let mut rig = lockin(pbz, sr830, LockinSettings::default());
    rig.prepare().unwrap();
}

#[rstest]
fn test_lockin_point() {
    let pbz = pbz(vec!["CURR 0.5"], vec![]);
    let sr830 = sr830(vec!["SNAP? 1,2"], vec!["1.5e-6,-2.0e-7"]);
    let mut rig = lockin(pbz, sr830, LockinSettings::default());

    assert_eq!(rig.channel_names(), vec!["X", "Y"]);
    let setpoints = rig.setpoints(3, 0.5);
    assert_eq!(setpoints, vec![0.5]);
    rig.apply(&setpoints).unwrap();
    assert_eq!(rig.sample().unwrap(), vec![1.5e-6, -2.0e-7]);
}

#[rstest]
fn test_lockin_apply_wrong_setpoints() {
    let mut rig = lockin(
        pbz(vec![], vec![]),
        sr830(vec![], vec![]),
        LockinSettings::default(),
    );
    assert!(rig.apply(&[0.1, 0.2]).is_err());
}

#[rstest]
fn test_lockin_shutdown() {
    let pbz = pbz(vec!["CURR 0", "OUTP OFF"], vec![]);
    let mut rig = lockin(pbz, sr830(vec![], vec![]), LockinSettings::default());
    rig.shutdown().unwrap();
}
