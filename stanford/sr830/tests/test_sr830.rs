//! Tests for the SR830 lock-in driver.

use std::time::Duration;

use measurements::{Angle, Frequency, Voltage};
use rstest::*;

use scpi_endpoint::{EndpointError, LoopbackEndpoint};

use stanford_sr830::*;

type Sr830Lbk = Sr830<LoopbackEndpoint>;

/// Create a new SR830 instance with the given conversation.
fn crt_inst(host2inst: Vec<&str>, inst2host: Vec<&str>) -> Sr830Lbk {
    let interface = LoopbackEndpoint::from_strs(&host2inst, &inst2host, "\r");
    Sr830::try_new(interface).unwrap()
}

#[fixture]
fn emp_inst() -> Sr830Lbk {
    crt_inst(vec![], vec![])
}

/// Empty initialization should always pass.
#[rstest]
fn test_initialization(_emp_inst: Sr830Lbk) {}

#[rstest]
fn test_name_reset_interface() {
    let mut inst = crt_inst(
        vec!["OUTX 0", "*IDN?", "*RST"],
        vec!["Stanford_Research_Systems,SR830,s/n12345,ver1.07"],
    );
    inst.set_output_interface(OutputInterface::Rs232).unwrap();
    assert_eq!(
        inst.get_name().unwrap(),
        "Stanford_Research_Systems,SR830,s/n12345,ver1.07"
    );
    inst.reset().unwrap();
}

#[rstest]
fn test_reference_oscillator() {
    let mut inst = crt_inst(
        vec!["SLVL 0.5", "SLVL?", "FREQ 137", "FREQ?", "PHAS 0", "PHAS?"],
        vec!["0.500", "137.00", "-12.5"],
    );
    inst.set_amplitude(Voltage::from_volts(0.5)).unwrap();
    assert_eq!(inst.get_amplitude().unwrap().as_volts(), 0.5);
    inst.set_frequency(Frequency::from_hertz(137.0)).unwrap();
    assert_eq!(inst.get_frequency().unwrap().as_hertz(), 137.0);
    inst.set_phase(Angle::from_degrees(0.0)).unwrap();
    assert!((inst.get_phase().unwrap().as_degrees() + 12.5).abs() < 1e-9);
}

#[rstest]
#[case(0.001)]
#[case(5.1)]
fn test_amplitude_out_of_range(mut emp_inst: Sr830Lbk, #[case] volts: f64) {
    match emp_inst.set_amplitude(Voltage::from_volts(volts)) {
        Err(EndpointError::FloatValueOutOfRange { value, .. }) => assert_eq!(value, volts),
        _ => panic!("Expected FloatValueOutOfRange error"),
    }
}

#[rstest]
fn test_frequency_out_of_range(mut emp_inst: Sr830Lbk) {
    assert!(emp_inst.set_frequency(Frequency::from_hertz(200_000.0)).is_err());
}

#[rstest]
#[case(2e-9, "SENS 0")]
#[case(1e-3, "SENS 17")]
#[case(1.0, "SENS 26")]
fn test_set_sensitivity(#[case] volts: f64, #[case] cmd: &str) {
    let mut inst = crt_inst(vec![cmd], vec![]);
    inst.set_sensitivity(Voltage::from_volts(volts)).unwrap();
}

#[rstest]
fn test_sensitivity_not_in_table(mut emp_inst: Sr830Lbk) {
    match emp_inst.set_sensitivity(Voltage::from_volts(3e-3)) {
        Err(EndpointError::InvalidArgument(_)) => {}
        _ => panic!("Expected InvalidArgument error"),
    }
}

#[rstest]
fn test_get_sensitivity() {
    let mut inst = crt_inst(vec!["SENS?", "SENS?"], vec!["22", "27"]);
    assert_eq!(inst.get_sensitivity().unwrap().as_volts(), 50e-3);
    assert!(inst.get_sensitivity().is_err());
}

#[rstest]
#[case(Duration::from_micros(10), "OFLT 0")]
#[case(Duration::from_millis(300), "OFLT 9")]
#[case(Duration::from_secs(30_000), "OFLT 19")]
fn test_set_time_constant(#[case] tc: Duration, #[case] cmd: &str) {
    let mut inst = crt_inst(vec![cmd], vec![]);
    inst.set_time_constant(tc).unwrap();
}

#[rstest]
fn test_get_time_constant() {
    let mut inst = crt_inst(vec!["OFLT?"], vec!["10"]);
    assert_eq!(inst.get_time_constant().unwrap(), Duration::from_secs(1));
}

#[rstest]
fn test_reference_and_input() {
    let mut inst = crt_inst(
        vec![
            "FMOD 0", "FMOD?", "ISRC 1", "ISRC?", "ICPL 1", "ICPL?", "RSLP 2", "RSLP?",
        ],
        vec!["0", "1", "1", "2"],
    );
    inst.set_reference_source(ReferenceSource::External).unwrap();
    assert_eq!(inst.get_reference_source().unwrap(), ReferenceSource::External);
    inst.set_input_config(InputConfig::AMinusB).unwrap();
    assert_eq!(inst.get_input_config().unwrap(), InputConfig::AMinusB);
    inst.set_input_coupling(InputCoupling::Dc).unwrap();
    assert_eq!(inst.get_input_coupling().unwrap(), InputCoupling::Dc);
    inst.set_trigger_slope(TriggerSlope::TtlFalling).unwrap();
    assert_eq!(inst.get_trigger_slope().unwrap(), TriggerSlope::TtlFalling);
}

#[rstest]
fn test_harmonic() {
    let mut inst = crt_inst(vec!["HARM 2", "HARM?"], vec!["2"]);
    inst.set_harmonic(2).unwrap();
    assert_eq!(inst.get_harmonic().unwrap(), 2);
}

#[rstest]
#[case(0)]
#[case(20000)]
fn test_harmonic_out_of_range(mut emp_inst: Sr830Lbk, #[case] harmonic: u32) {
    match emp_inst.set_harmonic(harmonic) {
        Err(EndpointError::IntValueOutOfRange { min, max, .. }) => {
            assert_eq!(min, 1);
            assert_eq!(max, 19999);
        }
        _ => panic!("Expected IntValueOutOfRange error"),
    }
}

#[rstest]
fn test_outputs() {
    let mut inst = crt_inst(
        vec!["OUTP? 1", "OUTP? 2", "OUTP? 3", "OUTP? 4"],
        vec!["1.5e-3", "-2.0e-4", "1.51e-3", "0"],
    );
    assert_eq!(inst.get_x().unwrap().as_volts(), 1.5e-3);
    assert_eq!(inst.get_y().unwrap().as_volts(), -2.0e-4);
    assert_eq!(inst.get_r().unwrap().as_volts(), 1.51e-3);
    assert_eq!(inst.get_theta().unwrap().as_degrees(), 0.0);
}

#[rstest]
fn test_snap() {
    let mut inst = crt_inst(
        vec!["SNAP? 1,2", "SNAP? 3,4,9"],
        vec!["1.25e-6,-3.5e-7", "1.3e-6,-15.6,137.0"],
    );
    assert_eq!(
        inst.snap(&[SnapParameter::X, SnapParameter::Y]).unwrap(),
        vec![1.25e-6, -3.5e-7]
    );
    assert_eq!(
        inst.snap(&[SnapParameter::R, SnapParameter::Theta, SnapParameter::Frequency])
            .unwrap(),
        vec![1.3e-6, -15.6, 137.0]
    );
}

#[rstest]
fn test_snap_invalid_count(mut emp_inst: Sr830Lbk) {
    assert!(emp_inst.snap(&[SnapParameter::X]).is_err());
    assert!(emp_inst.snap(&[SnapParameter::X; 7]).is_err());
}

/// A response with the wrong number of values is a parse error.
#[rstest]
fn test_snap_short_response() {
    let mut inst = crt_inst(vec!["SNAP? 1,2"], vec!["1.0e-6"]);
    match inst.snap(&[SnapParameter::X, SnapParameter::Y]) {
        Err(EndpointError::ResponseParseError(resp)) => assert_eq!(resp, "1.0e-6"),
        _ => panic!("Expected ResponseParseError"),
    }
}

#[rstest]
fn test_auto_functions() {
    let mut inst = crt_inst(vec!["APHS", "AGAN", "ARSV"], vec![]);
    inst.auto_phase().unwrap();
    inst.auto_gain().unwrap();
    inst.auto_reserve().unwrap();
}

#[rstest]
fn test_get_all() {
    let mut inst = crt_inst(
        vec![
            "OUTP? 1", "OUTP? 2", "OUTP? 3", "OUTP? 4", "SLVL?", "FREQ?", "SENS?", "OFLT?",
            "ISRC?", "ICPL?", "FMOD?", "HARM?", "RSLP?",
        ],
        vec![
            "1e-3", "0", "1e-3", "0", "0.004", "1000", "17", "8", "0", "0", "1", "1", "0",
        ],
    );
    let status = inst.get_all().unwrap();
    assert_eq!(status.x.as_volts(), 1e-3);
    assert_eq!(status.amplitude.as_volts(), 0.004);
    assert_eq!(status.frequency.as_hertz(), 1000.0);
    assert_eq!(status.sensitivity.as_volts(), 1e-3);
    assert_eq!(status.time_constant, Duration::from_secs_f64(0.1));
    assert_eq!(status.input_config, InputConfig::A);
    assert_eq!(status.input_coupling, InputCoupling::Ac);
    assert_eq!(status.reference_source, ReferenceSource::Internal);
    assert_eq!(status.harmonic, 1);
    assert_eq!(status.trigger_slope, TriggerSlope::Sine);
}

#[rstest]
fn test_display() {
    assert_eq!(InputConfig::Current100M.to_string(), "I 100M");
    assert_eq!(TriggerSlope::TtlRising.to_string(), "TTL rising");
}
