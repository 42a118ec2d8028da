//! Tests for the Keysight B2900 driver.

use measurements::{Current, Voltage};
use rstest::*;

use scpi_endpoint::{EndpointError, LoopbackEndpoint};

use keysight_b2900::*;

type B2900Lbk = B2900<LoopbackEndpoint>;

/// Create a new B2900 instance with the given conversation.
fn crt_inst(host2inst: Vec<&str>, inst2host: Vec<&str>) -> B2900Lbk {
    let interface = LoopbackEndpoint::from_strs(&host2inst, &inst2host, "\n");
    B2900::try_new(interface).unwrap()
}

#[fixture]
fn emp_inst() -> B2900Lbk {
    crt_inst(vec![], vec![])
}

/// Empty initialization should always pass.
#[rstest]
fn test_initialization(_emp_inst: B2900Lbk) {}

#[rstest]
fn test_get_name() {
    let mut inst = crt_inst(vec!["*IDN?"], vec!["Keysight Technologies,B2901A,MY1234,3.4.2011"]);
    assert_eq!(
        inst.get_name().unwrap(),
        "Keysight Technologies,B2901A,MY1234,3.4.2011"
    );
}

#[rstest]
fn test_reset() {
    let mut inst = crt_inst(vec!["*RST"], vec![]);
    inst.reset().unwrap();
}

#[rstest]
fn test_beeper() {
    let mut inst = crt_inst(vec![":SYST:BEEP 200,1", ":SYST:BEEP:STAT OFF"], vec![]);
    inst.beep(200.0, 1.0).unwrap();
    inst.set_beeper(false).unwrap();
}

#[rstest]
#[case("0", true)]
#[case("1", false)]
fn test_self_test(#[case] resp: &str, #[case] passed: bool) {
    let mut inst = crt_inst(vec!["*TST?", "*CAL?"], vec![resp, resp]);
    assert_eq!(inst.self_test().unwrap(), passed);
    assert_eq!(inst.self_calibration().unwrap(), passed);
}

#[rstest]
fn test_error_queue() {
    let mut inst = crt_inst(
        vec![":SYST:ERR?", ":SYST:ERR:ALL?"],
        vec!["+0,\"No error\"", "+0,\"No error\""],
    );
    assert_eq!(inst.read_error().unwrap(), "+0,\"No error\"");
    assert_eq!(inst.clear_errors().unwrap(), "+0,\"No error\"");
}

#[rstest]
#[case(true, ":OUTP ON")]
#[case(false, ":OUTP OFF")]
fn test_set_output(#[case] state: bool, #[case] cmd: &str) {
    let mut inst = crt_inst(vec![cmd], vec![]);
    inst.set_output(state).unwrap();
}

/// Applying a source value switches the source mode first.
#[rstest]
fn test_apply_current_and_voltage() {
    let mut inst = crt_inst(
        vec![
            ":SOUR:FUNC:MODE CURR",
            ":SOUR:CURR 0.001",
            ":SOUR:FUNC:MODE VOLT",
            ":SOUR:VOLT -2.5",
        ],
        vec![],
    );
    inst.apply_current(Current::from_milliamperes(1.0)).unwrap();
    inst.apply_voltage(Voltage::from_volts(-2.5)).unwrap();
}

#[rstest]
fn test_compliance() {
    let mut inst = crt_inst(vec![":SENS:VOLT:PROT 10", ":SENS:CURR:PROT 0.1"], vec![]);
    inst.set_voltage_compliance(Voltage::from_volts(10.0)).unwrap();
    inst.set_current_compliance(Current::from_amperes(0.1)).unwrap();
}

#[rstest]
fn test_measure() {
    let mut inst = crt_inst(
        vec![":MEAS:VOLT?", ":MEAS:CURR?"],
        vec!["+1.234500E+00", "-5.000000E-06"],
    );
    assert_eq!(inst.measure_voltage().unwrap().as_volts(), 1.2345);
    assert_eq!(inst.measure_current().unwrap().as_amperes(), -5e-6);
}

/// A garbled measurement must not be turned into a number.
#[rstest]
fn test_measure_parse_error() {
    let mut inst = crt_inst(vec![":MEAS:VOLT?"], vec!["OVERFLOW"]);
    match inst.measure_voltage() {
        Err(EndpointError::ResponseParseError(resp)) => assert_eq!(resp, "OVERFLOW"),
        _ => panic!("Expected a response parse error"),
    }
}

#[rstest]
fn test_output_configuration() {
    let mut inst = crt_inst(
        vec![":SOUR:CURR:RANG 0.01", ":SENS:REM ON", ":OUTP:OFF:MODE HIZ", ":INIT"],
        vec![],
    );
    inst.configure_output_range(SourceMode::Current, 0.01).unwrap();
    inst.enable_4wire(true).unwrap();
    inst.set_output_off_mode(OutputOffMode::HighImpedance).unwrap();
    inst.init_output().unwrap();
}

#[rstest]
fn test_save_load_status() {
    let mut inst = crt_inst(
        vec![
            ":MMEM:STOR:STAT \"sweep.sta\"",
            "*OPC?",
            ":MMEM:LOAD:STAT \"sweep.sta\"",
        ],
        vec!["1"],
    );
    inst.save_status("sweep.sta").unwrap();
    inst.load_status("sweep.sta").unwrap();
}

#[rstest]
fn test_display() {
    assert_eq!(SourceMode::Current.to_string(), "Current");
    assert_eq!(OutputOffMode::Normal.to_string(), "Normal");
}

/// Clones share the endpoint.
#[rstest]
fn test_cloning() {
    let mut inst = crt_inst(vec!["*RST", ":OUTP OFF"], vec![]);
    let mut inst2 = inst.clone();
    inst.reset().unwrap();
    inst2.set_output(false).unwrap();
}
