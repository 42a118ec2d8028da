use measurements::{Current, Voltage};

use keysight_b2900::{B2900, SourceMode};
use scpi_endpoint::TcpIpEndpoint;

fn main() {
    // Keysight instruments listen for raw SCPI on port 5025.
    let interface = TcpIpEndpoint::simple("192.168.1.20:5025").expect("Failed to connect");
    let mut smu = B2900::try_new(interface).unwrap();
    println!("Instrument ID: {}", smu.get_name().unwrap());

    smu.reset().unwrap();
    smu.set_source_mode(SourceMode::Current).unwrap();
    smu.set_voltage_compliance(Voltage::from_volts(10.0)).unwrap();
    smu.apply_current(Current::from_microamperes(1.0)).unwrap();
    smu.set_output(true).unwrap();

    println!("Voltage: {}", smu.measure_voltage().unwrap());

    smu.apply_current(Current::from_amperes(0.0)).unwrap();
    smu.set_output(false).unwrap();
}
