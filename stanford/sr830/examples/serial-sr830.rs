use std::time::Duration;

use measurements::{Frequency, Voltage};

use scpi_endpoint::SerialEndpoint;
use stanford_sr830::{OutputInterface, SnapParameter, Sr830};

fn main() {
    let port = "/dev/ttyUSB1";
    let interface = SerialEndpoint::simple(port, 9600).expect("Failed to open serial port");
    let mut lockin = Sr830::try_new(interface).unwrap();
    lockin.set_output_interface(OutputInterface::Rs232).unwrap();
    println!("Instrument ID: {}", lockin.get_name().unwrap());

    lockin.set_frequency(Frequency::from_hertz(137.0)).unwrap();
    lockin.set_amplitude(Voltage::from_volts(0.5)).unwrap();
    lockin.set_time_constant(Duration::from_millis(300)).unwrap();
    lockin.auto_gain().unwrap();

    let xy = lockin.snap(&[SnapParameter::X, SnapParameter::Y]).unwrap();
    println!("X = {} V, Y = {} V", xy[0], xy[1]);

    println!("{:#?}", lockin.get_all().unwrap());
}
