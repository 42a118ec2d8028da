use std::{thread, time::Duration};

use measurements::Current;

use kikusui_pbz::{OperationMode, Pbz, SerialInterfacePbz};

fn main() {
    let port = "/dev/ttyUSB0";

    // Get the serial endpoint with the PBZ's default RS-232C settings.
    let serial_inst = SerialInterfacePbz::simple(port).expect("Failed to open serial port");
    let mut pbz = Pbz::try_new(serial_inst).unwrap();
    println!("Instrument ID: {}", pbz.get_name().unwrap());

    pbz.reset().unwrap();
    pbz.set_mode(OperationMode::ConstantCurrent).unwrap();
    pbz.set_current(Current::from_amperes(0.0)).unwrap();
    pbz.set_output(true).unwrap();

    // Step the current from -1 A to 1 A and read back the output voltage.
    for step in -4..=4 {
        pbz.set_current(Current::from_amperes(step as f64 * 0.25)).unwrap();
        thread::sleep(Duration::from_millis(500));
        println!("{:?}", pbz.measure_voltage());
    }

    pbz.set_current(Current::from_amperes(0.0)).unwrap();
    pbz.set_output(false).unwrap();
}
