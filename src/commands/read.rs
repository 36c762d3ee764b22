//! Read command implementation

use super::Sensor;
use rtdprobe_core::conversion::celsius_to_fahrenheit;
use rtdprobe_core::device::Reading;

/// Take one reading and print it
pub fn run_read(sensor: &mut Sensor, fahrenheit: bool) -> Result<(), Box<dyn std::error::Error>> {
    let reading = sensor.temperature_reading();
    print_reading(&reading, fahrenheit);

    let fault = sensor.fault_report();
    if !fault.is_clear() {
        log::warn!("Fault status 0x{:02X} latched during conversion", fault.bits());
    }
    Ok(())
}

/// Print one reading in the long form
pub fn print_reading(reading: &Reading, fahrenheit: bool) {
    println!("Raw:         0x{:04X} ({})", reading.raw, reading.raw);
    println!("Resistance:  {:.3} Ω", reading.resistance);
    println!("Temperature: {:.2} °C", reading.celsius);
    if fahrenheit {
        println!("             {:.2} °F", celsius_to_fahrenheit(reading.celsius));
    }
}
