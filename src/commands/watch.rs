//! Watch command implementation

use super::Sensor;
use std::thread;
use std::time::{Duration, Instant};

/// Print a reading every `interval_ms` until `count` readings are done
///
/// Without a count this runs until the process is killed.
pub fn run_watch(
    sensor: &mut Sensor,
    interval_ms: u64,
    count: Option<u64>,
) -> Result<(), Box<dyn std::error::Error>> {
    let interval = Duration::from_millis(interval_ms);
    let start = Instant::now();
    let mut taken = 0u64;

    println!("{:>10} {:>8} {:>12} {:>10}", "time [s]", "raw", "ohms", "°C");

    while count.map_or(true, |n| taken < n) {
        let next = Instant::now() + interval;

        let reading = sensor.temperature_reading();
        println!(
            "{:>10.3} {:>8} {:>12.3} {:>10.2}",
            start.elapsed().as_secs_f64(),
            reading.raw,
            reading.resistance,
            reading.celsius
        );

        let fault = sensor.fault_report();
        if !fault.is_clear() {
            log::warn!("Fault status 0x{:02X}", fault.bits());
        }

        taken += 1;
        if count.map_or(true, |n| taken < n) {
            // The conversion itself takes ~75 ms of the interval
            thread::sleep(next.saturating_duration_since(Instant::now()));
        }
    }

    log::debug!("watch: {} readings", taken);
    Ok(())
}
