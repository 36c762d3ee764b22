//! rtdprobe - Read MAX31865 RTD sensors over bit-banged GPIO SPI
//!
//! The binary opens a GPIO backend, claims the four SPI lines, initializes
//! the converter and runs one command. Whatever the command returns, the
//! pins are reset before the process exits so another program can use the
//! same bus.

mod backends;
mod cli;
mod commands;

use clap::Parser;
use cli::{Cli, Commands, SensorArgs};
use commands::Sensor;
use rtdprobe_core::device::Max31865;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    // Set log level based on verbosity
    match cli.verbose {
        0 => {} // default (info)
        1 => log::set_max_level(log::LevelFilter::Debug),
        _ => log::set_max_level(log::LevelFilter::Trace),
    }

    match cli.command {
        Commands::Read { sensor, fahrenheit } => {
            with_sensor(&sensor, |dev| commands::run_read(dev, fahrenheit))
        }
        Commands::Watch {
            sensor,
            interval_ms,
            count,
        } => with_sensor(&sensor, |dev| commands::run_watch(dev, interval_ms, count)),
        Commands::Fault {
            sensor,
            cycle,
            clear,
        } => with_sensor(&sensor, |dev| commands::run_fault(dev, cycle, clear)),
        Commands::ListBackends => {
            commands::list_backends();
            Ok(())
        }
    }
}

/// Open the sensor, run `f` on it and reset the pins afterwards
///
/// The reset runs even when `f` fails; the command's error wins over a
/// reset error.
fn with_sensor<F>(args: &SensorArgs, f: F) -> Result<(), Box<dyn std::error::Error>>
where
    F: FnOnce(&mut Sensor) -> Result<(), Box<dyn std::error::Error>>,
{
    let config = args.rtd_config();
    let (adapter, pins) = backends::open_backend(&args.backend)?;

    let mut sensor = Max31865::open(adapter, pins, config)
        .map_err(|e| format!("Failed to initialize MAX31865: {}", e))?;

    let result = f(&mut sensor);

    log::info!("Resetting MAX31865 pins...");
    let reset = sensor.reset().map(drop);

    result?;
    reset.map_err(|e| format!("Failed to reset pins: {}", e).into())
}
