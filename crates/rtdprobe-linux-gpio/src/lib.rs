//! rtdprobe-linux-gpio - Linux GPIO backend for rtdprobe
//!
//! This crate implements [`rtdprobe_core::gpio::GpioAdapter`] on top of the
//! Linux GPIO character device interface (gpiocdev), so a MAX31865 wired
//! to any four free GPIO lines can be read without a hardware SPI
//! controller.
//!
//! # Example
//!
//! ```no_run
//! use rtdprobe_core::device::{Max31865, RtdConfig};
//! use rtdprobe_linux_gpio::{LinuxGpio, LinuxGpioConfig};
//!
//! let config = LinuxGpioConfig::new("/dev/gpiochip0", 8, 11, 10, 9);
//! //                                 device          CS SCK MOSI MISO
//!
//! let gpio = LinuxGpio::open(&config)?;
//! let mut sensor = Max31865::open(gpio, config.pins(), RtdConfig::pt100())?;
//! println!("{:.2} C", sensor.temperature());
//! sensor.reset()?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # Usage with the rtdprobe CLI
//!
//! ```bash
//! rtdprobe read -b linux_gpio:dev=/dev/gpiochip0,cs=8,sck=11,mosi=10,miso=9
//! rtdprobe watch -b linux_gpio:gpiochip=0,cs=8,sck=11,mosi=10,miso=9 --sensor pt1000
//! ```
//!
//! # Wiring
//!
//! | MAX31865 | GPIO Function | Description |
//! |----------|---------------|-------------|
//! | CS       | CS (output)   | Chip select, active low |
//! | CLK      | SCK (output)  | Serial clock |
//! | SDI      | MOSI (output) | Data into the chip |
//! | SDO      | MISO (input)  | Data out of the chip |
//! | VIN      | 3.3V          | Power supply |
//! | GND      | GND           | Ground |
//!
//! # System Requirements
//!
//! - Linux kernel 4.8+ with GPIO character device support (kernel 5.5+ for v2 API)
//! - Access to `/dev/gpiochipN` devices (may require root or udev rules)

pub mod device;
pub mod error;

// Re-exports
pub use device::{parse_options, LinuxGpio, LinuxGpioConfig, CONSUMER};
pub use error::{LinuxGpioError, Result};

use rtdprobe_core::gpio::{GpioAdapter, SpiPins};

/// Open the Linux GPIO backend and return it boxed with its pin set
///
/// This is a convenience function for use in the CLI backend dispatch.
///
/// # Options
///
/// - `dev=/dev/gpiochip0` - GPIO chip device path (or use gpiochip=N)
/// - `gpiochip=0` - GPIO chip number (alternative to dev)
/// - `cs=8`, `sck=11`, `mosi=10`, `miso=9` - line offsets (all required)
pub fn open_linux_gpio(
    options: &[(&str, &str)],
) -> std::result::Result<(Box<dyn GpioAdapter>, SpiPins), Box<dyn std::error::Error>> {
    let config = parse_options(options)?;
    let gpio = LinuxGpio::open(&config)?;
    Ok((Box::new(gpio), config.pins()))
}
