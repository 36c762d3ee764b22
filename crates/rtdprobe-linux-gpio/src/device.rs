//! Linux GPIO character device adapter
//!
//! This module provides [`LinuxGpio`], a [`GpioAdapter`] over four lines of
//! one `/dev/gpiochipN`. The lines are requested once, when the adapter is
//! opened, and stay requested until it is dropped. Direction changes are
//! done by reconfiguring the existing request.
//!
//! Linux exposes no pin-mux control through the character device, so
//! [`PinMode::Alternate`] is mapped to a plain input: the line stops being
//! driven and floats back to whatever the board pulls it to.

use std::time::Duration;

use crate::error::{LinuxGpioError, Result};

use gpiocdev::line::{Offset, Value};
use gpiocdev::request::{Config, Request};

use rtdprobe_core::error::{Error as CoreError, Result as CoreResult};
use rtdprobe_core::gpio::{GpioAdapter, Level, Pin, PinMode, SpiPins};

/// Consumer label shown by `gpioinfo` for the requested lines
pub const CONSUMER: &str = "rtdprobe";

/// Line slots, in [`SpiPins::all`] order
#[derive(Debug, Clone, Copy)]
enum Line {
    Cs = 0,
    Sck = 1,
    Mosi = 2,
    Miso = 3,
}

const LINES: usize = 4;

/// Configuration for opening the Linux GPIO backend
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinuxGpioConfig {
    /// Device path (e.g., "/dev/gpiochip0")
    pub device: String,
    /// CS (Chip Select) line offset
    pub cs: Offset,
    /// SCK (Clock) line offset
    pub sck: Offset,
    /// MOSI (SDI on the chip) line offset
    pub mosi: Offset,
    /// MISO (SDO on the chip) line offset
    pub miso: Offset,
}

impl LinuxGpioConfig {
    /// Create a new configuration with the given device path and pins
    pub fn new(
        device: impl Into<String>,
        cs: Offset,
        sck: Offset,
        mosi: Offset,
        miso: Offset,
    ) -> Self {
        Self {
            device: device.into(),
            cs,
            sck,
            mosi,
            miso,
        }
    }

    /// Pin identifiers for the driver
    pub fn pins(&self) -> SpiPins {
        SpiPins::new(Pin(self.cs), Pin(self.sck), Pin(self.mosi), Pin(self.miso))
    }
}

/// Four GPIO lines of a Linux GPIO chip
pub struct LinuxGpio {
    /// GPIO line request handle
    request: Request,
    /// Line offsets indexed by [`Line`]
    offsets: [Offset; LINES],
    /// Current direction of each line
    modes: [PinMode; LINES],
    /// Last value written to each line, restored on reconfiguration
    levels: [Level; LINES],
}

impl LinuxGpio {
    /// Request the four lines described by `config`
    ///
    /// Initial state: CS=1 (inactive), SCK=0, MOSI=0, MISO=input.
    pub fn open(config: &LinuxGpioConfig) -> Result<Self> {
        if config.device.is_empty() {
            return Err(LinuxGpioError::NoDevice);
        }

        let offsets = [config.cs, config.sck, config.mosi, config.miso];
        let modes = [
            PinMode::Output,
            PinMode::Output,
            PinMode::Output,
            PinMode::Input,
        ];
        let levels = [Level::High, Level::Low, Level::Low, Level::Low];

        log::debug!("linux_gpio: Opening device {}", config.device);

        let request = Request::from_config(line_config(&offsets, &modes, &levels))
            .on_chip(&config.device)
            .with_consumer(CONSUMER)
            .request()
            .map_err(|source| LinuxGpioError::LineRequestFailed {
                path: config.device.clone(),
                source,
            })?;

        log::info!(
            "linux_gpio: Opened {} (cs={}, sck={}, mosi={}, miso={})",
            config.device,
            config.cs,
            config.sck,
            config.mosi,
            config.miso
        );

        Ok(Self {
            request,
            offsets,
            modes,
            levels,
        })
    }

    /// Pin identifiers of the requested lines
    pub fn pins(&self) -> SpiPins {
        SpiPins::new(
            Pin(self.offsets[Line::Cs as usize]),
            Pin(self.offsets[Line::Sck as usize]),
            Pin(self.offsets[Line::Mosi as usize]),
            Pin(self.offsets[Line::Miso as usize]),
        )
    }

    fn slot(&self, pin: Pin) -> Option<usize> {
        self.offsets.iter().position(|o| *o == pin.0)
    }

    fn reconfigure(&mut self, idx: usize, mode: PinMode) -> Result<()> {
        let mut modes = self.modes;
        modes[idx] = mode;
        self.request
            .reconfigure(&line_config(&self.offsets, &modes, &self.levels))
            .map_err(|source| LinuxGpioError::ReconfigureFailed {
                line: self.offsets[idx],
                source,
            })?;
        self.modes = modes;
        Ok(())
    }
}

/// Full line configuration for the request
fn line_config(offsets: &[Offset; LINES], modes: &[PinMode; LINES], levels: &[Level; LINES]) -> Config {
    let mut cfg = Config::default();
    for i in 0..LINES {
        match modes[i] {
            PinMode::Output => {
                cfg.with_line(offsets[i]).as_output(to_value(levels[i]));
            }
            // No pin-mux through the character device: release the line
            PinMode::Input | PinMode::Alternate => {
                cfg.with_line(offsets[i]).as_input();
            }
        }
    }
    cfg
}

fn to_value(level: Level) -> Value {
    match level {
        Level::High => Value::Active,
        Level::Low => Value::Inactive,
    }
}

impl GpioAdapter for LinuxGpio {
    fn set_pin_mode(&mut self, pin: Pin, mode: PinMode) -> CoreResult<()> {
        let idx = self.slot(pin).ok_or_else(|| {
            log::error!("linux_gpio: line {} was not requested", pin);
            CoreError::PinConfig { pin: pin.0 }
        })?;

        if self.modes[idx] == mode {
            return Ok(());
        }

        self.reconfigure(idx, mode).map_err(|e| {
            log::error!("linux_gpio: {}", e);
            CoreError::PinConfig { pin: pin.0 }
        })?;

        log::trace!("linux_gpio: line {} -> {:?}", pin, mode);
        Ok(())
    }

    fn write_digital(&mut self, pin: Pin, level: Level) {
        let Some(idx) = self.slot(pin) else {
            log::error!("linux_gpio: write to line {} which was not requested", pin);
            return;
        };

        self.levels[idx] = level;
        if self.modes[idx] != PinMode::Output {
            // Remembered for the next switch to output
            log::debug!("linux_gpio: line {} is not an output, level kept for later", pin);
            return;
        }

        if let Err(e) = self.request.set_value(self.offsets[idx], to_value(level)) {
            log::error!("Failed to set line {}: {}", pin, e);
        }
    }

    fn read_digital(&self, pin: Pin) -> Level {
        match self.request.value(pin.0) {
            Ok(Value::Active) => Level::High,
            Ok(Value::Inactive) => Level::Low,
            Err(e) => {
                log::error!("Failed to get line {}: {}", pin, e);
                Level::Low
            }
        }
    }

    fn delay_ms(&mut self, ms: u32) {
        std::thread::sleep(Duration::from_millis(u64::from(ms)));
    }
}

fn parse_line(name: &'static str, value: &str) -> Result<Offset> {
    value
        .parse()
        .map_err(|_| LinuxGpioError::InvalidLineNumber {
            name,
            value: value.to_string(),
        })
}

/// Parse backend options from a list of key-value pairs
///
/// # Supported Options
///
/// - `dev=/dev/gpiochipN` - GPIO chip device path (required, or use gpiochip)
/// - `gpiochip=N` - GPIO chip number (alternative to dev)
/// - `cs=N` - CS (chip select) line offset (required)
/// - `sck=N` - SCK (clock) line offset (required)
/// - `mosi=N` - MOSI line offset (required)
/// - `miso=N` - MISO line offset (required)
pub fn parse_options(options: &[(&str, &str)]) -> Result<LinuxGpioConfig> {
    let mut config = LinuxGpioConfig::default();
    let mut cs = None;
    let mut sck = None;
    let mut mosi = None;
    let mut miso = None;
    let mut gpiochip: Option<u32> = None;

    for (key, value) in options {
        match *key {
            "dev" => {
                config.device = value.to_string();
            }
            "gpiochip" => {
                gpiochip = Some(value.parse().map_err(|_| {
                    LinuxGpioError::InvalidParameter(format!("gpiochip={}", value))
                })?);
            }
            "cs" => cs = Some(parse_line("cs", value)?),
            "sck" => sck = Some(parse_line("sck", value)?),
            "mosi" => mosi = Some(parse_line("mosi", value)?),
            "miso" => miso = Some(parse_line("miso", value)?),
            _ => {
                log::warn!("linux_gpio: Unknown option: {}={}", key, value);
            }
        }
    }

    match (config.device.is_empty(), gpiochip) {
        (true, Some(n)) => config.device = format!("/dev/gpiochip{}", n),
        (true, None) => return Err(LinuxGpioError::NoDevice),
        (false, Some(_)) => return Err(LinuxGpioError::ConflictingDevice),
        (false, None) => {}
    }

    config.cs = cs.ok_or(LinuxGpioError::MissingParameter("cs"))?;
    config.sck = sck.ok_or(LinuxGpioError::MissingParameter("sck"))?;
    config.mosi = mosi.ok_or(LinuxGpioError::MissingParameter("mosi"))?;
    config.miso = miso.ok_or(LinuxGpioError::MissingParameter("miso"))?;

    let mut lines = [config.cs, config.sck, config.mosi, config.miso];
    lines.sort_unstable();
    if let Some(w) = lines.windows(2).find(|w| w[0] == w[1]) {
        return Err(LinuxGpioError::DuplicateLine(w[0]));
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full() {
        let config = parse_options(&[
            ("dev", "/dev/gpiochip0"),
            ("cs", "8"),
            ("sck", "11"),
            ("mosi", "10"),
            ("miso", "9"),
        ])
        .unwrap();
        assert_eq!(config, LinuxGpioConfig::new("/dev/gpiochip0", 8, 11, 10, 9));
        assert_eq!(config.pins(), SpiPins::new(Pin(8), Pin(11), Pin(10), Pin(9)));
    }

    #[test]
    fn test_parse_gpiochip_number() {
        let config = parse_options(&[
            ("gpiochip", "4"),
            ("cs", "22"),
            ("sck", "14"),
            ("mosi", "12"),
            ("miso", "13"),
        ])
        .unwrap();
        assert_eq!(config.device, "/dev/gpiochip4");
    }

    #[test]
    fn test_parse_missing_device() {
        let err = parse_options(&[("cs", "8"), ("sck", "11"), ("mosi", "10"), ("miso", "9")]);
        assert!(matches!(err, Err(LinuxGpioError::NoDevice)));
    }

    #[test]
    fn test_parse_both_devices() {
        let err = parse_options(&[
            ("dev", "/dev/gpiochip0"),
            ("gpiochip", "0"),
            ("cs", "8"),
            ("sck", "11"),
            ("mosi", "10"),
            ("miso", "9"),
        ]);
        assert!(matches!(err, Err(LinuxGpioError::ConflictingDevice)));
    }

    #[test]
    fn test_parse_missing_pin() {
        let err = parse_options(&[("gpiochip", "0"), ("cs", "8"), ("sck", "11"), ("mosi", "10")]);
        assert!(matches!(err, Err(LinuxGpioError::MissingParameter("miso"))));
    }

    #[test]
    fn test_parse_bad_line() {
        let err = parse_options(&[("gpiochip", "0"), ("cs", "eight")]);
        assert!(matches!(
            err,
            Err(LinuxGpioError::InvalidLineNumber { name: "cs", .. })
        ));
    }

    #[test]
    fn test_parse_duplicate_line() {
        let err = parse_options(&[
            ("gpiochip", "0"),
            ("cs", "8"),
            ("sck", "11"),
            ("mosi", "8"),
            ("miso", "9"),
        ]);
        assert!(matches!(err, Err(LinuxGpioError::DuplicateLine(8))));
    }

    #[test]
    fn test_open_without_device() {
        let config = LinuxGpioConfig::new("", 8, 11, 10, 9);
        assert!(matches!(
            LinuxGpio::open(&config),
            Err(LinuxGpioError::NoDevice)
        ));
    }

    #[test]
    fn test_error_messages() {
        let err = LinuxGpioError::MissingParameter("sck");
        assert_eq!(err.to_string(), "Missing required parameter: sck");
        let err = LinuxGpioError::DuplicateLine(9);
        assert!(err.to_string().contains("line 9"));
    }
}
