//! rtdprobe-dummy - Pin-level MAX31865 emulator for testing
//!
//! This crate provides a [`GpioAdapter`] that behaves like a MAX31865 wired
//! to four GPIO lines. It decodes the SPI traffic bit by bit from the pin
//! writes it receives, keeps the eight chip registers, and runs conversions
//! against a simulated RTD resistance. Delays advance a virtual clock, so
//! tests run instantly while still checking the conversion timing.
//!
//! # Example
//!
//! ```
//! use rtdprobe_core::device::{Max31865, RtdConfig};
//! use rtdprobe_dummy::EmulatedMax31865;
//!
//! let chip = EmulatedMax31865::new_default();
//! let pins = chip.pins();
//! let mut sensor = Max31865::open(chip, pins, RtdConfig::pt100()).unwrap();
//! let celsius = sensor.temperature();
//! assert!((celsius - 20.53).abs() < 0.01);
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(feature = "alloc")]
extern crate alloc;

#[cfg(feature = "alloc")]
use alloc::vec::Vec;

use rtdprobe_core::config::ConfigRegister;
use rtdprobe_core::error::{Error, Result};
use rtdprobe_core::fault::FaultReport;
use rtdprobe_core::gpio::{GpioAdapter, Level, Pin, PinMode, SpiPins};
use rtdprobe_core::register::{Register, WRITE_BIT};

/// Conversion time with the 60 Hz filter selected
pub const CONVERSION_TIME_60HZ_MS: u64 = 52;

/// Conversion time with the 50 Hz filter selected
pub const CONVERSION_TIME_50HZ_MS: u64 = 63;

/// Minimum bias-on time before a conversion is accurate
pub const BIAS_SETTLE_MS: u64 = 10;

/// Faults that only a fault detection cycle or a conversion can latch
const DETECTED_FAULTS: FaultReport = FaultReport::REFIN_LOW
    .union(FaultReport::REFIN_HIGH)
    .union(FaultReport::RTDIN_LOW)
    .union(FaultReport::OVUV);

/// Configuration for the emulated chip
#[derive(Debug, Clone)]
pub struct DummyConfig {
    /// Pins the chip is wired to
    pub pins: SpiPins,
    /// Simulated RTD resistance in ohms
    pub rtd_ohms: f64,
    /// Reference resistor on the emulated board in ohms
    pub ref_ohms: f64,
    /// Fault conditions present on the wires (raw fault status bits)
    pub fault: u8,
}

impl Default for DummyConfig {
    fn default() -> Self {
        Self {
            pins: SpiPins::new(Pin(8), Pin(11), Pin(10), Pin(9)),
            rtd_ohms: 108.0, // PT100 at about 20.5 °C
            ref_ohms: 430.0,
            fault: 0,
        }
    }
}

/// Progress of the current chip-select frame
#[cfg(feature = "alloc")]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    /// Waiting for the address byte
    Address,
    /// Address received; following bytes read from `addr` upwards
    Read { addr: u8 },
    /// Address received; following bytes are written from `addr` upwards
    Write { addr: u8 },
}

/// Emulated MAX31865 behind four GPIO lines
#[cfg(feature = "alloc")]
pub struct EmulatedMax31865 {
    config: DummyConfig,
    modes: [Option<PinMode>; 4],
    broken: Option<Pin>,

    // line state
    cs: Level,
    sck: Level,
    mosi: Level,
    miso: Level,

    // SPI shift state
    selected: bool,
    phase: Phase,
    shift_in: u8,
    shift_out: u8,
    bits: u8,

    // chip state
    regs: [u8; 8],
    conversion_due: Option<u64>,
    bias_since: Option<u64>,
    now_ms: u64,

    // observation
    frames: Vec<Vec<u8>>,
    delays: Vec<u32>,
    conversions: u32,
}

#[cfg(feature = "alloc")]
impl EmulatedMax31865 {
    /// Create an emulated chip
    pub fn new(config: DummyConfig) -> Self {
        Self {
            config,
            modes: [None; 4],
            broken: None,
            cs: Level::High,
            sck: Level::Low,
            mosi: Level::Low,
            miso: Level::Low,
            selected: false,
            phase: Phase::Address,
            shift_in: 0,
            shift_out: 0,
            bits: 0,
            regs: [0; 8],
            conversion_due: None,
            bias_since: None,
            now_ms: 0,
            frames: Vec::new(),
            delays: Vec::new(),
            conversions: 0,
        }
    }

    /// Create an emulated PT100 at 108 Ω on the default pins
    pub fn new_default() -> Self {
        Self::new(DummyConfig::default())
    }

    /// Get the configuration
    pub fn config(&self) -> &DummyConfig {
        &self.config
    }

    /// Pins this chip is wired to
    pub fn pins(&self) -> SpiPins {
        self.config.pins
    }

    /// Change the simulated RTD resistance
    pub fn set_resistance(&mut self, ohms: f64) {
        self.config.rtd_ohms = ohms;
    }

    /// Set the fault conditions present on the wires
    ///
    /// They are latched into the fault status register by the next
    /// conversion or fault detection cycle.
    pub fn inject_fault(&mut self, bits: u8) {
        self.config.fault = bits;
    }

    /// Make every mode change on `pin` fail
    pub fn break_pin(&mut self, pin: Pin) {
        self.broken = Some(pin);
    }

    /// Raw register contents, addresses 0x00 to 0x07
    pub fn registers(&self) -> &[u8; 8] {
        &self.regs
    }

    /// Current configuration register
    pub fn config_register(&self) -> ConfigRegister {
        ConfigRegister::from_raw(self.regs[Register::Config as usize])
    }

    /// Latched fault status
    pub fn fault_status(&self) -> FaultReport {
        FaultReport::from_raw(self.regs[Register::FaultStatus as usize])
    }

    /// Mode last applied to `pin`, `None` if never configured
    pub fn pin_mode(&self, pin: Pin) -> Option<PinMode> {
        self.line(pin).and_then(|i| self.modes[i])
    }

    /// MOSI bytes of every completed chip-select frame, in order
    pub fn frames(&self) -> &[Vec<u8>] {
        &self.frames
    }

    /// Every delay requested, in order
    pub fn delays(&self) -> &[u32] {
        &self.delays
    }

    /// Virtual time elapsed since creation
    pub fn elapsed_ms(&self) -> u64 {
        self.now_ms
    }

    /// Number of conversions completed so far
    pub fn conversions(&self) -> u32 {
        self.conversions
    }

    fn line(&self, pin: Pin) -> Option<usize> {
        self.config.pins.all().iter().position(|p| *p == pin)
    }

    fn is_output(&self, idx: usize) -> bool {
        self.modes[idx] == Some(PinMode::Output)
    }

    fn conversion_time(&self) -> u64 {
        if self.config_register().contains(ConfigRegister::FILTER_50HZ) {
            CONVERSION_TIME_50HZ_MS
        } else {
            CONVERSION_TIME_60HZ_MS
        }
    }

    /// Finish a pending one-shot once its conversion time has passed
    fn settle(&mut self) {
        if let Some(due) = self.conversion_due {
            if self.now_ms >= due {
                self.conversion_due = None;
                self.convert();
            }
        }
        let cfg = self.config_register();
        if cfg.auto_convert() && cfg.bias() {
            self.convert();
        }
    }

    fn convert(&mut self) {
        let scaled = self.config.rtd_ohms / self.config.ref_ohms * 32768.0;
        // Saturating cast: open element reads full scale
        let raw = ((scaled + 0.5) as u32).min(0x7FFF) as u16;

        let high = u16::from_be_bytes([self.regs[3], self.regs[4]]) >> 1;
        let low = u16::from_be_bytes([self.regs[5], self.regs[6]]) >> 1;

        let mut fault = self.fault_status() | (FaultReport::from_raw(self.config.fault) & DETECTED_FAULTS);
        if raw >= high {
            fault |= FaultReport::HIGH_THRESHOLD;
        }
        if raw <= low {
            fault |= FaultReport::LOW_THRESHOLD;
        }
        self.regs[Register::FaultStatus as usize] = fault.bits();

        let data = (raw << 1) | u16::from(!fault.is_empty());
        let [msb, lsb] = data.to_be_bytes();
        self.regs[Register::RtdMsb as usize] = msb;
        self.regs[Register::RtdLsb as usize] = lsb;
        self.conversions += 1;

        log::debug!(
            "dummy: conversion {:.3} Ω -> raw 0x{:04X}, fault 0x{:02X}",
            self.config.rtd_ohms,
            raw,
            fault.bits()
        );
    }

    fn read_reg(&mut self, addr: u8) -> u8 {
        self.settle();
        match self.regs.get(addr as usize) {
            Some(v) => *v,
            None => {
                log::debug!("dummy: read from unknown register 0x{:02X}", addr);
                0
            }
        }
    }

    fn write_reg(&mut self, addr: u8, value: u8) {
        match addr {
            0x00 => self.write_config(ConfigRegister::from_raw(value)),
            0x03..=0x06 => self.regs[addr as usize] = value,
            _ => log::debug!("dummy: write to read-only register 0x{:02X} ignored", addr),
        }
    }

    fn write_config(&mut self, value: ConfigRegister) {
        let was_biased = self.config_register().bias();

        if value.contains(ConfigRegister::FAULT_CLEAR) {
            self.regs[Register::FaultStatus as usize] = 0;
        }

        let cycle = value & (ConfigRegister::FAULT_CYCLE_1 | ConfigRegister::FAULT_CYCLE_0);
        let mut stored = value - ConfigRegister::ONE_SHOT - ConfigRegister::FAULT_CLEAR;
        if cycle == ConfigRegister::FAULT_CYCLE_0
            || cycle == (ConfigRegister::FAULT_CYCLE_1 | ConfigRegister::FAULT_CYCLE_0)
        {
            // Automatic cycle or manual finish: detection completes at once
            let detected = FaultReport::from_raw(self.config.fault) & DETECTED_FAULTS;
            let latched = self.fault_status() | detected;
            self.regs[Register::FaultStatus as usize] = latched.bits();
            stored -= ConfigRegister::FAULT_CYCLE_1 | ConfigRegister::FAULT_CYCLE_0;
            log::debug!("dummy: fault cycle done, status 0x{:02X}", latched.bits());
        }
        self.regs[Register::Config as usize] = stored.bits();

        match (was_biased, value.bias()) {
            (false, true) => self.bias_since = Some(self.now_ms),
            (true, false) => self.bias_since = None,
            _ => {}
        }

        if cycle == ConfigRegister::FAULT_CYCLE_1 && !self.bias_settled() {
            log::warn!("dummy: manual fault cycle started before bias settled");
        }

        if value.contains(ConfigRegister::ONE_SHOT) {
            if !value.bias() {
                log::warn!("dummy: one-shot requested with bias off, ignored");
            } else {
                if !self.bias_settled() {
                    log::warn!("dummy: one-shot started before bias settled");
                }
                self.conversion_due = Some(self.now_ms + self.conversion_time());
            }
        }
    }

    fn bias_settled(&self) -> bool {
        self.bias_since
            .is_some_and(|t| self.now_ms - t >= BIAS_SETTLE_MS)
    }

    /// A full byte arrived on MOSI
    fn byte_received(&mut self, byte: u8) {
        if let Some(frame) = self.frames.last_mut() {
            frame.push(byte);
        }

        self.phase = match self.phase {
            Phase::Address => {
                let addr = byte & !WRITE_BIT;
                if byte & WRITE_BIT != 0 {
                    Phase::Write { addr }
                } else {
                    Phase::Read { addr }
                }
            }
            Phase::Read { addr } => Phase::Read {
                addr: addr.wrapping_add(1),
            },
            Phase::Write { addr } => {
                self.write_reg(addr, byte);
                Phase::Write {
                    addr: addr.wrapping_add(1),
                }
            }
        };

        self.shift_out = match self.phase {
            Phase::Read { addr } => self.read_reg(addr),
            _ => 0,
        };
    }

    fn cs_changed(&mut self, level: Level) {
        if level == self.cs {
            return;
        }
        self.cs = level;
        match level {
            Level::Low => {
                if self.sck.is_high() {
                    log::warn!("dummy: chip selected with SCK high");
                }
                self.selected = true;
                self.phase = Phase::Address;
                self.bits = 0;
                self.shift_in = 0;
                self.shift_out = 0;
                self.frames.push(Vec::new());
            }
            Level::High => {
                if self.bits != 0 {
                    log::warn!("dummy: frame ended mid-byte ({} bits)", self.bits);
                }
                self.selected = false;
            }
        }
    }

    fn sck_changed(&mut self, level: Level) {
        if level == self.sck {
            return;
        }
        self.sck = level;
        if !self.selected {
            return;
        }
        match level {
            // Shift out on the rising edge
            Level::High => {
                self.miso = Level::from(self.shift_out & 0x80 != 0);
                self.shift_out <<= 1;
            }
            // Latch in on the falling edge
            Level::Low => {
                self.shift_in = (self.shift_in << 1) | u8::from(self.mosi.is_high());
                self.bits += 1;
                if self.bits == 8 {
                    let byte = self.shift_in;
                    self.bits = 0;
                    self.shift_in = 0;
                    self.byte_received(byte);
                }
            }
        }
    }
}

#[cfg(feature = "alloc")]
impl Default for EmulatedMax31865 {
    fn default() -> Self {
        Self::new_default()
    }
}

#[cfg(feature = "alloc")]
impl GpioAdapter for EmulatedMax31865 {
    fn set_pin_mode(&mut self, pin: Pin, mode: PinMode) -> Result<()> {
        if self.broken == Some(pin) {
            return Err(Error::PinConfig { pin: pin.0 });
        }
        let idx = self.line(pin).ok_or(Error::PinConfig { pin: pin.0 })?;
        self.modes[idx] = Some(mode);
        log::trace!("dummy: pin {} -> {:?}", pin, mode);
        Ok(())
    }

    fn write_digital(&mut self, pin: Pin, level: Level) {
        let Some(idx) = self.line(pin) else {
            log::debug!("dummy: write to unwired pin {}", pin);
            return;
        };
        if !self.is_output(idx) {
            log::trace!("dummy: pin {} is not an output, write ignored", pin);
            return;
        }
        match idx {
            0 => self.cs_changed(level),
            1 => self.sck_changed(level),
            2 => self.mosi = level,
            _ => log::debug!("dummy: MISO is driven by the chip"),
        }
    }

    fn read_digital(&self, pin: Pin) -> Level {
        if pin == self.config.pins.miso {
            self.miso
        } else {
            match self.line(pin) {
                Some(0) => self.cs,
                Some(1) => self.sck,
                Some(2) => self.mosi,
                _ => Level::Low,
            }
        }
    }

    fn delay_ms(&mut self, ms: u32) {
        self.delays.push(ms);
        self.now_ms += u64::from(ms);
    }
}

/// Parse dummy backend options from a list of key-value pairs
///
/// # Supported Options
///
/// - `ohms=F` - simulated RTD resistance (default 108.0)
/// - `ref=F` - reference resistor seen by the chip (default 430.0)
/// - `fault=N` - fault status bits present on the wires (decimal or 0x hex)
/// - `cs=N`, `sck=N`, `mosi=N`, `miso=N` - pin ids (default 8/11/10/9)
#[cfg(feature = "std")]
pub fn parse_options(options: &[(&str, &str)]) -> std::result::Result<DummyConfig, String> {
    let mut config = DummyConfig::default();

    let pin = |key: &str, value: &str| -> std::result::Result<Pin, String> {
        value
            .parse()
            .map(Pin)
            .map_err(|_| format!("Invalid {} value: {}", key, value))
    };

    for (key, value) in options {
        match *key {
            "ohms" => {
                config.rtd_ohms = value
                    .parse()
                    .map_err(|_| format!("Invalid ohms value: {}", value))?;
            }
            "ref" => {
                config.ref_ohms = value
                    .parse()
                    .map_err(|_| format!("Invalid ref value: {}", value))?;
                if config.ref_ohms <= 0.0 || !config.ref_ohms.is_finite() {
                    return Err(format!("Reference resistance must be positive: {}", value));
                }
            }
            "fault" => {
                let parsed = match value.strip_prefix("0x") {
                    Some(hex) => u8::from_str_radix(hex, 16),
                    None => value.parse(),
                };
                config.fault = parsed.map_err(|_| format!("Invalid fault value: {}", value))?;
            }
            "cs" => config.pins.cs = pin(*key, *value)?,
            "sck" => config.pins.sck = pin(*key, *value)?,
            "mosi" => config.pins.mosi = pin(*key, *value)?,
            "miso" => config.pins.miso = pin(*key, *value)?,
            _ => {
                log::warn!("dummy: Unknown option: {}={}", key, value);
            }
        }
    }

    let mut all = config.pins.all();
    all.sort();
    if all.windows(2).any(|w| w[0] == w[1]) {
        return Err("Each SPI line needs its own pin".to_string());
    }

    Ok(config)
}

/// Create an emulated chip and return it boxed with its pin set
///
/// This is a convenience function for use in the CLI backend dispatch.
#[cfg(feature = "std")]
pub fn open_dummy(
    options: &[(&str, &str)],
) -> std::result::Result<(Box<dyn GpioAdapter>, SpiPins), Box<dyn std::error::Error>> {
    let config = parse_options(options)?;
    let chip = EmulatedMax31865::new(config);
    let pins = chip.pins();
    Ok((Box::new(chip), pins))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rtdprobe_core::bitbang::BitbangSpiMaster;
    use rtdprobe_core::bus::GpioSpi;
    use rtdprobe_core::register;

    fn claimed() -> GpioSpi<EmulatedMax31865> {
        let chip = EmulatedMax31865::new_default();
        let pins = chip.pins();
        GpioSpi::claim(chip, pins).unwrap()
    }

    #[test]
    fn test_register_write_and_read_back() {
        let mut bus = claimed();
        register::write_register16(&mut bus, Register::HighFaultMsb, 0xBEEF);
        assert_eq!(
            register::read_register16(&mut bus, Register::HighFaultMsb),
            0xBEEF
        );
        assert_eq!(bus.adapter().registers()[3], 0xBE);
        assert_eq!(bus.adapter().registers()[4], 0xEF);
    }

    #[test]
    fn test_frames_are_recorded() {
        let mut bus = claimed();
        register::write_register8(&mut bus, Register::Config, 0x10);
        register::read_register8(&mut bus, Register::Config);
        assert_eq!(bus.adapter().frames(), [vec![0x80u8, 0x10], vec![0x00u8, 0xFF]]);
    }

    #[test]
    fn test_read_only_registers() {
        let mut bus = claimed();
        register::write_register8(&mut bus, Register::FaultStatus, 0xFC);
        register::write_register16(&mut bus, Register::RtdMsb, 0xFFFF);
        assert_eq!(bus.adapter().registers()[7], 0);
        assert_eq!(bus.adapter().registers()[1], 0);
    }

    #[test]
    fn test_self_clearing_bits() {
        let mut bus = claimed();
        register::write_register8(&mut bus, Register::Config, 0xA2);
        assert_eq!(bus.adapter().config_register().bits(), 0x80);
    }

    #[test]
    fn test_one_shot_needs_conversion_time() {
        let mut bus = claimed();
        register::write_register8(&mut bus, Register::Config, 0x80);
        bus.delay_ms(10);
        register::write_register8(&mut bus, Register::Config, 0xA0);

        // Not done yet: stale data
        assert_eq!(register::read_register16(&mut bus, Register::RtdMsb), 0);
        assert_eq!(bus.adapter().conversions(), 0);

        bus.delay_ms(65);
        let raw = register::read_register16(&mut bus, Register::RtdMsb) >> 1;
        // 108 / 430 * 32768
        assert_eq!(raw, 8230);
        assert_eq!(bus.adapter().conversions(), 1);
        assert_eq!(bus.adapter().elapsed_ms(), 75);
    }

    #[test]
    fn test_one_shot_without_bias_is_ignored() {
        let mut bus = claimed();
        register::write_register8(&mut bus, Register::Config, 0x20);
        bus.delay_ms(100);
        register::read_register16(&mut bus, Register::RtdMsb);
        assert_eq!(bus.adapter().conversions(), 0);
    }

    #[test]
    fn test_fault_cycle_latches_injected_faults() {
        let mut bus = claimed();
        bus.adapter_mut().inject_fault(0x24);
        register::write_register8(&mut bus, Register::Config, 0x84);
        assert_eq!(register::read_register8(&mut bus, Register::FaultStatus), 0x24);
        assert_eq!(bus.adapter().config_register().bits(), 0x80);

        register::write_register8(&mut bus, Register::Config, 0x82);
        assert!(bus.adapter().fault_status().is_clear());
    }

    #[test]
    fn test_unwired_pin_rejected() {
        let mut chip = EmulatedMax31865::new_default();
        assert_eq!(
            chip.set_pin_mode(Pin(3), PinMode::Output),
            Err(Error::PinConfig { pin: 3 })
        );
        chip.break_pin(Pin(9));
        assert!(chip.set_pin_mode(Pin(9), PinMode::Input).is_err());
    }

    #[test]
    fn test_writes_need_output_mode() {
        let mut chip = EmulatedMax31865::new_default();
        chip.write_digital(Pin(8), Level::Low);
        assert_eq!(chip.read_digital(Pin(8)), Level::High);
        assert!(chip.frames().is_empty());
    }

    #[test]
    fn test_parse_options() {
        let config = parse_options(&[("ohms", "138.5"), ("fault", "0x84"), ("cs", "22")]).unwrap();
        assert_eq!(config.rtd_ohms, 138.5);
        assert_eq!(config.ref_ohms, 430.0);
        assert_eq!(config.fault, 0x84);
        assert_eq!(config.pins.cs, Pin(22));
        assert_eq!(config.pins.miso, Pin(9));

        assert_eq!(parse_options(&[("fault", "12")]).unwrap().fault, 12);
        assert!(parse_options(&[("ohms", "warm")]).is_err());
        assert!(parse_options(&[("ref", "0")]).is_err());
        assert!(parse_options(&[("cs", "9")]).is_err());
    }
}
